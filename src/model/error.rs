use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("{0} must not be empty")]
    EmptyText(&'static str),
}
