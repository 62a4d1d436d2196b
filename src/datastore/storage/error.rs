use std::path::PathBuf;
use thiserror::*;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("cannot read '{0}': {1}")]
    Read(PathBuf, std::io::Error),

    #[error("cannot write '{0}': {1}")]
    Write(PathBuf, std::io::Error),

    #[error("invalid storage key '{0}'")]
    InvalidKey(String),
}
