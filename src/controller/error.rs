use thiserror::Error;

use crate::datastore::DataStoreError;
use crate::model::ModelError;

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("no task list is open")]
    NoListOpen,
    #[error("Task list with id {0} not found")]
    UnknownList(String),
    #[error(transparent)]
    Validation(#[from] ModelError),
    #[error(transparent)]
    Backend(#[from] DataStoreError),
}
