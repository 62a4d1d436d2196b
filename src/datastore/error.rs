use thiserror::*;

use super::storage::StorageError;

#[derive(Debug, PartialEq, Eq, Error)]
pub enum DataStoreError {
    #[error("Task list with id {0} not found")]
    ListNotFound(String),

    #[error("Task with id {task_id} not found in list {list_id}")]
    TaskNotFound { list_id: String, task_id: String },

    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("API Error: {status} {status_text} - {body}")]
    RemoteFailure {
        status: u16,
        status_text: String,
        body: String,
    },

    #[error("API unreachable: {0}")]
    Unreachable(String),

    #[error("unexpected API response: {0}")]
    InvalidResponse(String),
}

impl From<StorageError> for DataStoreError {
    fn from(err: StorageError) -> Self {
        DataStoreError::StorageUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for DataStoreError {
    fn from(err: serde_json::Error) -> Self {
        DataStoreError::StorageUnavailable(err.to_string())
    }
}

impl From<reqwest::Error> for DataStoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            DataStoreError::InvalidResponse(err.to_string())
        } else {
            DataStoreError::Unreachable(err.to_string())
        }
    }
}
