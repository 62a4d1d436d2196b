use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde_derive::Deserialize;

use super::error::DataStoreError;
use crate::model::{NewTask, NewTaskList, Task, TaskList, TaskListUpdate, TaskUpdate};

/// CRUD over task lists and their tasks, independent of where the data lives.
#[async_trait]
pub trait TaskDataService: Send + Sync {
    async fn get_task_lists(&self) -> Result<Vec<TaskList>, DataStoreError>;
    async fn add_task_list(&self, list: NewTaskList) -> Result<TaskList, DataStoreError>;
    async fn update_task_list(&self, update: TaskListUpdate) -> Result<TaskList, DataStoreError>;
    async fn delete_task_list(&self, id: &str) -> Result<(), DataStoreError>;
    async fn add_task(&self, list_id: &str, task: NewTask) -> Result<Task, DataStoreError>;
    async fn update_task(&self, list_id: &str, task: TaskUpdate) -> Result<Task, DataStoreError>;
    async fn toggle_task_completed(
        &self,
        list_id: &str,
        task_id: &str,
    ) -> Result<Task, DataStoreError>;
    async fn delete_task(&self, list_id: &str, task_id: &str) -> Result<(), DataStoreError>;
}

/// Which backend serves the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceMode {
    Local,
    Api,
}

impl Default for ServiceMode {
    fn default() -> Self {
        ServiceMode::Local
    }
}

impl fmt::Display for ServiceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceMode::Local => f.write_str("local"),
            ServiceMode::Api => f.write_str("api"),
        }
    }
}

impl FromStr for ServiceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(ServiceMode::Local),
            "api" => Ok(ServiceMode::Api),
            other => Err(format!("unknown data source '{}', expected local or api", other)),
        }
    }
}
