use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use super::error::DataStoreError;
use super::service::TaskDataService;
use crate::model::{NewTask, NewTaskList, Task, TaskList, TaskListUpdate, TaskUpdate};

const API_PREFIX: &str = "api";
const LISTS: &str = "tasks-lists";
const TASKS: &str = "tasks";

/// Talks to the task-list REST service, one request per operation.
pub struct RemoteDataService {
    base_url: Url,
    client: Client,
}

impl RemoteDataService {
    pub fn new(base_url: Url) -> Result<Self, DataStoreError> {
        if base_url.cannot_be_a_base() {
            return Err(DataStoreError::Unreachable(format!(
                "'{}' cannot be used as a base url",
                base_url
            )));
        }
        Ok(Self {
            base_url,
            client: Client::new(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push(API_PREFIX).extend(segments);
        }
        url
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Response, DataStoreError> {
        let response = request.send().await?;
        let status = response.status();
        debug!(status = status.as_u16(), url = %response.url(), "api response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = body.as_str(), "api request failed");
            return Err(DataStoreError::RemoteFailure {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                body,
            });
        }
        Ok(response)
    }

    /// Parsed JSON body, or `None` for a no-content response.
    async fn fetch<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Option<T>, DataStoreError> {
        let response = self.execute(request).await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        Ok(Some(response.json().await?))
    }

    async fn fetch_entity<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, DataStoreError> {
        self.fetch(request)
            .await?
            .ok_or_else(|| DataStoreError::InvalidResponse("expected a body, got none".into()))
    }
}

#[async_trait]
impl TaskDataService for RemoteDataService {
    async fn get_task_lists(&self) -> Result<Vec<TaskList>, DataStoreError> {
        let url = self.endpoint(&[LISTS]);
        Ok(self.fetch(self.client.get(url)).await?.unwrap_or_default())
    }

    async fn add_task_list(&self, list: NewTaskList) -> Result<TaskList, DataStoreError> {
        let url = self.endpoint(&[LISTS]);
        self.fetch_entity(self.client.post(url).json(&list)).await
    }

    async fn update_task_list(&self, update: TaskListUpdate) -> Result<TaskList, DataStoreError> {
        let url = self.endpoint(&[LISTS, &update.id]);
        self.fetch_entity(self.client.put(url).json(&update)).await
    }

    async fn delete_task_list(&self, id: &str) -> Result<(), DataStoreError> {
        let url = self.endpoint(&[LISTS, id]);
        self.execute(self.client.delete(url)).await?;
        Ok(())
    }

    async fn add_task(&self, list_id: &str, task: NewTask) -> Result<Task, DataStoreError> {
        let url = self.endpoint(&[LISTS, list_id, TASKS]);
        self.fetch_entity(self.client.post(url).json(&task)).await
    }

    async fn update_task(&self, list_id: &str, task: TaskUpdate) -> Result<Task, DataStoreError> {
        let url = self.endpoint(&[LISTS, list_id, TASKS, &task.id]);
        self.fetch_entity(self.client.put(url).json(&task)).await
    }

    async fn toggle_task_completed(
        &self,
        list_id: &str,
        task_id: &str,
    ) -> Result<Task, DataStoreError> {
        let url = self.endpoint(&[LISTS, list_id, TASKS, task_id, "toggle"]);
        self.fetch_entity(self.client.patch(url)).await
    }

    async fn delete_task(&self, list_id: &str, task_id: &str) -> Result<(), DataStoreError> {
        let url = self.endpoint(&[LISTS, list_id, TASKS, task_id]);
        self.execute(self.client.delete(url)).await?;
        Ok(())
    }
}
