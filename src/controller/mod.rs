mod error;
mod view;

use std::sync::Arc;

use tracing::{info, instrument, warn};

pub use error::ControllerError;
pub use view::ViewModel;

use crate::datastore::{DataStoreError, ServiceMode, TaskDataService};
use crate::model::{require_text, NewTask, NewTaskList, Task, TaskListUpdate, TaskUpdate};

type SharedService = Arc<dyn TaskDataService>;

/// Both backends, one of which is active at a time.
#[derive(Clone)]
pub struct Backends {
    pub local: SharedService,
    pub api: SharedService,
}

impl Backends {
    pub fn get(&self, mode: ServiceMode) -> SharedService {
        match mode {
            ServiceMode::Local => self.local.clone(),
            ServiceMode::Api => self.api.clone(),
        }
    }
}

/// Keeps the view model in step with whichever backend is active.
///
/// Toggling and deleting are optimistic: the view changes first and is put
/// back if the backend refuses. Creating and updating wait for the backend
/// and then reload or merge what it returned.
pub struct TaskController {
    backends: Backends,
    mode: ServiceMode,
    view: ViewModel,
}

impl TaskController {
    pub fn new(backends: Backends, mode: ServiceMode) -> Self {
        Self {
            backends,
            mode,
            view: ViewModel::default(),
        }
    }

    pub fn mode(&self) -> ServiceMode {
        self.mode
    }

    pub fn view(&self) -> &ViewModel {
        &self.view
    }

    fn service(&self) -> SharedService {
        self.backends.get(self.mode)
    }

    fn selected_list_id(&self) -> Result<String, ControllerError> {
        self.view.selected.clone().ok_or(ControllerError::NoListOpen)
    }

    /// Every user action starts by clearing the previous error banner.
    fn begin(&mut self) {
        self.view.error = None;
    }

    fn fail<T>(&mut self, err: ControllerError) -> Result<T, ControllerError> {
        warn!(reason = %err, mode = %self.mode, "action failed");
        self.view.error = Some(err.to_string());
        Err(err)
    }

    fn fail_backend<T>(&mut self, err: DataStoreError) -> Result<T, ControllerError> {
        self.fail(err.into())
    }

    #[instrument(skip(self), fields(mode = %self.mode))]
    pub async fn load(&mut self) -> Result<(), ControllerError> {
        self.begin();
        match self.service().get_task_lists().await {
            Ok(lists) => {
                info!(lists = lists.len(), "task lists loaded");
                self.view.replace(lists);
                Ok(())
            }
            Err(err) => {
                self.view.replace(Vec::new());
                self.fail_backend(err)
            }
        }
    }

    /// Activates another backend. Whatever the view held is discarded.
    pub async fn switch_mode(&mut self, mode: ServiceMode) -> Result<(), ControllerError> {
        info!(from = %self.mode, to = %mode, "switching data source");
        self.mode = mode;
        self.view = ViewModel::default();
        self.load().await
    }

    pub fn open(&mut self, list_id: &str) -> Result<(), ControllerError> {
        self.begin();
        if self.view.list(list_id).is_none() {
            return self.fail(ControllerError::UnknownList(list_id.to_string()));
        }
        self.view.selected = Some(list_id.to_string());
        Ok(())
    }

    pub fn back(&mut self) {
        self.begin();
        self.view.selected = None;
    }

    pub async fn create_list(
        &mut self,
        title: String,
        description: String,
    ) -> Result<(), ControllerError> {
        self.begin();
        if let Err(err) = require_text("title", &title) {
            return self.fail(err.into());
        }
        let request = NewTaskList { title, description };
        if let Err(err) = self.service().add_task_list(request).await {
            return self.fail_backend(err);
        }
        self.load().await
    }

    pub async fn update_list(
        &mut self,
        id: String,
        title: String,
        description: Option<String>,
    ) -> Result<(), ControllerError> {
        self.begin();
        if let Err(err) = require_text("title", &title) {
            return self.fail(err.into());
        }
        // PUT replaces the whole list, so an unchanged description is sent as shown
        let description =
            description.or_else(|| self.view.list(&id).map(|l| l.description.clone()));
        let update = TaskListUpdate {
            id,
            title: Some(title),
            description,
        };
        if let Err(err) = self.service().update_task_list(update).await {
            return self.fail_backend(err);
        }
        self.load().await
    }

    pub async fn delete_list(&mut self, id: &str) -> Result<(), ControllerError> {
        self.begin();
        let snapshot = self.view.speculate(|lists| lists.retain(|l| l.id != id));
        match self.service().delete_task_list(id).await {
            Ok(()) => {
                drop(snapshot);
                self.load().await
            }
            Err(err) => {
                self.view.restore(snapshot);
                self.fail_backend(err)
            }
        }
    }

    pub async fn add_task(&mut self, description: String) -> Result<(), ControllerError> {
        self.begin();
        let list_id = match self.selected_list_id() {
            Ok(id) => id,
            Err(err) => return self.fail(err),
        };
        if let Err(err) = require_text("description", &description) {
            return self.fail(err.into());
        }
        match self.service().add_task(&list_id, NewTask { description }).await {
            Ok(task) => {
                if let Some(list) = self.view.list_mut(&list_id) {
                    list.tasks.push(task);
                }
                Ok(())
            }
            Err(err) => self.fail_backend(err),
        }
    }

    pub async fn update_task(
        &mut self,
        task_id: String,
        description: String,
    ) -> Result<(), ControllerError> {
        self.begin();
        let list_id = match self.selected_list_id() {
            Ok(id) => id,
            Err(err) => return self.fail(err),
        };
        if let Err(err) = require_text("description", &description) {
            return self.fail(err.into());
        }
        let update = TaskUpdate {
            id: task_id,
            description,
        };
        match self.service().update_task(&list_id, update).await {
            Ok(task) => {
                self.merge(&list_id, task);
                Ok(())
            }
            Err(err) => self.fail_backend(err),
        }
    }

    pub async fn toggle_task(&mut self, task_id: &str) -> Result<(), ControllerError> {
        self.begin();
        let list_id = match self.selected_list_id() {
            Ok(id) => id,
            Err(err) => return self.fail(err),
        };
        let snapshot = self.view.speculate(|lists| {
            if let Some(task) = lists
                .iter_mut()
                .find(|l| l.id == list_id)
                .and_then(|l| l.task_mut(task_id))
            {
                task.toggle();
            }
        });
        match self.service().toggle_task_completed(&list_id, task_id).await {
            Ok(_) => {
                drop(snapshot);
                Ok(())
            }
            Err(err) => {
                self.view.restore(snapshot);
                self.fail_backend(err)
            }
        }
    }

    pub async fn delete_task(&mut self, task_id: &str) -> Result<(), ControllerError> {
        self.begin();
        let list_id = match self.selected_list_id() {
            Ok(id) => id,
            Err(err) => return self.fail(err),
        };
        let snapshot = self.view.speculate(|lists| {
            if let Some(list) = lists.iter_mut().find(|l| l.id == list_id) {
                list.remove_task(task_id);
            }
        });
        match self.service().delete_task(&list_id, task_id).await {
            Ok(()) => {
                drop(snapshot);
                Ok(())
            }
            Err(err) => {
                self.view.restore(snapshot);
                self.fail_backend(err)
            }
        }
    }

    fn merge(&mut self, list_id: &str, task: Task) {
        if let Some(list) = self.view.list_mut(list_id) {
            list.merge_task(task);
        }
    }
}
