use serde_derive::{Deserialize, Serialize};

use super::Task;

/// A named, ordered collection of tasks.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TaskList {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl TaskList {
    pub fn new(id: String, title: String, description: String) -> Self {
        Self {
            id,
            title,
            description,
            tasks: Vec::new(),
        }
    }

    pub fn task_mut(&mut self, task_id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == task_id)
    }

    /// Replaces the task with the same id, keeping its position.
    /// Returns false when no such task exists.
    pub fn merge_task(&mut self, task: Task) -> bool {
        match self.task_mut(&task.id) {
            Some(existing) => {
                *existing = task;
                true
            }
            None => false,
        }
    }

    /// Removes the task with the given id, returning whether it was present.
    pub fn remove_task(&mut self, task_id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != task_id);
        before != self.tasks.len()
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }

    /// Share of completed tasks as a percentage in [0, 100]; 0 for an empty list.
    pub fn progress(&self) -> f64 {
        if self.tasks.is_empty() {
            return 0.0;
        }
        let ratio = self.completed_count() as f64 / self.tasks.len() as f64;
        (ratio * 100.0).clamp(0.0, 100.0)
    }
}

/// Body of a list creation request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NewTaskList {
    pub title: String,
    pub description: String,
}

/// Body of a list update request. Absent fields keep their stored value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TaskListUpdate {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TaskListUpdate {
    pub fn apply(self, list: &mut TaskList) {
        if let Some(title) = self.title {
            list.title = title;
        }
        if let Some(description) = self.description {
            list.description = description;
        }
    }
}
