use serde_derive::{Deserialize, Serialize};

/// A single to-do item owned by exactly one task list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Task {
    pub id: String,
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

impl Task {
    pub fn new(id: String, description: String) -> Self {
        Self {
            id,
            description,
            completed: false,
        }
    }

    pub fn toggle(&mut self) {
        self.completed = !self.completed;
    }
}

/// Body of a task creation request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NewTask {
    pub description: String,
}

/// Body of a task update request. The completed flag is never part of it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TaskUpdate {
    pub id: String,
    pub description: String,
}
