pub mod error;
pub mod task;
pub mod task_list;

pub use error::ModelError;
pub use task::{NewTask, Task, TaskUpdate};
pub use task_list::{NewTaskList, TaskList, TaskListUpdate};

/// Rejects text that is empty once surrounding whitespace is removed.
pub fn require_text(field: &'static str, value: &str) -> Result<(), ModelError> {
    if value.trim().is_empty() {
        return Err(ModelError::EmptyText(field));
    }
    Ok(())
}
