use crate::model::TaskList;

/// What the screen shows: every list as last reconciled with the backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewModel {
    pub lists: Vec<TaskList>,
    pub selected: Option<String>,
    pub error: Option<String>,
}

/// Lists as they were before a speculative mutation.
#[must_use = "a snapshot is either restored or dropped once the backend answers"]
pub struct Snapshot(Vec<TaskList>);

impl ViewModel {
    pub fn selected_list(&self) -> Option<&TaskList> {
        let id = self.selected.as_deref()?;
        self.list(id)
    }

    pub fn list(&self, id: &str) -> Option<&TaskList> {
        self.lists.iter().find(|l| l.id == id)
    }

    pub fn list_mut(&mut self, id: &str) -> Option<&mut TaskList> {
        self.lists.iter_mut().find(|l| l.id == id)
    }

    /// Applies `mutate` right away and hands back what to restore on failure.
    pub fn speculate<F>(&mut self, mutate: F) -> Snapshot
    where
        F: FnOnce(&mut Vec<TaskList>),
    {
        let snapshot = Snapshot(self.lists.clone());
        mutate(&mut self.lists);
        snapshot
    }

    pub fn restore(&mut self, snapshot: Snapshot) {
        self.lists = snapshot.0;
    }

    /// Replaces all lists, dropping the selection if its list is gone.
    pub fn replace(&mut self, lists: Vec<TaskList>) {
        self.lists = lists;
        if self.selected_list().is_none() {
            self.selected = None;
        }
    }
}
