use async_trait::async_trait;
use tracing::{debug, warn};

use super::error::DataStoreError;
use super::service::TaskDataService;
use super::storage::KeyValueStore;
use crate::model::{NewTask, NewTaskList, Task, TaskList, TaskListUpdate, TaskUpdate};

/// Key under which the whole dataset is stored.
pub const STORAGE_KEY: &str = "taskflow-data";

/// Keeps every task list in one serialized document.
///
/// Each operation reads the whole document, mutates an in-memory copy and
/// writes the whole document back. Nothing guards against another process
/// writing the same key in between.
pub struct LocalDataService<S: KeyValueStore> {
    store: S,
}

impl<S> LocalDataService<S>
where
    S: KeyValueStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    async fn load(&self) -> Result<Vec<TaskList>, DataStoreError> {
        let raw = match self.store.read(STORAGE_KEY).await? {
            Some(raw) => raw,
            None => return Ok(Vec::new()),
        };
        match serde_json::from_str(&raw) {
            Ok(lists) => Ok(lists),
            Err(err) => {
                warn!(reason = %err, "stored task lists are unreadable, starting empty");
                Ok(Vec::new())
            }
        }
    }

    async fn save(&self, lists: &[TaskList]) -> Result<(), DataStoreError> {
        let raw = serde_json::to_string(lists)?;
        self.store.write(STORAGE_KEY, raw).await?;
        Ok(())
    }
}

fn find_list<'a>(lists: &'a mut [TaskList], id: &str) -> Result<&'a mut TaskList, DataStoreError> {
    lists
        .iter_mut()
        .find(|l| l.id == id)
        .ok_or_else(|| DataStoreError::ListNotFound(id.to_string()))
}

fn find_task<'a>(list: &'a mut TaskList, task_id: &str) -> Result<&'a mut Task, DataStoreError> {
    let list_id = list.id.clone();
    list.task_mut(task_id)
        .ok_or_else(|| DataStoreError::TaskNotFound {
            list_id,
            task_id: task_id.to_string(),
        })
}

/// Next identifier: the current time in milliseconds, bumped past the
/// largest numeric id already in the document so that two creations inside
/// the same millisecond still get distinct ids. Ids that cannot be bumped
/// without overflowing are ignored.
fn next_id(lists: &[TaskList]) -> String {
    let now = chrono::Utc::now().timestamp_millis().max(0) as u64;
    let bumped = lists
        .iter()
        .flat_map(|l| std::iter::once(&l.id).chain(l.tasks.iter().map(|t| &t.id)))
        .filter_map(|id| id.parse::<u64>().ok())
        .filter_map(|id| id.checked_add(1))
        .max();
    match bumped {
        Some(next) if next > now => next.to_string(),
        _ => now.to_string(),
    }
}

#[async_trait]
impl<S> TaskDataService for LocalDataService<S>
where
    S: KeyValueStore,
{
    async fn get_task_lists(&self) -> Result<Vec<TaskList>, DataStoreError> {
        self.load().await
    }

    async fn add_task_list(&self, list: NewTaskList) -> Result<TaskList, DataStoreError> {
        let mut lists = self.load().await?;
        let created = TaskList::new(next_id(&lists), list.title, list.description);
        lists.push(created.clone());
        self.save(&lists).await?;
        debug!(list_id = created.id.as_str(), "task list created");
        Ok(created)
    }

    async fn update_task_list(&self, update: TaskListUpdate) -> Result<TaskList, DataStoreError> {
        let mut lists = self.load().await?;
        let list = find_list(&mut lists, &update.id)?;
        update.apply(list);
        let updated = list.clone();
        self.save(&lists).await?;
        Ok(updated)
    }

    async fn delete_task_list(&self, id: &str) -> Result<(), DataStoreError> {
        let mut lists = self.load().await?;
        lists.retain(|l| l.id != id);
        self.save(&lists).await
    }

    async fn add_task(&self, list_id: &str, task: NewTask) -> Result<Task, DataStoreError> {
        let mut lists = self.load().await?;
        let id = next_id(&lists);
        let list = find_list(&mut lists, list_id)?;
        let created = Task::new(id, task.description);
        list.tasks.push(created.clone());
        self.save(&lists).await?;
        debug!(list_id, task_id = created.id.as_str(), "task created");
        Ok(created)
    }

    async fn update_task(&self, list_id: &str, task: TaskUpdate) -> Result<Task, DataStoreError> {
        let mut lists = self.load().await?;
        let list = find_list(&mut lists, list_id)?;
        let stored = find_task(list, &task.id)?;
        stored.description = task.description;
        let updated = stored.clone();
        self.save(&lists).await?;
        Ok(updated)
    }

    async fn toggle_task_completed(
        &self,
        list_id: &str,
        task_id: &str,
    ) -> Result<Task, DataStoreError> {
        let mut lists = self.load().await?;
        let list = find_list(&mut lists, list_id)?;
        let stored = find_task(list, task_id)?;
        stored.toggle();
        let toggled = stored.clone();
        self.save(&lists).await?;
        Ok(toggled)
    }

    async fn delete_task(&self, list_id: &str, task_id: &str) -> Result<(), DataStoreError> {
        let mut lists = self.load().await?;
        // a missing task is not an error, only a missing list
        find_list(&mut lists, list_id)?.remove_task(task_id);
        self.save(&lists).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastore::storage::{MemoryStore, StorageError};

    fn service() -> LocalDataService<MemoryStore> {
        LocalDataService::new(MemoryStore::new())
    }

    fn new_list(title: &str) -> NewTaskList {
        NewTaskList {
            title: title.to_string(),
            description: String::new(),
        }
    }

    fn new_task(description: &str) -> NewTask {
        NewTask {
            description: description.to_string(),
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        async fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::InvalidKey(key.to_string()))
        }

        async fn write(&self, key: &str, _data: String) -> Result<(), StorageError> {
            Err(StorageError::InvalidKey(key.to_string()))
        }
    }

    #[tokio::test]
    async fn test_groceries_scenario() {
        // GIVEN
        let ds = service();
        let list = ds.add_task_list(new_list("Groceries")).await.unwrap();
        assert!(list.tasks.is_empty());

        // WHEN
        let milk = ds.add_task(&list.id, new_task("Milk")).await.unwrap();
        let toggled = ds.toggle_task_completed(&list.id, &milk.id).await.unwrap();

        // THEN
        assert!(!milk.completed, "new task starts incomplete");
        assert!(toggled.completed);
        assert_eq!(toggled.description, "Milk");

        let lists = ds.get_task_lists().await.unwrap();
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].tasks, vec![toggled]);
    }

    #[tokio::test]
    async fn test_document_round_trip() {
        // GIVEN
        let ds = service();
        let a = ds.add_task_list(new_list("A")).await.unwrap();
        let b = ds.add_task_list(new_list("B")).await.unwrap();
        let t1 = ds.add_task(&a.id, new_task("one")).await.unwrap();
        ds.add_task(&a.id, new_task("two")).await.unwrap();
        ds.update_task_list(TaskListUpdate {
            id: b.id.clone(),
            title: None,
            description: Some("described".into()),
        })
        .await
        .unwrap();
        ds.delete_task(&a.id, &t1.id).await.unwrap();
        let expected = ds.get_task_lists().await.unwrap();

        // WHEN
        let raw = ds.store.read(STORAGE_KEY).await.unwrap().unwrap();
        let decoded: Vec<TaskList> = serde_json::from_str(&raw).unwrap();

        // THEN
        assert_eq!(decoded, expected);
        assert_eq!(expected[0].tasks.len(), 1);
        assert_eq!(expected[0].tasks[0].description, "two");
        assert_eq!(expected[1].title, "B");
        assert_eq!(expected[1].description, "described");
    }

    #[tokio::test]
    async fn test_ids_unique_under_rapid_creation() {
        let ds = service();
        let list = ds.add_task_list(new_list("fast")).await.unwrap();

        let mut ids = vec![list.id.clone()];
        for i in 0..20 {
            ids.push(ds.add_task(&list.id, new_task(&i.to_string())).await.unwrap().id);
        }
        let mut deduped = ids.clone();
        deduped.sort();
        deduped.dedup();

        assert_eq!(deduped.len(), ids.len(), "every id is distinct: {:?}", ids);
    }

    #[tokio::test]
    async fn test_max_stored_id_does_not_overflow() {
        // GIVEN
        let store = MemoryStore::new();
        let seeded = format!(
            r#"[{{"id":"{}","title":"edge","description":"","tasks":[]}}]"#,
            u64::MAX
        );
        store.write(STORAGE_KEY, seeded).await.unwrap();
        let ds = LocalDataService::new(store);

        // WHEN
        let created = ds.add_task_list(new_list("after edge")).await.unwrap();

        // THEN
        assert_ne!(created.id, u64::MAX.to_string());
        assert_ne!(created.id, "0");
        assert_eq!(ds.get_task_lists().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_double_toggle_is_persisted() {
        // GIVEN
        let ds = service();
        let list = ds.add_task_list(new_list("L")).await.unwrap();
        let task = ds.add_task(&list.id, new_task("Milk")).await.unwrap();

        // WHEN
        ds.toggle_task_completed(&list.id, &task.id).await.unwrap();
        let once = ds.get_task_lists().await.unwrap();
        ds.toggle_task_completed(&list.id, &task.id).await.unwrap();
        let twice = ds.get_task_lists().await.unwrap();

        // THEN
        assert!(once[0].tasks[0].completed);
        assert!(!twice[0].tasks[0].completed, "second toggle restores the stored flag");
        assert_eq!(twice[0].tasks[0], task);
    }

    #[tokio::test]
    async fn test_delete_list_cascades() {
        // GIVEN
        let ds = service();
        let doomed = ds.add_task_list(new_list("doomed")).await.unwrap();
        let kept = ds.add_task_list(new_list("kept")).await.unwrap();
        let task = ds.add_task(&doomed.id, new_task("gone")).await.unwrap();
        ds.add_task(&kept.id, new_task("stays")).await.unwrap();

        // WHEN
        ds.delete_task_list(&doomed.id).await.unwrap();

        // THEN
        let lists = ds.get_task_lists().await.unwrap();
        assert_eq!(lists.len(), 1);
        assert!(lists
            .iter()
            .all(|l| l.tasks.iter().all(|t| t.id != task.id)));
        let err = ds.toggle_task_completed(&doomed.id, &task.id).await.unwrap_err();
        assert_eq!(err, DataStoreError::ListNotFound(doomed.id.clone()));

        // deleting again is a silent no-op
        ds.delete_task_list(&doomed.id).await.unwrap();
        assert_eq!(ds.get_task_lists().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_add_task_leaves_other_lists_alone() {
        let ds = service();
        let a = ds.add_task_list(new_list("A")).await.unwrap();
        let b = ds.add_task_list(new_list("B")).await.unwrap();
        ds.add_task(&b.id, new_task("b-task")).await.unwrap();
        let before = ds.get_task_lists().await.unwrap();

        ds.add_task(&a.id, new_task("a-task")).await.unwrap();

        let after = ds.get_task_lists().await.unwrap();
        assert_eq!(after[1], before[1]);
        assert_eq!(after[0].tasks.len(), 1);
    }

    #[tokio::test]
    async fn test_update_unknown_task_is_not_found() {
        // GIVEN
        let ds = service();
        let list = ds.add_task_list(new_list("L")).await.unwrap();
        ds.add_task(&list.id, new_task("only")).await.unwrap();
        let before = ds.get_task_lists().await.unwrap();

        // WHEN
        let err = ds
            .update_task(
                &list.id,
                TaskUpdate {
                    id: "missing".into(),
                    description: "x".into(),
                },
            )
            .await
            .unwrap_err();

        // THEN
        assert!(matches!(err, DataStoreError::TaskNotFound { .. }));
        assert_eq!(
            err.to_string(),
            format!("Task with id missing not found in list {}", list.id)
        );
        assert_eq!(ds.get_task_lists().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_update_task_keeps_completed_flag() {
        let ds = service();
        let list = ds.add_task_list(new_list("L")).await.unwrap();
        let task = ds.add_task(&list.id, new_task("before")).await.unwrap();
        ds.toggle_task_completed(&list.id, &task.id).await.unwrap();

        let updated = ds
            .update_task(
                &list.id,
                TaskUpdate {
                    id: task.id.clone(),
                    description: "after".into(),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.description, "after");
        assert!(updated.completed);
    }

    #[tokio::test]
    async fn test_unknown_list_is_not_found() {
        let ds = service();

        let add = ds.add_task("nope", new_task("x")).await.unwrap_err();
        let update = ds
            .update_task_list(TaskListUpdate {
                id: "nope".into(),
                title: Some("t".into()),
                description: None,
            })
            .await
            .unwrap_err();
        let delete = ds.delete_task("nope", "1").await.unwrap_err();

        assert_eq!(add, DataStoreError::ListNotFound("nope".into()));
        assert_eq!(update, DataStoreError::ListNotFound("nope".into()));
        assert_eq!(delete, DataStoreError::ListNotFound("nope".into()));
    }

    #[tokio::test]
    async fn test_delete_missing_task_is_silent() {
        let ds = service();
        let list = ds.add_task_list(new_list("L")).await.unwrap();
        ds.add_task(&list.id, new_task("keep")).await.unwrap();

        ds.delete_task(&list.id, "missing").await.unwrap();

        assert_eq!(ds.get_task_lists().await.unwrap()[0].tasks.len(), 1);
    }

    #[tokio::test]
    async fn test_unreadable_document_starts_empty() {
        let store = MemoryStore::new();
        store.write(STORAGE_KEY, "{not json".to_string()).await.unwrap();
        let ds = LocalDataService::new(store);

        assert!(ds.get_task_lists().await.unwrap().is_empty());
        let list = ds.add_task_list(new_list("fresh")).await.unwrap();
        assert_eq!(ds.get_task_lists().await.unwrap(), vec![list]);
    }

    #[tokio::test]
    async fn test_inaccessible_store_is_unavailable() {
        let ds = LocalDataService::new(BrokenStore);

        let err = ds.get_task_lists().await.unwrap_err();

        assert!(matches!(err, DataStoreError::StorageUnavailable(_)));
    }
}
