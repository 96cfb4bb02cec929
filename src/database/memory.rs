//! In-memory store used when no database is configured, and by tests.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI32, Ordering};

use crate::database::models::{Board, NewTask, NewUser, TaskChanges, TaskItem, TaskStatus, UserRecord};
use crate::database::store::{CredentialStore, StoreError, StoreResult, TaskStore};

/// Thread-safe store holding users, boards and tasks in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: DashMap<String, UserRecord>,
    next_user_id: AtomicI32,
    boards: RwLock<BoardState>,
}

#[derive(Debug, Default)]
struct BoardState {
    next_board_id: i32,
    next_task_id: i32,
    boards: BTreeMap<i32, String>,
    tasks: BTreeMap<i32, TaskItem>,
}

impl BoardState {
    fn assemble(&self, id: i32, name: &str) -> Board {
        Board {
            id,
            name: name.to_string(),
            tasks: self
                .tasks
                .values()
                .filter(|task| task.board_id == id)
                .cloned()
                .collect(),
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn task_count(&self) -> usize {
        self.boards.read().tasks.len()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn lookup(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        Ok(self.users.get(email).map(|entry| entry.value().clone()))
    }

    async fn insert(&self, user: NewUser) -> StoreResult<UserRecord> {
        // The entry guard makes check-and-insert atomic per email
        match self.users.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(StoreError::Conflict(format!(
                "email {} is already registered",
                user.email
            ))),
            Entry::Vacant(slot) => {
                let record = UserRecord {
                    id: self.next_user_id.fetch_add(1, Ordering::SeqCst) + 1,
                    email: user.email,
                    password_hash: user.password_hash,
                    created_at: Utc::now(),
                };
                slot.insert(record.clone());
                Ok(record)
            }
        }
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn create_board(&self, name: &str) -> StoreResult<Board> {
        let mut state = self.boards.write();
        state.next_board_id += 1;
        let id = state.next_board_id;
        state.boards.insert(id, name.to_string());
        Ok(Board {
            id,
            name: name.to_string(),
            tasks: Vec::new(),
        })
    }

    async fn list_boards(&self) -> StoreResult<Vec<Board>> {
        let state = self.boards.read();
        Ok(state
            .boards
            .iter()
            .map(|(id, name)| state.assemble(*id, name))
            .collect())
    }

    async fn find_board(&self, id: i32) -> StoreResult<Option<Board>> {
        let state = self.boards.read();
        Ok(state.boards.get(&id).map(|name| state.assemble(id, name)))
    }

    async fn create_task(&self, task: NewTask) -> StoreResult<TaskItem> {
        let mut state = self.boards.write();
        if !state.boards.contains_key(&task.board_id) {
            return Err(StoreError::MissingReference(format!(
                "board {} does not exist",
                task.board_id
            )));
        }
        state.next_task_id += 1;
        let item = task.into_task(state.next_task_id);
        state.tasks.insert(item.id, item.clone());
        Ok(item)
    }

    async fn find_task(&self, id: i32) -> StoreResult<Option<TaskItem>> {
        Ok(self.boards.read().tasks.get(&id).cloned())
    }

    async fn update_task(&self, id: i32, changes: TaskChanges) -> StoreResult<Option<TaskItem>> {
        let mut state = self.boards.write();
        Ok(state.tasks.get_mut(&id).map(|task| {
            changes.apply_to(task);
            task.clone()
        }))
    }

    async fn set_task_status(&self, id: i32, status: TaskStatus) -> StoreResult<Option<TaskItem>> {
        let mut state = self.boards.write();
        Ok(state.tasks.get_mut(&id).map(|task| {
            task.status = status;
            task.clone()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_task(board_id: i32, title: &str) -> NewTask {
        NewTask {
            board_id,
            title: title.to_string(),
            description: None,
            due_date: None,
            priority: 0,
            status: TaskStatus::ToDo,
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryStore::new();
        let user = NewUser {
            email: "a@example.com".to_string(),
            password_hash: "hash".to_string(),
        };
        let first = store.insert(user.clone()).await.unwrap();
        assert_eq!(first.id, 1);
        assert!(matches!(store.insert(user).await, Err(StoreError::Conflict(_))));
        assert_eq!(store.lookup("a@example.com").await.unwrap(), Some(first));
        assert_eq!(store.lookup("b@example.com").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_boards_own_their_tasks() {
        let store = MemoryStore::new();
        let work = store.create_board("Work").await.unwrap();
        let home = store.create_board("Home").await.unwrap();

        store.create_task(new_task(work.id, "a")).await.unwrap();
        store.create_task(new_task(home.id, "b")).await.unwrap();
        store.create_task(new_task(work.id, "c")).await.unwrap();

        let boards = store.list_boards().await.unwrap();
        assert_eq!(boards.len(), 2);
        let titles: Vec<_> = boards[0].tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "c"]);
        assert_eq!(boards[1].tasks.len(), 1);
    }

    #[tokio::test]
    async fn test_task_on_missing_board_is_rejected() {
        let store = MemoryStore::new();
        let result = store.create_task(new_task(42, "orphan")).await;
        assert!(matches!(result, Err(StoreError::MissingReference(_))));
        assert_eq!(store.task_count(), 0);
    }

    #[tokio::test]
    async fn test_updates_on_missing_task_return_none() {
        let store = MemoryStore::new();
        assert!(store.set_task_status(999, TaskStatus::Done).await.unwrap().is_none());
        assert_eq!(store.task_count(), 0);
    }
}
