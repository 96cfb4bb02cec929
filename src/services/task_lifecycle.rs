//! Board and task lifecycle.
//!
//! Inputs arrive as loosely typed requests, are validated here (non-empty
//! names and titles, a known status, an existing board) and only then reach
//! the [`TaskStore`]. Every store call is bounded by the configured timeout.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::database::models::{Board, NewTask, TaskChanges, TaskItem, TaskStatus};
use crate::database::{StoreError, TaskStore, with_timeout};

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("task {0} not found")]
    TaskNotFound(i32),

    #[error("board {0} not found")]
    BoardNotFound(i32),

    /// A new task referenced a board that does not exist
    #[error("board {0} does not exist")]
    UnknownBoard(i32),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type TaskResult<T> = Result<T, TaskError>;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBoardRequest {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub board_id: i32,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: i32,
    /// Defaults to "To Do"
    #[serde(default)]
    pub status: Option<String>,
}

/// Full replacement of a task's editable fields
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub status: Option<String>,
}

fn parse_status(raw: Option<&str>) -> TaskResult<TaskStatus> {
    match raw {
        None => Ok(TaskStatus::default()),
        Some(value) => {
            TaskStatus::try_from(value).map_err(|e| TaskError::Validation(e.to_string()))
        }
    }
}

fn required(field: &str, value: &str) -> TaskResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TaskError::Validation(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

#[derive(Clone)]
pub struct TaskLifecycle {
    store: Arc<dyn TaskStore>,
    store_timeout: Duration,
}

impl TaskLifecycle {
    pub fn new(store: Arc<dyn TaskStore>, store_timeout: Duration) -> Self {
        Self {
            store,
            store_timeout,
        }
    }

    pub async fn create_board(&self, request: CreateBoardRequest) -> TaskResult<Board> {
        let name = required("name", &request.name)?;
        let board = with_timeout(self.store_timeout, self.store.create_board(&name)).await?;
        tracing::info!("Created board {} ({})", board.id, board.name);
        Ok(board)
    }

    pub async fn list_boards(&self) -> TaskResult<Vec<Board>> {
        Ok(with_timeout(self.store_timeout, self.store.list_boards()).await?)
    }

    pub async fn get_board(&self, id: i32) -> TaskResult<Board> {
        with_timeout(self.store_timeout, self.store.find_board(id))
            .await?
            .ok_or(TaskError::BoardNotFound(id))
    }

    /// Add a task to an existing board
    pub async fn create_task(&self, request: CreateTaskRequest) -> TaskResult<TaskItem> {
        let new_task = NewTask {
            board_id: request.board_id,
            title: required("title", &request.title)?,
            description: request.description,
            due_date: request.due_date,
            priority: request.priority,
            status: parse_status(request.status.as_deref())?,
        };

        let task = with_timeout(self.store_timeout, self.store.create_task(new_task))
            .await
            .map_err(|e| match e {
                StoreError::MissingReference(_) => TaskError::UnknownBoard(request.board_id),
                other => TaskError::Store(other),
            })?;

        tracing::info!("Created task {} on board {}", task.id, task.board_id);
        Ok(task)
    }

    pub async fn get_task(&self, id: i32) -> TaskResult<TaskItem> {
        with_timeout(self.store_timeout, self.store.find_task(id))
            .await?
            .ok_or(TaskError::TaskNotFound(id))
    }

    /// Replace title, description, due date, priority and status
    pub async fn update_task(&self, id: i32, request: UpdateTaskRequest) -> TaskResult<TaskItem> {
        let changes = TaskChanges {
            title: required("title", &request.title)?,
            description: request.description,
            due_date: request.due_date,
            priority: request.priority,
            status: parse_status(request.status.as_deref())?,
        };

        let task = with_timeout(self.store_timeout, self.store.update_task(id, changes))
            .await?
            .ok_or(TaskError::TaskNotFound(id))?;
        tracing::info!("Updated task {}", id);
        Ok(task)
    }

    /// Move a task to another column, leaving every other field alone
    pub async fn move_task(&self, id: i32, new_status: &str) -> TaskResult<TaskItem> {
        let status = parse_status(Some(new_status))?;
        let task = with_timeout(self.store_timeout, self.store.set_task_status(id, status))
            .await?
            .ok_or(TaskError::TaskNotFound(id))?;
        tracing::info!("Moved task {} to {}", id, status);
        Ok(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::database::StoreResult;
    use async_trait::async_trait;

    fn lifecycle() -> (TaskLifecycle, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (
            TaskLifecycle::new(store.clone(), Duration::from_secs(5)),
            store,
        )
    }

    fn task_request(board_id: i32, title: &str) -> CreateTaskRequest {
        CreateTaskRequest {
            board_id,
            title: title.to_string(),
            description: Some("details".to_string()),
            due_date: Some(Utc::now()),
            priority: 3,
            status: None,
        }
    }

    #[tokio::test]
    async fn test_create_then_fetch_round_trips() {
        let (lifecycle, _) = lifecycle();
        let board = lifecycle
            .create_board(CreateBoardRequest { name: "Work".to_string() })
            .await
            .unwrap();

        let request = task_request(board.id, "Ship it");
        let created = lifecycle.create_task(request.clone()).await.unwrap();
        let fetched = lifecycle.get_task(created.id).await.unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.title, request.title);
        assert_eq!(fetched.description, request.description);
        assert_eq!(fetched.due_date, request.due_date);
        assert_eq!(fetched.priority, request.priority);
        assert_eq!(fetched.status, TaskStatus::ToDo);
        assert_eq!(fetched.board_id, board.id);
    }

    #[tokio::test]
    async fn test_move_changes_only_status() {
        let (lifecycle, _) = lifecycle();
        let board = lifecycle
            .create_board(CreateBoardRequest { name: "Work".to_string() })
            .await
            .unwrap();
        let before = lifecycle.create_task(task_request(board.id, "a")).await.unwrap();
        assert_eq!(before.id, 1);

        let after = lifecycle.move_task(1, "Done").await.unwrap();
        assert_eq!(after.status, TaskStatus::Done);
        assert_eq!(TaskItem { status: before.status, ..after.clone() }, before);
        assert_eq!(lifecycle.get_task(1).await.unwrap(), after);
    }

    #[tokio::test]
    async fn test_move_missing_task_is_not_found() {
        let (lifecycle, store) = lifecycle();
        let board = lifecycle
            .create_board(CreateBoardRequest { name: "Work".to_string() })
            .await
            .unwrap();
        lifecycle.create_task(task_request(board.id, "a")).await.unwrap();
        let snapshot = lifecycle.list_boards().await.unwrap();

        let result = lifecycle.move_task(999, "Done").await;
        assert!(matches!(result, Err(TaskError::TaskNotFound(999))));
        assert_eq!(lifecycle.list_boards().await.unwrap(), snapshot);
        assert_eq!(store.task_count(), 1);
    }

    #[tokio::test]
    async fn test_invalid_status_is_rejected_without_writing() {
        let (lifecycle, _) = lifecycle();
        let board = lifecycle
            .create_board(CreateBoardRequest { name: "Work".to_string() })
            .await
            .unwrap();
        let task = lifecycle.create_task(task_request(board.id, "a")).await.unwrap();

        let result = lifecycle.move_task(task.id, "Blocked").await;
        assert!(matches!(result, Err(TaskError::Validation(_))));
        assert_eq!(lifecycle.get_task(task.id).await.unwrap(), task);

        let mut bad = task_request(board.id, "b");
        bad.status = Some("Someday".to_string());
        assert!(matches!(
            lifecycle.create_task(bad).await,
            Err(TaskError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_update_replaces_wholesale() {
        let (lifecycle, _) = lifecycle();
        let board = lifecycle
            .create_board(CreateBoardRequest { name: "Work".to_string() })
            .await
            .unwrap();
        let task = lifecycle.create_task(task_request(board.id, "a")).await.unwrap();

        let updated = lifecycle
            .update_task(
                task.id,
                UpdateTaskRequest {
                    title: "renamed".to_string(),
                    description: None,
                    due_date: None,
                    priority: 1,
                    status: Some("In Progress".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.id, task.id);
        assert_eq!(updated.board_id, task.board_id);
        assert_eq!(updated.title, "renamed");
        assert_eq!(updated.description, None);
        assert_eq!(updated.due_date, None);
        assert_eq!(updated.priority, 1);
        assert_eq!(updated.status, TaskStatus::InProgress);
    }

    #[tokio::test]
    async fn test_update_missing_task_is_not_found() {
        let (lifecycle, store) = lifecycle();
        let result = lifecycle
            .update_task(
                42,
                UpdateTaskRequest {
                    title: "x".to_string(),
                    description: None,
                    due_date: None,
                    priority: 0,
                    status: None,
                },
            )
            .await;
        assert!(matches!(result, Err(TaskError::TaskNotFound(42))));
        assert_eq!(store.task_count(), 0);
    }

    #[tokio::test]
    async fn test_task_requires_existing_board_and_title() {
        let (lifecycle, store) = lifecycle();
        assert!(matches!(
            lifecycle.create_task(task_request(7, "orphan")).await,
            Err(TaskError::UnknownBoard(7))
        ));

        let board = lifecycle
            .create_board(CreateBoardRequest { name: "Work".to_string() })
            .await
            .unwrap();
        assert!(matches!(
            lifecycle.create_task(task_request(board.id, "   ")).await,
            Err(TaskError::Validation(_))
        ));
        assert_eq!(store.task_count(), 0);
    }

    #[tokio::test]
    async fn test_board_name_is_required() {
        let (lifecycle, _) = lifecycle();
        let result = lifecycle
            .create_board(CreateBoardRequest { name: " ".to_string() })
            .await;
        assert!(matches!(result, Err(TaskError::Validation(_))));
        assert!(matches!(
            lifecycle.get_board(1).await,
            Err(TaskError::BoardNotFound(1))
        ));
    }

    /// Store whose task lookups never complete
    struct HungStore;

    #[async_trait]
    impl TaskStore for HungStore {
        async fn create_board(&self, _name: &str) -> StoreResult<Board> {
            std::future::pending().await
        }
        async fn list_boards(&self) -> StoreResult<Vec<Board>> {
            std::future::pending().await
        }
        async fn find_board(&self, _id: i32) -> StoreResult<Option<Board>> {
            std::future::pending().await
        }
        async fn create_task(&self, _task: NewTask) -> StoreResult<TaskItem> {
            std::future::pending().await
        }
        async fn find_task(&self, _id: i32) -> StoreResult<Option<TaskItem>> {
            std::future::pending().await
        }
        async fn update_task(
            &self,
            _id: i32,
            _changes: TaskChanges,
        ) -> StoreResult<Option<TaskItem>> {
            std::future::pending().await
        }
        async fn set_task_status(
            &self,
            _id: i32,
            _status: TaskStatus,
        ) -> StoreResult<Option<TaskItem>> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_hung_store_times_out() {
        let lifecycle = TaskLifecycle::new(Arc::new(HungStore), Duration::from_millis(20));
        let result = lifecycle.move_task(1, "Done").await;
        assert!(matches!(result, Err(TaskError::Store(StoreError::Timeout))));
    }
}
