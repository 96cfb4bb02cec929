//! Store contracts shared by the PostgreSQL and in-memory backends.

use async_trait::async_trait;
use thiserror::Error;

use crate::database::models::{Board, NewTask, NewUser, TaskChanges, TaskItem, TaskStatus, UserRecord};

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique key is already taken
    #[error("conflict: {0}")]
    Conflict(String),

    /// A foreign key points at nothing
    #[error("missing reference: {0}")]
    MissingReference(String),

    #[error("store call timed out")]
    Timeout,

    #[error("failed to get database connection: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    #[error("database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    /// A stored row holds a value the domain does not accept
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Account persistence keyed by normalised email
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Returns `None` when no account uses `email`.
    async fn lookup(&self, email: &str) -> StoreResult<Option<UserRecord>>;

    /// Fails with [`StoreError::Conflict`] when the email is taken.
    async fn insert(&self, user: NewUser) -> StoreResult<UserRecord>;
}

/// Board and task persistence keyed by integer id
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn create_board(&self, name: &str) -> StoreResult<Board>;

    /// All boards with their tasks, ordered by id.
    async fn list_boards(&self) -> StoreResult<Vec<Board>>;

    async fn find_board(&self, id: i32) -> StoreResult<Option<Board>>;

    /// Fails with [`StoreError::MissingReference`] when the board is absent.
    async fn create_task(&self, task: NewTask) -> StoreResult<TaskItem>;

    async fn find_task(&self, id: i32) -> StoreResult<Option<TaskItem>>;

    /// Replaces every editable field. `None` when the task is absent.
    async fn update_task(&self, id: i32, changes: TaskChanges) -> StoreResult<Option<TaskItem>>;

    /// Writes `status` and nothing else. `None` when the task is absent.
    async fn set_task_status(&self, id: i32, status: TaskStatus) -> StoreResult<Option<TaskItem>>;
}

/// Bound a store call so a hung backend cannot stall the request
pub async fn with_timeout<T, F>(limit: std::time::Duration, call: F) -> StoreResult<T>
where
    F: std::future::Future<Output = StoreResult<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => {
            tracing::error!("Store call exceeded {:?}", limit);
            Err(StoreError::Timeout)
        }
    }
}
