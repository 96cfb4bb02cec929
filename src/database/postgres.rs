//! PostgreSQL-backed stores on top of the deadpool connection pool.

use async_trait::async_trait;
use tokio_postgres::error::SqlState;

use crate::database::connection::DatabaseConnection;
use crate::database::models::{
    Board, FromRow, NewTask, NewUser, TaskChanges, TaskItem, TaskStatus, UserRecord,
};
use crate::database::store::{CredentialStore, StoreError, StoreResult, TaskStore};

const TASK_COLUMNS: &str = "id, title, description, due_date, priority, status, board_id";

#[derive(Debug, Clone)]
pub struct PgStore {
    db: DatabaseConnection,
}

impl PgStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn is_violation(err: &tokio_postgres::Error, state: &SqlState) -> bool {
    err.code() == Some(state)
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn lookup(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        let client = self.db.pool().get().await?;
        let row = client
            .query_opt(
                "SELECT id, email, password_hash, created_at FROM users WHERE email = $1",
                &[&email],
            )
            .await?;
        row.as_ref().map(UserRecord::from_row).transpose()
    }

    async fn insert(&self, user: NewUser) -> StoreResult<UserRecord> {
        let client = self.db.pool().get().await?;
        let row = client
            .query_one(
                "INSERT INTO users (email, password_hash) VALUES ($1, $2) \
                 RETURNING id, email, password_hash, created_at",
                &[&user.email, &user.password_hash],
            )
            .await
            .map_err(|e| {
                if is_violation(&e, &SqlState::UNIQUE_VIOLATION) {
                    StoreError::Conflict(format!("email {} is already registered", user.email))
                } else {
                    StoreError::Database(e)
                }
            })?;
        UserRecord::from_row(&row)
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn create_board(&self, name: &str) -> StoreResult<Board> {
        let client = self.db.pool().get().await?;
        let row = client
            .query_one("INSERT INTO boards (name) VALUES ($1) RETURNING id, name", &[&name])
            .await?;
        Board::from_row(&row)
    }

    async fn list_boards(&self) -> StoreResult<Vec<Board>> {
        let client = self.db.pool().get().await?;
        let board_rows = client
            .query("SELECT id, name FROM boards ORDER BY id", &[])
            .await?;
        let task_rows = client
            .query(
                &format!("SELECT {TASK_COLUMNS} FROM tasks ORDER BY board_id, id"),
                &[],
            )
            .await?;

        let mut boards = board_rows
            .iter()
            .map(Board::from_row)
            .collect::<StoreResult<Vec<_>>>()?;
        for row in &task_rows {
            let task = TaskItem::from_row(row)?;
            if let Some(board) = boards.iter_mut().find(|b| b.id == task.board_id) {
                board.tasks.push(task);
            }
        }
        Ok(boards)
    }

    async fn find_board(&self, id: i32) -> StoreResult<Option<Board>> {
        let client = self.db.pool().get().await?;
        let Some(row) = client
            .query_opt("SELECT id, name FROM boards WHERE id = $1", &[&id])
            .await?
        else {
            return Ok(None);
        };

        let mut board = Board::from_row(&row)?;
        let task_rows = client
            .query(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE board_id = $1 ORDER BY id"),
                &[&id],
            )
            .await?;
        board.tasks = task_rows
            .iter()
            .map(TaskItem::from_row)
            .collect::<StoreResult<Vec<_>>>()?;
        Ok(Some(board))
    }

    async fn create_task(&self, task: NewTask) -> StoreResult<TaskItem> {
        let client = self.db.pool().get().await?;
        let row = client
            .query_one(
                &format!(
                    "INSERT INTO tasks (title, description, due_date, priority, status, board_id) \
                     VALUES ($1, $2, $3, $4, $5, $6) RETURNING {TASK_COLUMNS}"
                ),
                &[
                    &task.title,
                    &task.description,
                    &task.due_date,
                    &task.priority,
                    &task.status.as_str(),
                    &task.board_id,
                ],
            )
            .await
            .map_err(|e| {
                if is_violation(&e, &SqlState::FOREIGN_KEY_VIOLATION) {
                    StoreError::MissingReference(format!("board {} does not exist", task.board_id))
                } else {
                    StoreError::Database(e)
                }
            })?;
        TaskItem::from_row(&row)
    }

    async fn find_task(&self, id: i32) -> StoreResult<Option<TaskItem>> {
        let client = self.db.pool().get().await?;
        let row = client
            .query_opt(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"), &[&id])
            .await?;
        row.as_ref().map(TaskItem::from_row).transpose()
    }

    async fn update_task(&self, id: i32, changes: TaskChanges) -> StoreResult<Option<TaskItem>> {
        let client = self.db.pool().get().await?;
        let row = client
            .query_opt(
                &format!(
                    "UPDATE tasks SET title = $2, description = $3, due_date = $4, \
                     priority = $5, status = $6 WHERE id = $1 RETURNING {TASK_COLUMNS}"
                ),
                &[
                    &id,
                    &changes.title,
                    &changes.description,
                    &changes.due_date,
                    &changes.priority,
                    &changes.status.as_str(),
                ],
            )
            .await?;
        row.as_ref().map(TaskItem::from_row).transpose()
    }

    async fn set_task_status(&self, id: i32, status: TaskStatus) -> StoreResult<Option<TaskItem>> {
        let client = self.db.pool().get().await?;
        let row = client
            .query_opt(
                &format!("UPDATE tasks SET status = $2 WHERE id = $1 RETURNING {TASK_COLUMNS}"),
                &[&id, &status.as_str()],
            )
            .await?;
        row.as_ref().map(TaskItem::from_row).transpose()
    }
}
