// Database Models
//
// Entities persisted by the stores, plus the row mappings for tokio-postgres.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tokio_postgres::Row;

use crate::database::store::StoreError;

/// Trait for converting from tokio-postgres Row
pub trait FromRow {
    fn from_row(row: &Row) -> Result<Self, StoreError>
    where
        Self: Sized;
}

// ============================================================================
// USER & AUTH MODELS
// ============================================================================

/// Stored account; `password_hash` is an Argon2 PHC string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: i32,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Account about to be inserted; the store assigns id and timestamp
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
}

impl FromRow for UserRecord {
    fn from_row(row: &Row) -> Result<Self, StoreError> {
        Ok(Self {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

// ============================================================================
// BOARD & TASK MODELS
// ============================================================================

/// Column a task sits in.
///
/// Statuses form a closed set. Free-form strings are rejected rather than
/// stored, and any column may move to any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TaskStatus {
    #[default]
    ToDo,
    InProgress,
    Done,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status '{0}', expected one of \"To Do\", \"In Progress\", \"Done\"")]
pub struct ParseTaskStatusError(pub String);

impl TaskStatus {
    /// Label used on the wire and in storage
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ToDo => "To Do",
            Self::InProgress => "In Progress",
            Self::Done => "Done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "to do" | "todo" | "to_do" => Ok(Self::ToDo),
            "in progress" | "in_progress" | "inprogress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            _ => Err(ParseTaskStatusError(value.to_string())),
        }
    }
}

impl TryFrom<String> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl From<TaskStatus> for String {
    fn from(status: TaskStatus) -> Self {
        status.as_str().to_string()
    }
}

/// A board and the tasks it owns, ordered by id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: i32,
    pub name: String,
    pub tasks: Vec<TaskItem>,
}

impl FromRow for Board {
    fn from_row(row: &Row) -> Result<Self, StoreError> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            tasks: Vec::new(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskItem {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: i32,
    pub status: TaskStatus,
    pub board_id: i32,
}

impl FromRow for TaskItem {
    fn from_row(row: &Row) -> Result<Self, StoreError> {
        let status: String = row.try_get("status")?;
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            due_date: row.try_get("due_date")?,
            priority: row.try_get("priority")?,
            status: TaskStatus::try_from(status.as_str())
                .map_err(|e| StoreError::Corrupt(e.to_string()))?,
            board_id: row.try_get("board_id")?,
        })
    }
}

/// Validated task ready to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub board_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: i32,
    pub status: TaskStatus,
}

impl NewTask {
    pub fn into_task(self, id: i32) -> TaskItem {
        TaskItem {
            id,
            title: self.title,
            description: self.description,
            due_date: self.due_date,
            priority: self.priority,
            status: self.status,
            board_id: self.board_id,
        }
    }
}

/// Replacement values for every editable task field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskChanges {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: i32,
    pub status: TaskStatus,
}

impl TaskChanges {
    pub fn apply_to(self, task: &mut TaskItem) {
        task.title = self.title;
        task.description = self.description;
        task.due_date = self.due_date;
        task.priority = self.priority;
        task.status = self.status;
    }
}
