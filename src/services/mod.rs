//! # Services Module
//!
//! Business logic for boards and tasks.

pub mod task_lifecycle;

pub use task_lifecycle::{TaskError, TaskLifecycle};
