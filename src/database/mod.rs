//! # Database Module
//!
//! PostgreSQL integration with tokio-postgres and deadpool, an in-memory
//! fallback, and the store contracts both implement.

pub mod connection;
pub mod memory;
pub mod migrations;
pub mod models;
pub mod postgres;
pub mod store;

pub use connection::{DatabaseConfig, DatabaseConnection};
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::{CredentialStore, StoreError, StoreResult, TaskStore, with_timeout};
