//! # Taskboard Server
//!
//! Task-tracking HTTP API built with Rust, Axum, and Tokio. Clients register
//! or log in with email and password to obtain a bearer token, then create
//! boards, add tasks, and move tasks between the "To Do", "In Progress" and
//! "Done" columns.
//!
//! ## Architecture
//! - `server`: router assembly, storage selection and startup
//! - `config`: environment configuration, validated once at startup
//! - `auth`: token issuance/verification, password hashing, login service
//! - `services`: board and task lifecycle
//! - `database`: store contracts with PostgreSQL and in-memory backends
//! - `routes`: HTTP handlers and error mapping
//!
//! ## Environment Setup
//! `JWT_SECRET` is required. Set `DATABASE_URL` to persist to PostgreSQL;
//! without it the server keeps everything in memory. Values may also be
//! placed in a `.env` file.
//!
//! ## Running the Server
//! ```bash
//! JWT_SECRET=change-me cargo run
//! curl http://localhost:3000/ping
//! ```

mod auth;
mod config;
mod database;
mod routes;
mod server;
mod services;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is normal outside development
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .compact(),
        )
        .init();

    tracing::info!("Starting Taskboard Server...");
    tracing::info!("Package: {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let config = match config::Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            return Err(e.into());
        }
    };

    server::start(config).await
}
