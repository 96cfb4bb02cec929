//! # Server Module
//!
//! HTTP server setup and route configuration for the taskboard server.

use anyhow::{Context, Result};
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::get,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::middleware::require_auth;
use crate::auth::{AuthService, TokenIssuer};
use crate::config::{Config, ServerConfig};
use crate::database::{
    CredentialStore, DatabaseConfig, DatabaseConnection, MemoryStore, PgStore, TaskStore,
    migrations,
};
use crate::routes::{auth, boards, health::ping, tasks};
use crate::services::TaskLifecycle;

/// Application state shared across all route handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub tasks: TaskLifecycle,
    pub token_issuer: Arc<TokenIssuer>,
}

impl AppState {
    pub fn new(
        config: &Config,
        credentials: Arc<dyn CredentialStore>,
        task_store: Arc<dyn TaskStore>,
    ) -> Result<Self> {
        let token_issuer =
            Arc::new(TokenIssuer::new(&config.jwt).context("Invalid token configuration")?);

        Ok(Self {
            auth: AuthService::new(credentials, token_issuer.clone(), config.store_timeout),
            tasks: TaskLifecycle::new(task_store, config.store_timeout),
            token_issuer,
        })
    }
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([
            header::ORIGIN,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::AUTHORIZATION,
        ])
        .allow_credentials(true)
}

/// Assemble the full router; board and task routes require a token
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .merge(boards::create_board_routes())
        .merge(tasks::create_task_routes())
        .merge(auth::create_protected_auth_routes())
        .layer(middleware::from_fn_with_state(
            state.token_issuer.clone(),
            require_auth,
        ));

    Router::new()
        .route("/ping", get(ping))
        .merge(auth::create_auth_routes())
        .merge(protected)
        .with_state(state)
}

/// Pick the storage backend: PostgreSQL when configured, memory otherwise
async fn open_stores(config: &Config) -> Result<(Arc<dyn CredentialStore>, Arc<dyn TaskStore>)> {
    match &config.database_url {
        Some(url) => {
            let db_config = DatabaseConfig::from_url(url, config.database_max_connections)?;
            let db = DatabaseConnection::new(db_config).await?;
            migrations::run_migrations(db.pool()).await?;
            let store = Arc::new(PgStore::new(db));
            let credentials: Arc<dyn CredentialStore> = store.clone();
            let task_store: Arc<dyn TaskStore> = store;
            Ok((credentials, task_store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory store, data will not persist");
            let store = Arc::new(MemoryStore::new());
            let credentials: Arc<dyn CredentialStore> = store.clone();
            let task_store: Arc<dyn TaskStore> = store;
            Ok((credentials, task_store))
        }
    }
}

/// Starts the HTTP server and serves until the process is stopped.
pub async fn start(config: Config) -> Result<()> {
    let (credentials, task_store) = open_stores(&config).await?;
    let state = AppState::new(&config, credentials, task_store)?;

    if let Some(seed) = &config.seed_account {
        let created = state
            .auth
            .seed_account(&seed.email, &seed.password)
            .await
            .context("Failed to create seed account")?;
        if created {
            tracing::info!("Seed account {} created", seed.email);
        }
    }

    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors_layer(&config.server)),
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr} - port may already be in use"))?;

    tracing::info!("Taskboard server listening on http://{}", addr);
    tracing::info!("Health check available at http://{}/ping", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
