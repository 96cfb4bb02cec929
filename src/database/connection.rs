// Database Connection Management
//
// Handles PostgreSQL connection pooling using tokio-postgres and deadpool.
use anyhow::{Context, Result};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;
use std::str::FromStr;
use std::time::Duration;

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_size: usize,
    pub timeouts: deadpool_postgres::Timeouts,
}

impl DatabaseConfig {
    /// Create configuration from database URL
    pub fn from_url(url: &str, max_size: usize) -> Result<Self> {
        let parsed = url::Url::parse(url).context("Failed to parse database URL")?;

        if parsed.scheme() != "postgresql" && parsed.scheme() != "postgres" {
            anyhow::bail!("Invalid database URL scheme, expected postgresql or postgres");
        }

        Ok(Self {
            url: url.to_string(),
            max_size,
            timeouts: deadpool_postgres::Timeouts {
                wait: Some(Duration::from_secs(30)),
                create: Some(Duration::from_secs(30)),
                recycle: Some(Duration::from_secs(30)),
            },
        })
    }

    /// Host, port and database name with credentials left out, for logs
    pub fn masked(&self) -> String {
        match url::Url::parse(&self.url) {
            Ok(parsed) => format!(
                "{}:{}{}",
                parsed.host_str().unwrap_or("localhost"),
                parsed.port().unwrap_or(5432),
                parsed.path()
            ),
            Err(_) => "<unparseable url>".to_string(),
        }
    }
}

/// Database connection wrapper
#[derive(Debug, Clone)]
pub struct DatabaseConnection {
    pool: Pool,
}

impl DatabaseConnection {
    /// Create a new database connection with the provided configuration
    pub async fn new(config: DatabaseConfig) -> Result<Self> {
        tracing::info!("Connecting to database: {}", config.masked());

        let pg_config =
            tokio_postgres::Config::from_str(&config.url).context("Failed to parse DATABASE_URL")?;

        let tls_connector = TlsConnector::builder()
            .build()
            .context("Failed to build TLS connector")?;
        let tls = MakeTlsConnector::new(tls_connector);

        let mgr_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };
        let mgr = Manager::from_config(pg_config, tls, mgr_config);

        let pool = Pool::builder(mgr)
            .max_size(config.max_size)
            .wait_timeout(config.timeouts.wait)
            .create_timeout(config.timeouts.create)
            .recycle_timeout(config.timeouts.recycle)
            .runtime(deadpool_postgres::Runtime::Tokio1)
            .build()
            .context("Failed to create database pool")?;

        let connection = Self { pool };
        connection
            .health_check()
            .await
            .context("Failed to test database connection")?;

        tracing::info!("Database connection established successfully");

        Ok(connection)
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    /// Check database health
    pub async fn health_check(&self) -> Result<()> {
        let client = self
            .pool
            .get()
            .await
            .context("Failed to get connection for health check")?;

        client
            .query("SELECT 1", &[])
            .await
            .context("Database health check failed")?;
        Ok(())
    }
}
