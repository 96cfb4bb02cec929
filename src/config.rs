//! Configuration module for environment variables and application settings
//!
//! Everything the server needs is read once at startup into [`Config`] and
//! handed to the components that use it. A missing signing key is fatal.

use std::env;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_ISSUER: &str = "taskboard-server";
const DEFAULT_AUDIENCE: &str = "taskboard-clients";
const DEFAULT_TTL_MINUTES: i64 = 30;
const DEFAULT_STORE_TIMEOUT_SECS: u64 = 5;

/// Errors raised while loading configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{key} has an invalid value '{value}'")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Token signing settings
    pub jwt: JwtConfig,

    /// Database URL; the in-memory store is used when absent
    pub database_url: Option<String>,

    /// Maximum pooled database connections
    pub database_max_connections: usize,

    /// Server configuration
    pub server: ServerConfig,

    /// Upper bound on any single store call
    pub store_timeout: Duration,

    /// Bootstrap account created at startup when both variables are set
    pub seed_account: Option<SeedAccount>,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl: chrono::Duration,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SeedAccount {
    pub email: String,
    pub password: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        if secret.trim().is_empty() {
            return Err(ConfigError::Empty("JWT_SECRET"));
        }

        let ttl_minutes: i64 = parse_or(&lookup, "JWT_TTL_MINUTES", DEFAULT_TTL_MINUTES)?;
        if ttl_minutes <= 0 {
            return Err(ConfigError::Invalid {
                key: "JWT_TTL_MINUTES",
                value: ttl_minutes.to_string(),
            });
        }

        let jwt = JwtConfig {
            secret,
            issuer: non_empty_or(&lookup, "JWT_ISSUER", DEFAULT_ISSUER)?,
            audience: non_empty_or(&lookup, "JWT_AUDIENCE", DEFAULT_AUDIENCE)?,
            ttl: chrono::Duration::minutes(ttl_minutes),
        };

        // PORT wins over SERVER_PORT so hosted platforms can inject it
        let port = match lookup("PORT") {
            Some(_) => parse_or(&lookup, "PORT", 3000)?,
            None => parse_or(&lookup, "SERVER_PORT", 3000)?,
        };

        let allowed_origins: Vec<String> = lookup("CORS_ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_else(|| vec!["http://localhost:3001".to_string()]);
        // Credentialed CORS needs explicit origins
        if let Some(origin) = allowed_origins.iter().find(|origin| origin.contains('*')) {
            return Err(ConfigError::Invalid {
                key: "CORS_ALLOWED_ORIGINS",
                value: origin.clone(),
            });
        }

        let seed_account = match (lookup("SEED_ADMIN_EMAIL"), lookup("SEED_ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(SeedAccount { email, password }),
            _ => None,
        };

        let store_timeout_secs: u64 =
            parse_or(&lookup, "STORE_TIMEOUT_SECS", DEFAULT_STORE_TIMEOUT_SECS)?;
        if store_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "STORE_TIMEOUT_SECS",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            jwt,
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            database_max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 16)?,
            server: ServerConfig {
                host: lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port,
                allowed_origins,
            },
            store_timeout: Duration::from_secs(store_timeout_secs),
            seed_account,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

fn non_empty_or<F>(lookup: &F, key: &'static str, default: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if value.trim().is_empty() => Err(ConfigError::Empty(key)),
        Some(value) => Ok(value),
        None => Ok(default.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_missing_secret_is_fatal() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("JWT_SECRET"));
    }

    #[test]
    fn test_blank_secret_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("JWT_SECRET", "   ")])).unwrap_err();
        assert_eq!(err, ConfigError::Empty("JWT_SECRET"));
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[("JWT_SECRET", "s3cret")])).unwrap();
        assert_eq!(config.jwt.issuer, DEFAULT_ISSUER);
        assert_eq!(config.jwt.audience, DEFAULT_AUDIENCE);
        assert_eq!(config.jwt.ttl, chrono::Duration::minutes(30));
        assert_eq!(config.server.port, 3000);
        assert!(config.database_url.is_none());
        assert!(config.seed_account.is_none());
        assert_eq!(config.store_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_port_prefers_platform_variable() {
        let config = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", "s3cret"),
            ("SERVER_PORT", "8080"),
            ("PORT", "9090"),
        ]))
        .unwrap();
        assert_eq!(config.server.port, 9090);
    }

    #[test]
    fn test_invalid_ttl() {
        let err = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", "s3cret"),
            ("JWT_TTL_MINUTES", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "JWT_TTL_MINUTES", .. }));

        let err = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", "s3cret"),
            ("JWT_TTL_MINUTES", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "JWT_TTL_MINUTES", .. }));
    }

    #[test]
    fn test_wildcard_origin_is_rejected() {
        for raw in ["*", "https://a.example,*", "https://*.example"] {
            let err = Config::from_lookup(lookup_from(&[
                ("JWT_SECRET", "s3cret"),
                ("CORS_ALLOWED_ORIGINS", raw),
            ]))
            .unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { key: "CORS_ALLOWED_ORIGINS", .. }));
        }
    }

    #[test]
    fn test_origins_and_seed_account() {
        let config = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", "s3cret"),
            ("CORS_ALLOWED_ORIGINS", "https://a.example, https://b.example,"),
            ("SEED_ADMIN_EMAIL", "admin@example.com"),
            ("SEED_ADMIN_PASSWORD", "admin123"),
        ]))
        .unwrap();
        assert_eq!(
            config.server.allowed_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
        let seed = config.seed_account.unwrap();
        assert_eq!(seed.email, "admin@example.com");
    }
}
