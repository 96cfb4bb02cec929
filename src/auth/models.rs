//! Authentication Models
//!
//! Data structures for authentication requests, responses, and user information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::jwt::{Claims, IssuedToken};

/// Authenticated user information extracted from a verified token
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub email: String,
    pub expires_at: i64,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            email: claims.sub,
            expires_at: claims.exp,
        }
    }
}

/// Login and registration payload
///
/// `passwordHash` is accepted as an alias for older clients.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    #[serde(alias = "passwordHash")]
    pub password: String,
}

/// Token response after successful authentication
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
}

impl From<IssuedToken> for TokenResponse {
    fn from(issued: IssuedToken) -> Self {
        Self {
            token: issued.token,
            token_type: "Bearer".to_string(),
            expires_at: issued.expires_at,
        }
    }
}
