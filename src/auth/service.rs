//! Registration and login.
//!
//! Both flows are a single check-then-issue step: credentials are checked
//! against the [`CredentialStore`] and a token is minted by the
//! [`TokenIssuer`]. Passwords are only ever stored as Argon2 hashes.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::auth::jwt::{IssuedToken, TokenError, TokenIssuer};
use crate::auth::password;
use crate::database::models::NewUser;
use crate::database::{CredentialStore, StoreError, with_timeout};

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong password; deliberately does not say which
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    Validation(&'static str),

    #[error("email is already registered")]
    EmailTaken,

    #[error("token issuance failed: {0}")]
    TokenIssuance(#[from] TokenError),

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(_) => Self::EmailTaken,
            other => Self::Store(other),
        }
    }
}

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    issuer: Arc<TokenIssuer>,
    store_timeout: Duration,
}

/// Trimmed, lowercased form used as the account key
///
/// Emails are matched case-insensitively: `Admin@Example.com` and
/// `admin@example.com` name the same account. Passwords are compared exactly.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate(email: &str, password: &str) -> Result<(), AuthError> {
    if email.is_empty() {
        return Err(AuthError::Validation("email is required"));
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
        _ => return Err(AuthError::Validation("email is malformed")),
    }
    if password.is_empty() {
        return Err(AuthError::Validation("password is required"));
    }
    Ok(())
}

impl AuthService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        issuer: Arc<TokenIssuer>,
        store_timeout: Duration,
    ) -> Self {
        Self {
            store,
            issuer,
            store_timeout,
        }
    }

    #[cfg(test)]
    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    /// Create an account and return a token for it
    pub async fn register(&self, email: &str, password: &str) -> Result<IssuedToken, AuthError> {
        let email = normalize_email(email);
        validate(&email, password)?;

        // Mint the token first so a failed issuance leaves no account behind
        let issued = self.issuer.issue(&email)?;
        let password_hash = hash_blocking(password.to_string()).await?;
        let user = with_timeout(
            self.store_timeout,
            self.store.insert(NewUser {
                email: email.clone(),
                password_hash,
            }),
        )
        .await?;

        tracing::info!("Registered user id={} email={}", user.id, user.email);
        Ok(issued)
    }

    /// Check credentials and return a token bound to the email
    pub async fn login(&self, email: &str, password: &str) -> Result<IssuedToken, AuthError> {
        let email = normalize_email(email);
        let found = with_timeout(self.store_timeout, self.store.lookup(&email)).await?;

        let Some(user) = found else {
            let attempt = password.to_string();
            let _ = tokio::task::spawn_blocking(move || password::verify_against_dummy(&attempt))
                .await;
            tracing::warn!("Login rejected for {}", email);
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_blocking(password.to_string(), user.password_hash).await? {
            tracing::warn!("Login rejected for {}", email);
            return Err(AuthError::InvalidCredentials);
        }

        tracing::info!("Login succeeded for {}", email);
        Ok(self.issuer.issue(&user.email)?)
    }

    /// Create the bootstrap account unless it already exists
    ///
    /// Returns whether an account was created.
    pub async fn seed_account(&self, email: &str, password: &str) -> Result<bool, AuthError> {
        let normalized = normalize_email(email);
        if with_timeout(self.store_timeout, self.store.lookup(&normalized))
            .await?
            .is_some()
        {
            tracing::info!("Seed account {} already present", normalized);
            return Ok(false);
        }

        match self.register(&normalized, password).await {
            Ok(_) => Ok(true),
            // Lost a race with another instance seeding the same account
            Err(AuthError::EmailTaken) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

async fn hash_blocking(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || password::hash_password(&password))
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))?
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

async fn verify_blocking(password: String, hash: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || password::verify_password(&password, &hash))
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))
}
