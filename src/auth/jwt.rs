//! JWT Token Service
//!
//! Handles JWT creation, validation, and claims management for user authentication.

use chrono::{DateTime, Duration, SubsecRound, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::JwtConfig;

/// JWT Claims structure containing user information and token metadata
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Email of the authenticated user
    pub sub: String,
    /// Token issuer
    pub iss: String,
    /// Intended audience
    pub aud: String,
    /// Token issued at timestamp
    pub iat: i64,
    /// Token expiration timestamp
    pub exp: i64,
    /// Unique token id
    pub jti: String,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token configuration error: {0}")]
    Configuration(&'static str),

    #[error("failed to encode token: {0}")]
    Encoding(#[source] jsonwebtoken::errors::Error),

    #[error("token has expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),
}

/// A freshly minted token and the instant it stops verifying
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// JWT Service for token operations
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl TokenIssuer {
    /// Build an issuer from validated signing settings
    pub fn new(config: &JwtConfig) -> Result<Self, TokenError> {
        if config.secret.is_empty() {
            return Err(TokenError::Configuration("signing key must not be empty"));
        }
        if config.issuer.is_empty() || config.audience.is_empty() {
            return Err(TokenError::Configuration("issuer and audience are required"));
        }
        if config.ttl <= Duration::zero() {
            return Err(TokenError::Configuration("token ttl must be positive"));
        }

        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        // Expiry is checked by hand in `verify_at` so the boundary is exact
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.validate_exp = false;
        validation.leeway = 0;

        Ok(Self {
            encoding_key,
            decoding_key,
            validation,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            ttl: config.ttl,
        })
    }

    /// Generate a token asserting `identity`
    pub fn issue(&self, identity: &str) -> Result<IssuedToken, TokenError> {
        self.issue_at(identity, Utc::now())
    }

    /// Issue as of `now`, truncated to whole seconds so `expires_at` matches the `exp` claim
    pub fn issue_at(&self, identity: &str, now: DateTime<Utc>) -> Result<IssuedToken, TokenError> {
        let now = now.trunc_subsecs(0);
        let expires_at = now + self.ttl;

        let claims = Claims {
            sub: identity.to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(TokenError::Encoding)?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Validate and decode a token
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Validate a token as of `now`; valid while `now < exp`
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(TokenError::Invalid)?;

        if now.timestamp() >= data.claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str) -> JwtConfig {
        JwtConfig {
            secret: secret.to_string(),
            issuer: "taskboard-server".to_string(),
            audience: "taskboard-clients".to_string(),
            ttl: Duration::minutes(30),
        }
    }

    #[test]
    fn test_jwt_roundtrip() {
        let issuer = TokenIssuer::new(&config("test_secret")).unwrap();

        let issued = issuer.issue("test@example.com").unwrap();
        let claims = issuer.verify(&issued.token).unwrap();

        assert_eq!(claims.sub, "test@example.com");
        assert_eq!(claims.iss, "taskboard-server");
        assert_eq!(claims.aud, "taskboard-clients");
        assert_eq!(claims.exp - claims.iat, 30 * 60);
        assert_eq!(claims.exp, issued.expires_at.timestamp());
    }

    #[test]
    fn test_empty_signing_key_is_configuration_error() {
        let result = TokenIssuer::new(&config(""));
        assert!(matches!(result, Err(TokenError::Configuration(_))));
    }

    #[test]
    fn test_non_positive_ttl_is_configuration_error() {
        let mut cfg = config("test_secret");
        cfg.ttl = Duration::zero();
        assert!(matches!(TokenIssuer::new(&cfg), Err(TokenError::Configuration(_))));
    }

    #[test]
    fn test_expiry_boundary() {
        let issuer = TokenIssuer::new(&config("test_secret")).unwrap();
        let issued_at = Utc::now();
        let issued = issuer.issue_at("a@example.com", issued_at).unwrap();

        let just_before = issued_at + Duration::minutes(30) - Duration::seconds(1);
        assert!(issuer.verify_at(&issued.token, just_before).is_ok());

        let at_expiry = issued_at + Duration::minutes(30);
        assert!(matches!(
            issuer.verify_at(&issued.token, at_expiry),
            Err(TokenError::Expired)
        ));
        assert!(matches!(
            issuer.verify_at(&issued.token, at_expiry + Duration::hours(1)),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn test_sub_second_issue_time_keeps_advertised_expiry() {
        let issuer = TokenIssuer::new(&config("test_secret")).unwrap();
        let issued_at = DateTime::<Utc>::from_timestamp_millis(1_000_000_700).unwrap();
        let issued = issuer.issue_at("a@example.com", issued_at).unwrap();

        let claims = issuer.verify_at(&issued.token, issued_at).unwrap();
        assert_eq!(claims.iat, 1_000_000);
        assert_eq!(claims.exp, issued.expires_at.timestamp());
        assert_eq!(issued.expires_at.timestamp_subsec_millis(), 0);

        let before_expiry = issued.expires_at - Duration::milliseconds(300);
        assert!(issuer.verify_at(&issued.token, before_expiry).is_ok());
        assert!(matches!(
            issuer.verify_at(&issued.token, issued.expires_at),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn test_wrong_key_is_rejected() {
        let issuer = TokenIssuer::new(&config("test_secret")).unwrap();
        let other = TokenIssuer::new(&config("another_secret")).unwrap();

        let issued = issuer.issue("a@example.com").unwrap();
        assert!(matches!(other.verify(&issued.token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_wrong_audience_and_issuer_are_rejected() {
        let issuer = TokenIssuer::new(&config("test_secret")).unwrap();
        let issued = issuer.issue("a@example.com").unwrap();

        let mut cfg = config("test_secret");
        cfg.audience = "someone-else".to_string();
        let other_audience = TokenIssuer::new(&cfg).unwrap();
        assert!(other_audience.verify(&issued.token).is_err());

        let mut cfg = config("test_secret");
        cfg.issuer = "impostor".to_string();
        let other_issuer = TokenIssuer::new(&cfg).unwrap();
        assert!(other_issuer.verify(&issued.token).is_err());
    }

    #[test]
    fn test_tokens_carry_distinct_ids() {
        let issuer = TokenIssuer::new(&config("test_secret")).unwrap();
        let now = Utc::now();
        let a = issuer.issue_at("a@example.com", now).unwrap();
        let b = issuer.issue_at("a@example.com", now).unwrap();
        assert_ne!(a.token, b.token);
    }

    #[test]
    fn test_garbage_is_rejected() {
        let issuer = TokenIssuer::new(&config("test_secret")).unwrap();
        assert!(matches!(issuer.verify("not.a.token"), Err(TokenError::Invalid(_))));
    }
}
