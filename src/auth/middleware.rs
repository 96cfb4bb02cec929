//! Authentication Middleware
//!
//! Axum middleware for bearer token validation.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::auth::{jwt::TokenIssuer, models::AuthUser};
use crate::routes::error::ApiError;

/// Cookie set on login and read back when no Authorization header is sent
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Pull a token from `Authorization: Bearer` or the access token cookie
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty());

    bearer.or_else(|| {
        headers
            .get(header::COOKIE)
            .and_then(|value| value.to_str().ok())
            .and_then(|cookies| {
                cookies.split(';').find_map(|cookie| {
                    cookie
                        .trim()
                        .strip_prefix(ACCESS_TOKEN_COOKIE)
                        .and_then(|rest| rest.strip_prefix('='))
                        .map(str::to_string)
                })
            })
            .filter(|token| !token.is_empty())
    })
}

/// Rejects the request with 401 unless it carries a valid token
pub async fn require_auth(
    State(issuer): State<Arc<TokenIssuer>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = extract_token(req.headers()) else {
        tracing::warn!("Missing bearer token on {} {}", req.method(), req.uri());
        return Err(ApiError::Unauthorized);
    };

    let claims = issuer.verify(&token).map_err(|e| {
        tracing::warn!("Token rejected on {} {}: {}", req.method(), req.uri(), e);
        ApiError::Unauthorized
    })?;

    tracing::debug!("Authenticated {}", claims.sub);
    req.extensions_mut().insert(AuthUser::from(claims));

    Ok(next.run(req).await)
}
