//! Mapping from domain failures to HTTP responses.
//!
//! Only this module decides status codes. Internal failures are logged here
//! and answered with a generic message.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::auth::AuthError;
use crate::database::StoreError;
use crate::services::TaskError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unprocessable(String),

    #[error("Service temporarily unavailable")]
    Unavailable,

    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Timeout => Self::Unavailable,
            StoreError::Conflict(message) => Self::Conflict(message),
            StoreError::MissingReference(message) => Self::Unprocessable(message),
            other => {
                tracing::error!("Store failure: {}", other);
                Self::Internal
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::Unauthorized,
            AuthError::Validation(message) => Self::BadRequest(message.to_string()),
            AuthError::EmailTaken => Self::Conflict(err.to_string()),
            AuthError::TokenIssuance(e) => {
                tracing::error!("Token issuance failed: {}", e);
                Self::Unauthorized
            }
            AuthError::Hashing(e) => {
                tracing::error!("Password hashing failed: {}", e);
                Self::Internal
            }
            AuthError::Store(e) => e.into(),
        }
    }
}

impl From<TaskError> for ApiError {
    fn from(err: TaskError) -> Self {
        match err {
            TaskError::TaskNotFound(_) | TaskError::BoardNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            TaskError::UnknownBoard(_) => Self::Unprocessable(err.to_string()),
            TaskError::Validation(message) => Self::BadRequest(message),
            TaskError::Store(e) => e.into(),
        }
    }
}
