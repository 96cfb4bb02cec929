//! # Authentication Module
//!
//! Token issuance and verification, password hashing, the registration and
//! login service, and the middleware guarding board and task endpoints.

pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod service;

pub use jwt::TokenIssuer;
pub use service::{AuthError, AuthService};
