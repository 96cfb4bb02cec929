// # Routes Module
//
// - HTTP route handlers, grouped by functionality into submodules.
// - Handlers translate requests into service calls and service errors into
//   responses through `error::ApiError`.

/// Health check endpoint
pub mod health;

/// Registration, login, logout and current user
pub mod auth;

/// Board creation and listing
pub mod boards;

/// Task creation, replacement and status moves
pub mod tasks;

/// Error to status code mapping
pub mod error;

/// Body, path and query extractors with JSON rejections
pub mod extract;
