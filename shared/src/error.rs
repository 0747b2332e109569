//! Error types for Waypoint API functions.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while serving an API request.
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// AWS SDK error
    #[error("AWS error: {0}")]
    Aws(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// No usable session on the request
    #[error("Authentication error: {0}")]
    Unauthenticated(String),

    /// Session is valid but the user lacks a permission
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Not found error
    #[error("Not found: {0}")]
    NotFound(String),

    /// Route exists but not for this method
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    /// An external service asked us to slow down
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// An external service failed
    #[error("Upstream error: {0}")]
    Upstream(String),
}

impl Error {
    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Validation(_) => 400,
            Error::Unauthenticated(_) => 401,
            Error::Forbidden(_) => 403,
            Error::NotFound(_) => 404,
            Error::MethodNotAllowed(_) => 405,
            Error::RateLimited(_) => 429,
            _ => 500,
        }
    }

    /// Message that is safe to return to the caller.
    ///
    /// Client-facing errors carry their own message. Server-side failures
    /// collapse to a generic message so internal detail stays in the logs.
    pub fn public_message(&self) -> String {
        match self {
            Error::Validation(msg)
            | Error::Unauthenticated(msg)
            | Error::Forbidden(msg)
            | Error::NotFound(msg)
            | Error::MethodNotAllowed(msg)
            | Error::RateLimited(msg)
            | Error::Upstream(msg) => msg.clone(),
            _ => "Internal server error".to_string(),
        }
    }
}
