//! Authlink error types.
//!
//! These never reach callers of the [`AuthManager`](crate::AuthManager)
//! operations directly: each operation folds its error into a failure
//! [`AuthResponse`](crate::AuthResponse). Only construction returns them.

use thiserror::Error;

/// Errors raised inside a single request/response round trip.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Configuration is missing or still holds a placeholder value.
    #[error("{0}")]
    ConfigError(String),

    /// A session-bound call was made before `setup()` obtained a token.
    #[error("Session not initialized. Call setup() first.")]
    SessionNotInitialized,

    /// No license key provided.
    #[error("License key cannot be empty")]
    MissingLicense,

    /// HTTP transport error communicating with the licensing API.
    #[error("Network error: {0}")]
    Transport(String),

    /// Response body was not the JSON we expected.
    #[error("Failed to parse server response: {0}")]
    MalformedResponse(String),

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}
