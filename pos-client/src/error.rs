//! Client error types

use shared::ErrorCode;
use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed (connection refused, reset, timeout...)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Authentication required
    #[error("Authentication required")]
    Unauthorized,

    /// Permission denied
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Endpoint not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Server answered with a JSON-RPC error object
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Whether the server answered with data we could not interpret
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            ClientError::InvalidResponse(_) | ClientError::Serialization(_)
        )
    }

    /// Unified error code for this failure
    pub fn code(&self) -> ErrorCode {
        match self {
            ClientError::Http(e) if e.is_timeout() => ErrorCode::TimeoutError,
            ClientError::Http(_) => ErrorCode::NetworkError,
            ClientError::InvalidResponse(_) | ClientError::Serialization(_) => {
                ErrorCode::InvalidResponse
            }
            ClientError::Config(_) => ErrorCode::ConfigError,
            ClientError::Unauthorized
            | ClientError::Forbidden(_)
            | ClientError::NotFound(_)
            | ClientError::Rpc { .. }
            | ClientError::Internal(_) => ErrorCode::InternalError,
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
