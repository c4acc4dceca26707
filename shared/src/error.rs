//! Portal error taxonomy
//!
//! One error type for the whole workspace. The variants follow the
//! failure classes the portal actually sees: transport failures fall
//! back to last-known local state, validation failures surface inline,
//! missing auth short-circuits before any request is issued.

use thiserror::Error;

/// Portal error type
#[derive(Debug, Clone, Error)]
pub enum PortalError {
    /// Network or backend unreachable
    #[error("Transport error: {0}")]
    Transport(String),

    /// Authentication required (missing or expired token)
    #[error("Authentication required")]
    Unauthorized,

    /// Backend rejected a field
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Structured backend error response
    #[error("API error {code}: {message}")]
    Api { code: i32, message: String },

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PortalError {
    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound(resource.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether the caller must re-authenticate instead of retrying
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

/// Result type for portal operations
pub type PortalResult<T> = Result<T, PortalError>;
