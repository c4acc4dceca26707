//! Client configuration
//!
//! The explicit session context for all portal calls. Token and user
//! id live here rather than in ambient browser storage; lifecycle is
//! tied to login/logout events by whoever owns the config.

use shared::{PortalError, PortalResult};

/// Configuration for connecting to the portal backend
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL (e.g., "https://api.amomarket.example")
    pub base_url: String,

    /// Bearer token; absent means signed out
    pub token: Option<String>,

    /// Signed-in user id, used for per-user push channel names
    pub user_id: Option<i64>,

    /// Request timeout in seconds
    pub timeout: u64,
}

impl ClientConfig {
    /// Create a new configuration for a signed-out session
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            user_id: None,
            timeout: 30,
        }
    }

    /// Set the bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the signed-in user id
    pub fn with_user_id(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Set the request timeout in seconds
    pub fn with_timeout(mut self, timeout: u64) -> Self {
        self.timeout = timeout;
        self
    }

    /// The signed-in session, or `Unauthorized`
    ///
    /// Every portal endpoint requires auth; callers check this before
    /// building a request so a signed-out session never reaches the
    /// network.
    pub fn session(&self) -> PortalResult<(&str, i64)> {
        match (self.token.as_deref(), self.user_id) {
            (Some(token), Some(user_id)) => Ok((token, user_id)),
            _ => Err(PortalError::Unauthorized),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = ClientConfig::new("https://api.example")
            .with_token("t0ken")
            .with_user_id(7)
            .with_timeout(10);
        assert_eq!(config.session().unwrap(), ("t0ken", 7));
        assert_eq!(config.timeout, 10);
    }

    #[test]
    fn test_signed_out_session_is_unauthorized() {
        let config = ClientConfig::new("https://api.example");
        assert!(config.session().unwrap_err().requires_login());

        // Token without a user id is still not a session
        let config = ClientConfig::new("https://api.example").with_token("t");
        assert!(config.session().is_err());
    }
}
