//! Amo Client - HTTP client for the Amo Market portal backend
//!
//! Typed reqwest-based calls to the portal REST API. Carries the
//! session context (bearer token + user id) explicitly; calls
//! short-circuit with `Unauthorized` when no token is present instead
//! of issuing unauthenticated requests.

pub mod config;
pub mod http;
pub mod portal;

pub use config::ClientConfig;
pub use portal::{PortalClient, ShopFeedback};

// Re-export shared types for convenience
pub use shared::{PortalError, PortalResult};
