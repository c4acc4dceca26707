//! Shared types for the Amo Market portal core
//!
//! Common types used across the portal crates: the wire data model,
//! the error taxonomy, lenient money parsing, and push channel names.

pub mod channels;
pub mod error;
pub mod models;
pub mod money;
pub mod util;

// Re-exports
pub use error::{PortalError, PortalResult};
pub use serde::{Deserialize, Serialize};

// Model re-exports (for convenient access)
pub use models::{
    BillBreakdown, CartLine, CartSummary, CourierLocation, DeliveryAddress, DeliveryPerson,
    LineKind, OrderDetails, OrderShop, OrderStatus, OrderSummaryEntry, ShopPivot,
};
