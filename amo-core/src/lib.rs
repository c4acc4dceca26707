//! Amo Market portal core
//!
//! The pricing and order-tracking core of the customer portal:
//!
//! - [`geo`] — great-circle distance between the shop and the
//!   delivery address
//! - [`pricing`] — delivery fee policy, tip presets, and the bill
//!   breakdown computation
//! - [`cart`] — cart line mutation with optimistic apply and
//!   per-line rollback
//! - [`tracking`] — live projection of in-flight order status from
//!   push events with a poll fallback
//! - [`events`] — the injected pub/sub capability the tracker
//!   subscribes through
//!
//! Everything here is UI-framework agnostic: side effects surface as
//! notices on channels, backend access goes through the `CartApi` and
//! `OrderApi` traits implemented by `amo-client`.

pub mod cart;
pub mod events;
pub mod geo;
pub mod pricing;
pub mod tracking;

pub use cart::{CartApi, CartSession, LineDeltaOutcome};
pub use events::{EventSource, MemoryEventSource};
pub use pricing::{DeliveryPolicy, DeliveryQuote, compute_bill, toggle_tip};
pub use tracking::{
    ActiveOrdersBoard, LiveOrder, OrderApi, OrderStatusTracker, TrackerConfig, TrackerNotice,
};
