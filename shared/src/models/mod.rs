//! Wire data model for the portal backend
//!
//! Shapes mirror the portal REST endpoints and push payloads. All
//! monetary and coordinate fields are parsed leniently because the
//! backend transmits them inconsistently as strings or numbers.

mod address;
mod bill;
mod cart;
mod order;

pub use address::{DeliveryAddress, DeliveryPerson};
pub use bill::BillBreakdown;
pub use cart::{CartLine, CartSummary, LineKind, ServiceData};
pub use order::{CourierLocation, OrderDetails, OrderShop, OrderStatus, OrderSummaryEntry, ShopPivot};
