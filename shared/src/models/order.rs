//! Order status, order details, and delivery tracking models

use super::{DeliveryAddress, DeliveryPerson};
use crate::money::lenient_f64;
use serde::{Deserialize, Serialize};

/// Order lifecycle status
///
/// Linear progression `pending -> accepted -> preparing -> on_the_way
/// -> reached -> delivered`, with `declined` as an out-of-band
/// terminal used per shop. The backend is authoritative; this enum
/// only projects what it reports.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Accepted,
    Preparing,
    /// Some backend paths report this as "shipped"
    #[serde(alias = "shipped")]
    OnTheWay,
    Reached,
    Delivered,
    Declined,
}

impl OrderStatus {
    /// Position in the linear progression; `Declined` is out-of-band
    pub fn sequence(&self) -> Option<u8> {
        match self {
            Self::Pending => Some(0),
            Self::Accepted => Some(1),
            Self::Preparing => Some(2),
            Self::OnTheWay => Some(3),
            Self::Reached => Some(4),
            Self::Delivered => Some(5),
            Self::Declined => None,
        }
    }

    /// Terminal for the overall order: tracking stops here
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

/// Per-shop status carried on the order-shop relation
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ShopPivot {
    #[serde(default)]
    pub status: OrderStatus,
}

/// A shop participating in an order, with its own sub-status
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderShop {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub pivot: ShopPivot,
}

/// Full order as returned by `GET /portal/user/get_order_details/{id}`
/// and carried on the order status push channel
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderDetails {
    pub id: i64,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub shops: Vec<OrderShop>,
    #[serde(default)]
    pub address: Option<DeliveryAddress>,
    #[serde(default)]
    pub delivery_person: Option<DeliveryPerson>,
    #[serde(deserialize_with = "lenient_f64", default)]
    pub total_amount: f64,
}

/// One row of `GET /portal/order/summary`
///
/// Summary rows carry the status under `order_status` and, on some
/// backend paths, a second `status` key in the same row. Both are
/// accepted; `order_status` wins when they disagree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(from = "RawSummaryRow")]
pub struct OrderSummaryEntry {
    pub id: i64,
    pub status: OrderStatus,
    pub total_amount: f64,
}

#[derive(Deserialize)]
struct RawSummaryRow {
    id: i64,
    #[serde(default)]
    order_status: Option<OrderStatus>,
    #[serde(default)]
    status: Option<OrderStatus>,
    #[serde(deserialize_with = "lenient_f64", default)]
    total_amount: f64,
}

impl From<RawSummaryRow> for OrderSummaryEntry {
    fn from(raw: RawSummaryRow) -> Self {
        Self {
            id: raw.id,
            status: raw.order_status.or(raw.status).unwrap_or_default(),
            total_amount: raw.total_amount,
        }
    }
}

/// Live courier coordinates from the delivery location channel
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CourierLocation {
    #[serde(deserialize_with = "lenient_f64", default)]
    pub latitude: f64,
    #[serde(deserialize_with = "lenient_f64", default)]
    pub longitude: f64,
}
