//! Cart line and cart summary models

use crate::money::lenient_f64;
use serde::{Deserialize, Serialize};

/// What kind of entry a cart line is
///
/// Products carry a quantity; services are singleton lines that are
/// added once and only ever removed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    #[default]
    Product,
    Service,
}

/// One product or service entry in the cart
///
/// Invariant: a product line with quantity <= 0 is removed, never kept
/// at zero. Service lines always have quantity 1.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLine {
    pub id: i64,
    #[serde(default)]
    pub kind: LineKind,
    #[serde(default)]
    pub name: String,
    /// Unit price (lenient: backend may send a string)
    #[serde(deserialize_with = "lenient_f64", default)]
    pub price: f64,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

impl CartLine {
    /// Line total (price x quantity), for display aggregation
    pub fn line_total(&self) -> f64 {
        use crate::money::{to_decimal, to_f64};
        to_f64(to_decimal(self.price) * rust_decimal::Decimal::from(self.quantity.max(0)))
    }
}

/// Cart snapshot as returned by `GET /portal/cart`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CartSummary {
    #[serde(rename = "cartItems", default)]
    pub cart_items: Vec<CartLine>,
    #[serde(rename = "totalAmount", deserialize_with = "lenient_f64", default)]
    pub total_amount: f64,
    #[serde(rename = "deliveryCharge", deserialize_with = "lenient_f64", default)]
    pub delivery_charge: f64,
    #[serde(rename = "platformCharge", deserialize_with = "lenient_f64", default)]
    pub platform_charge: f64,
    #[serde(rename = "grandTotal", deserialize_with = "lenient_f64", default)]
    pub grand_total: f64,
}

/// Service reservation payload, JSON-encoded into the `service_data`
/// multipart field on add-to-cart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceData {
    pub service_id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(deserialize_with = "lenient_f64", default)]
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cart_summary_lenient_fields() {
        // Backend mixes strings and numbers in monetary fields
        let summary: CartSummary = serde_json::from_value(json!({
            "cartItems": [
                {"id": 1, "kind": "product", "name": "Milk", "price": "45.50", "quantity": 2},
                {"id": 9, "kind": "service", "name": "AC repair", "price": 499}
            ],
            "totalAmount": "590.00",
            "deliveryCharge": 20,
            "platformCharge": null,
            "grandTotal": "610.00"
        }))
        .unwrap();

        assert_eq!(summary.cart_items.len(), 2);
        assert_eq!(summary.cart_items[0].price, 45.5);
        assert_eq!(summary.cart_items[1].kind, LineKind::Service);
        assert_eq!(summary.cart_items[1].quantity, 1);
        assert_eq!(summary.total_amount, 590.0);
        assert_eq!(summary.platform_charge, 0.0);
    }

    #[test]
    fn test_line_total() {
        let line = CartLine {
            id: 1,
            kind: LineKind::Product,
            name: "Eggs".into(),
            price: 6.5,
            quantity: 12,
        };
        assert_eq!(line.line_total(), 78.0);
    }
}
