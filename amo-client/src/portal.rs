//! Typed portal API client
//!
//! One method per portal endpoint the core consumes, plus the
//! `CartApi`/`OrderApi` implementations that plug this client into
//! `amo-core`'s cart session and order tracker.

use crate::http::HttpTransport;
use crate::ClientConfig;
use amo_core::cart::CartApi;
use amo_core::tracking::OrderApi;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use shared::models::{BillBreakdown, CartSummary, OrderDetails, OrderSummaryEntry, ServiceData};
use shared::{PortalError, PortalResult};

/// Feedback for one shop of a delivered order
#[derive(Debug, Clone, Serialize)]
pub struct ShopFeedback {
    pub order_id: i64,
    pub shop_id: i64,
    pub rating: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Serialize)]
struct StoreCartDetails<'a> {
    #[serde(flatten)]
    bill: &'a BillBreakdown,
    address_id: i64,
}

#[derive(Serialize)]
struct ProductRef {
    product_id: i64,
}

/// Client for the customer portal backend
#[derive(Debug, Clone)]
pub struct PortalClient {
    http: HttpTransport,
}

impl PortalClient {
    pub fn new(config: ClientConfig) -> PortalResult<Self> {
        Ok(Self {
            http: HttpTransport::new(config)?,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        self.http.config()
    }

    // ========================================================================
    // Cart
    // ========================================================================

    /// Current cart with backend-computed totals
    pub async fn fetch_cart(&self) -> PortalResult<CartSummary> {
        self.http.get("portal/cart").await
    }

    /// Add a product to the cart
    pub async fn add_product(&self, product_id: i64, quantity: i32) -> PortalResult<()> {
        #[derive(Serialize)]
        struct AddProduct {
            product_id: i64,
            quantity: i32,
        }
        self.http
            .post::<Value, _>(
                "portal/cart/add",
                &AddProduct {
                    product_id,
                    quantity,
                },
            )
            .await?;
        Ok(())
    }

    /// Reserve a service into the cart (`service_data` multipart field)
    pub async fn add_service(&self, service: &ServiceData) -> PortalResult<()> {
        let encoded = serde_json::to_string(service)
            .map_err(|e| PortalError::internal(e.to_string()))?;
        let form = reqwest::multipart::Form::new().text("service_data", encoded);
        self.http
            .post_multipart::<Value>("portal/cart/add", form)
            .await?;
        Ok(())
    }

    /// Bump a product line by one
    pub async fn increment_product(&self, product_id: i64) -> PortalResult<()> {
        self.http
            .post::<Value, _>("portal/cart/increment", &ProductRef { product_id })
            .await?;
        Ok(())
    }

    /// Drop a product line by one
    pub async fn decrement_product(&self, product_id: i64) -> PortalResult<()> {
        self.http
            .post::<Value, _>("portal/cart/decrement", &ProductRef { product_id })
            .await?;
        Ok(())
    }

    /// Release a service reservation
    pub async fn remove_service(&self, service_id: i64) -> PortalResult<()> {
        self.http
            .delete::<Value>(&format!("portal/cart/remove-service/{}", service_id))
            .await?;
        Ok(())
    }

    /// Persist the locally computed bill and selected address before
    /// handing off to payment
    pub async fn store_cart_details(
        &self,
        bill: &BillBreakdown,
        address_id: i64,
    ) -> PortalResult<()> {
        self.http
            .post::<Value, _>(
                "portal/user/cart/store_cart_details",
                &StoreCartDetails { bill, address_id },
            )
            .await?;
        Ok(())
    }

    // ========================================================================
    // Orders
    // ========================================================================

    /// Active orders for the signed-in user
    pub async fn fetch_order_summary(&self) -> PortalResult<Vec<OrderSummaryEntry>> {
        self.http.get("portal/order/summary").await
    }

    /// Full order with nested per-shop statuses
    pub async fn fetch_order_details(&self, order_id: i64) -> PortalResult<OrderDetails> {
        self.http
            .get(&format!("portal/user/get_order_details/{}", order_id))
            .await
    }

    /// Submit post-delivery feedback for every shop of an order
    ///
    /// Sub-calls run together and are evaluated independently; any
    /// failure fails the whole batch with the first failure's
    /// message, and nothing is assumed committed. Retry is
    /// whole-batch, never per shop.
    pub async fn submit_feedback(&self, entries: &[ShopFeedback]) -> PortalResult<()> {
        let calls = entries.iter().map(|entry| {
            self.http
                .post::<Value, _>("portal/user/submit_feedback", entry)
        });
        let results = futures::future::join_all(calls).await;
        if let Some(err) = results.into_iter().find_map(Result::err) {
            tracing::warn!(%err, shops = entries.len(), "Feedback batch failed");
            return Err(err);
        }
        Ok(())
    }
}

// ============================================================================
// Core trait wiring
// ============================================================================

#[async_trait]
impl CartApi for PortalClient {
    async fn change_quantity(&self, product_id: i64, delta: i32) -> PortalResult<()> {
        // The backend exposes unit-step endpoints; walk the delta. A
        // mid-walk failure leaves part of it committed, which the
        // caller resolves by refetching via `fetch_summary`.
        for _ in 0..delta.unsigned_abs() {
            if delta > 0 {
                self.increment_product(product_id).await?;
            } else {
                self.decrement_product(product_id).await?;
            }
        }
        Ok(())
    }

    async fn release_service(&self, service_id: i64) -> PortalResult<()> {
        self.remove_service(service_id).await
    }

    async fn fetch_summary(&self) -> PortalResult<CartSummary> {
        self.fetch_cart().await
    }
}

#[async_trait]
impl OrderApi for PortalClient {
    async fn order_details(&self, order_id: i64) -> PortalResult<OrderDetails> {
        self.fetch_order_details(order_id).await
    }

    async fn order_summary(&self) -> PortalResult<Vec<OrderSummaryEntry>> {
        self.fetch_order_summary().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_cart_details_payload_shape() {
        let bill = BillBreakdown {
            subtotal: 250.0,
            delivery_charge: 20.0,
            platform_charge: 5.0,
            feeding_india_donation: 0.0,
            armed_forces_contribution: 0.0,
            tip_amount: 0.0,
            grand_total: 275.0,
        };
        let payload = serde_json::to_value(StoreCartDetails {
            bill: &bill,
            address_id: 3,
        })
        .unwrap();

        // Bill fields are flattened next to the address selection
        assert_eq!(payload["grand_total"], 275.0);
        assert_eq!(payload["delivery_charge"], 20.0);
        assert_eq!(payload["address_id"], 3);
    }

    #[tokio::test]
    async fn test_signed_out_calls_short_circuit() {
        let client = PortalClient::new(ClientConfig::new("http://127.0.0.1:0")).unwrap();
        assert!(client.fetch_cart().await.unwrap_err().requires_login());
        assert!(
            client
                .fetch_order_details(1)
                .await
                .unwrap_err()
                .requires_login()
        );
        assert!(client.remove_service(9).await.unwrap_err().requires_login());
    }

    #[test]
    fn test_feedback_serializes_without_empty_comment() {
        let fb = ShopFeedback {
            order_id: 1,
            shop_id: 10,
            rating: 5,
            comment: None,
        };
        let v = serde_json::to_value(&fb).unwrap();
        assert!(v.get("comment").is_none());
        assert_eq!(v["rating"], 5);
    }
}
