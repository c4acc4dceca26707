//! Push channel and event names for the portal
//!
//! The backend publishes order and cart updates on per-user and
//! per-order channels. Channel names are built here so every consumer
//! agrees on the exact strings.

/// Event fired on the per-user order status channel
pub const ORDER_STATUS_EVENT: &str = ".order.status.notification";

/// Event fired on the per-order delivery location channel
pub const DELIVERY_LOCATION_EVENT: &str = ".delivery.live.location";

/// Event fired on the per-user cart update channel
pub const CART_UPDATE_EVENT: &str = ".cart.update";

/// Channel carrying order status snapshots for one user
pub fn order_status_channel(user_id: i64) -> String {
    format!("notification_order_status_for_user.{}", user_id)
}

/// Channel carrying live courier coordinates for one order
pub fn delivery_location_channel(order_id: i64) -> String {
    format!("delivery.location.{}", order_id)
}

/// Channel carrying cart summary updates for one user
pub fn cart_update_channel(user_id: i64) -> String {
    format!("cart_update.{}", user_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_names() {
        assert_eq!(
            order_status_channel(7),
            "notification_order_status_for_user.7"
        );
        assert_eq!(delivery_location_channel(42), "delivery.location.42");
        assert_eq!(cart_update_channel(7), "cart_update.7");
    }
}
