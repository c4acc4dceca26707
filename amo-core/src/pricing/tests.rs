use super::*;
use shared::models::LineKind;

fn product(id: i64, price: f64, quantity: i32) -> CartLine {
    CartLine {
        id,
        kind: LineKind::Product,
        name: format!("p{}", id),
        price,
        quantity,
    }
}

// ============================================================================
// Delivery charge policy
// ============================================================================

#[test]
fn test_flat_zone_charges_minimum() {
    let policy = DeliveryPolicy::default();
    assert_eq!(policy.delivery_charge(0.0), 20.0);
    assert_eq!(policy.delivery_charge(0.5), 20.0);
    assert_eq!(policy.delivery_charge(1.0), 20.0);
}

#[test]
fn test_linear_zone_rounds_and_floors() {
    let policy = DeliveryPolicy::default();
    // 3 km x 10/km = 30, above the floor
    assert_eq!(policy.delivery_charge(3.0), 30.0);
    // 1.4 km x 10/km = 14, floored to the minimum
    assert_eq!(policy.delivery_charge(1.4), 20.0);
    // Rounds half away from zero: 2.45 km -> 24.5 -> 25
    assert_eq!(policy.delivery_charge(2.45), 25.0);
}

#[test]
fn test_charge_monotonic_beyond_flat_zone() {
    let policy = DeliveryPolicy::default();
    let mut prev = policy.delivery_charge(1.01);
    for step in 1..60 {
        let d = 1.01 + step as f64 * 0.25;
        let charge = policy.delivery_charge(d);
        assert!(charge >= prev, "charge regressed at {} km", d);
        prev = charge;
    }
}

#[test]
fn test_long_distance_flag() {
    let policy = DeliveryPolicy::default();
    assert!(!policy.is_long_distance(5.0));
    assert!(policy.is_long_distance(6.2));
}

#[test]
fn test_quote_requires_both_endpoints() {
    let policy = DeliveryPolicy::default();
    assert_eq!(policy.quote(None, Some((28.6, 77.2))), None);
    assert_eq!(policy.quote(Some((28.6, 77.2)), None), None);

    let quote = policy
        .quote(Some((28.6139, 77.209)), Some((28.6165, 77.2095)))
        .unwrap();
    assert!(quote.distance_km < 1.0);
    assert_eq!(quote.charge, 20.0);
    assert!(!quote.long_distance);
}

// ============================================================================
// Tip toggle
// ============================================================================

#[test]
fn test_tip_toggle_idempotent() {
    let tip = toggle_tip(0.0, 30.0);
    assert_eq!(tip, 30.0);
    // Same preset again clears it
    assert_eq!(toggle_tip(tip, 30.0), 0.0);
}

#[test]
fn test_tip_replaces_never_adds() {
    let tip = toggle_tip(20.0, 50.0);
    assert_eq!(tip, 50.0);
}

#[test]
fn test_tip_rejects_non_preset() {
    assert_eq!(toggle_tip(20.0, 37.0), 20.0);
}

// ============================================================================
// Bill computation
// ============================================================================

#[test]
fn test_bill_additivity() {
    let lines = vec![product(1, 45.5, 2), product(2, 6.5, 12)];
    let bill = compute_bill(&lines, 30.0, 5.0, true, true, 50.0);

    assert_eq!(bill.subtotal, 169.0);
    let sum = bill.subtotal
        + bill.delivery_charge
        + bill.platform_charge
        + bill.feeding_india_donation
        + bill.armed_forces_contribution
        + bill.tip_amount;
    assert_eq!(bill.grand_total, sum);
    assert_eq!(bill.grand_total, 256.0);
}

#[test]
fn test_bill_skips_non_positive_quantities() {
    // A zero-quantity line should already be gone, but the bill must
    // not count it either way
    let lines = vec![product(1, 100.0, 1), product(2, 50.0, 0)];
    let bill = compute_bill(&lines, 0.0, 0.0, false, false, 0.0);
    assert_eq!(bill.subtotal, 100.0);
    assert_eq!(bill.grand_total, 100.0);
}

#[test]
fn test_bill_decimal_rounding() {
    // 3 x 10.99 accumulates without float drift
    let lines = vec![product(1, 10.99, 3)];
    let bill = compute_bill(&lines, 0.0, 0.0, false, false, 0.0);
    assert_eq!(bill.subtotal, 32.97);
}

#[test]
fn test_scenario_flat_rate_zone() {
    // Subtotal 250, distance 0.5 km, platform 5, no extras
    let policy = DeliveryPolicy::default();
    let delivery = policy.delivery_charge(0.5);
    let lines = vec![product(1, 125.0, 2)];
    let bill = compute_bill(&lines, delivery, 5.0, false, false, 0.0);

    assert_eq!(delivery, 20.0);
    assert_eq!(bill.grand_total, 275.0);
}

#[test]
fn test_scenario_linear_zone() {
    let policy = DeliveryPolicy::default();
    assert_eq!(policy.delivery_charge(3.0), 30.0);
}

#[test]
fn test_empty_cart_bills_extras_only() {
    let bill = compute_bill(&[], 20.0, 5.0, true, false, 20.0);
    assert_eq!(bill.subtotal, 0.0);
    assert_eq!(bill.grand_total, 46.0);
}
