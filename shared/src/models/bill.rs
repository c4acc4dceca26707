//! Bill breakdown model

use serde::{Deserialize, Serialize};

/// Displayable bill for the current cart
///
/// Always re-derived from its inputs, never persisted locally. The
/// same struct is submitted via `store_cart_details` before payment so
/// the displayed total and the submitted total cannot drift.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct BillBreakdown {
    /// Sum of line price x quantity over all lines
    pub subtotal: f64,
    /// Distance-based delivery fee
    pub delivery_charge: f64,
    /// Fixed or backend-supplied platform fee
    pub platform_charge: f64,
    /// Feeding-India donation (0 or the fixed unit amount)
    pub feeding_india_donation: f64,
    /// Armed-forces contribution (0 or the fixed unit amount)
    pub armed_forces_contribution: f64,
    /// Selected tip preset, or 0
    pub tip_amount: f64,
    /// Sum of all components, rounded to 2 decimals
    pub grand_total: f64,
}
