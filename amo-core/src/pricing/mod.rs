//! Cart pricing: delivery fee policy, tips, and the bill breakdown
//!
//! All arithmetic runs in `Decimal` and is converted back to `f64`
//! only on the finished breakdown. The bill is a pure function of its
//! inputs and is recomputed from scratch on every change; nothing here
//! caches or accumulates, so the displayed total can never drift from
//! the submitted one.

use crate::geo;
use rust_decimal::Decimal;
use rust_decimal::prelude::RoundingStrategy;
use shared::models::{BillBreakdown, CartLine};
use shared::money::{to_decimal, to_f64};

/// Tip presets offered at checkout
pub const TIP_PRESETS: [f64; 4] = [20.0, 30.0, 50.0, 100.0];

/// Fixed unit amount of the feeding-India donation
pub const FEEDING_INDIA_UNIT: f64 = 1.0;

/// Fixed unit amount of the armed-forces contribution
pub const ARMED_FORCES_UNIT: f64 = 1.0;

/// Distance-based delivery fee policy
///
/// The rate and floor are deliberately configuration, not constants:
/// the production values have shifted between a per-km rate and a
/// flat base fee, so callers own the numbers.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryPolicy {
    /// Linear rate applied beyond the flat zone, currency units per km
    pub base_rate_per_km: f64,
    /// Fee floor; also the flat-zone fee
    pub minimum_charge: f64,
    /// Distances up to this many km pay the flat minimum
    pub flat_distance_km: f64,
    /// Beyond this, checkout requires an explicit user confirmation
    pub long_distance_km: f64,
}

impl Default for DeliveryPolicy {
    fn default() -> Self {
        Self {
            base_rate_per_km: 10.0,
            minimum_charge: 20.0,
            flat_distance_km: 1.0,
            long_distance_km: 5.0,
        }
    }
}

/// Delivery fee computed for a concrete distance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeliveryQuote {
    pub distance_km: f64,
    pub charge: f64,
    /// UI gate: checkout must ask for confirmation before payment
    pub long_distance: bool,
}

impl DeliveryPolicy {
    /// Fee for a given distance
    ///
    /// Flat `minimum_charge` inside the flat zone, otherwise the
    /// linear rate rounded to whole currency units but never below
    /// the floor.
    pub fn delivery_charge(&self, distance_km: f64) -> f64 {
        if distance_km <= self.flat_distance_km {
            return self.minimum_charge;
        }
        let linear = (to_decimal(self.base_rate_per_km) * to_decimal(distance_km))
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        to_f64(linear.max(to_decimal(self.minimum_charge)))
    }

    /// Whether a distance is beyond the confirmation threshold
    pub fn is_long_distance(&self, distance_km: f64) -> bool {
        distance_km > self.long_distance_km
    }

    /// Quote the delivery leg between a shop and a delivery address
    ///
    /// `None` when either endpoint has no coordinates: no address
    /// selected means no fee computation, not a zero fee.
    pub fn quote(
        &self,
        origin: Option<(f64, f64)>,
        dest: Option<(f64, f64)>,
    ) -> Option<DeliveryQuote> {
        let (olat, olng) = origin?;
        let (dlat, dlng) = dest?;
        let distance_km = geo::distance_km(olat, olng, dlat, dlng);
        Some(DeliveryQuote {
            distance_km,
            charge: self.delivery_charge(distance_km),
            long_distance: self.is_long_distance(distance_km),
        })
    }
}

/// Toggle a tip preset
///
/// Selecting the already-selected preset clears the tip; selecting a
/// different preset replaces it (never adds). Values outside the
/// preset list leave the selection unchanged.
pub fn toggle_tip(current: f64, preset: f64) -> f64 {
    if !TIP_PRESETS.contains(&preset) {
        tracing::warn!(preset, "Ignoring non-preset tip amount");
        return current;
    }
    if shared::money::money_eq(current, preset) {
        0.0
    } else {
        preset
    }
}

/// Compute the displayable bill from the current cart state
///
/// subtotal = sum of price x quantity over lines with quantity > 0;
/// grand total = subtotal + delivery + platform + donations + tip,
/// rounded to 2 decimals. Malformed numeric inputs were already zeroed
/// at parse time, so nothing here can fail.
pub fn compute_bill(
    lines: &[CartLine],
    delivery_charge: f64,
    platform_charge: f64,
    feeding_india: bool,
    armed_forces: bool,
    tip_amount: f64,
) -> BillBreakdown {
    let subtotal: Decimal = lines
        .iter()
        .filter(|l| l.quantity > 0)
        .map(|l| to_decimal(l.price) * Decimal::from(l.quantity))
        .sum();

    let delivery = to_decimal(delivery_charge);
    let platform = to_decimal(platform_charge);
    let feeding = if feeding_india {
        to_decimal(FEEDING_INDIA_UNIT)
    } else {
        Decimal::ZERO
    };
    let armed = if armed_forces {
        to_decimal(ARMED_FORCES_UNIT)
    } else {
        Decimal::ZERO
    };
    let tip = to_decimal(tip_amount);

    let grand_total = subtotal + delivery + platform + feeding + armed + tip;

    BillBreakdown {
        subtotal: to_f64(subtotal),
        delivery_charge: to_f64(delivery),
        platform_charge: to_f64(platform),
        feeding_india_donation: to_f64(feeding),
        armed_forces_contribution: to_f64(armed),
        tip_amount: to_f64(tip),
        grand_total: to_f64(grand_total),
    }
}

#[cfg(test)]
mod tests;
