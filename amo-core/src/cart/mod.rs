//! Cart line mutation with optimistic apply and per-line rollback
//!
//! Quantity changes apply locally first so the UI stays responsive,
//! then reconcile with the backend. On failure the backend cart is
//! refetched as the authoritative state; if even the refetch fails,
//! only the mutated line is restored from its own snapshot, so
//! concurrent-in-flight changes to other lines keep their state. A
//! single shared "previous cart" snapshot would lose updates when two
//! changes land close together.

use async_trait::async_trait;
use shared::models::{CartLine, CartSummary, LineKind};
use shared::{PortalError, PortalResult};

/// Backend calls the cart session reconciles against
#[async_trait]
pub trait CartApi: Send + Sync {
    /// Adjust a product line's quantity by a signed delta
    async fn change_quantity(&self, product_id: i64, delta: i32) -> PortalResult<()>;
    /// Release a service reservation (service lines are remove-only)
    async fn release_service(&self, service_id: i64) -> PortalResult<()>;
    /// Authoritative cart state, for resynchronizing after a failed
    /// mutation that may have partially committed
    async fn fetch_summary(&self) -> PortalResult<CartSummary>;
}

/// What a local delta did to the line set
#[derive(Debug, Clone, PartialEq)]
pub enum LineDeltaOutcome {
    /// Product quantity changed, line retained
    Adjusted { line_id: i64, quantity: i32 },
    /// Line dropped (product fell to zero, or any service decrement)
    Removed { line_id: i64 },
    /// No such line, or a no-op (positive delta on an existing service)
    Unchanged,
}

/// Apply a quantity delta to a line set, pure part
///
/// Product lines: quantity += delta, removed entirely when the result
/// is <= 0, never kept at zero. Service lines: singleton and
/// remove-only, so any decrement removes the line and a positive
/// delta on an existing line is a no-op.
pub fn apply_line_delta(lines: &mut Vec<CartLine>, line_id: i64, delta: i32) -> LineDeltaOutcome {
    let Some(idx) = lines.iter().position(|l| l.id == line_id) else {
        return LineDeltaOutcome::Unchanged;
    };

    match lines[idx].kind {
        LineKind::Product => {
            let quantity = lines[idx].quantity + delta;
            if quantity <= 0 {
                lines.remove(idx);
                LineDeltaOutcome::Removed { line_id }
            } else {
                lines[idx].quantity = quantity;
                LineDeltaOutcome::Adjusted { line_id, quantity }
            }
        }
        LineKind::Service => {
            if delta >= 0 {
                return LineDeltaOutcome::Unchanged;
            }
            lines.remove(idx);
            LineDeltaOutcome::Removed { line_id }
        }
    }
}

/// The cart's local line list
///
/// Owns the projection of the backend cart and performs optimistic
/// mutations against it.
#[derive(Debug, Default, Clone)]
pub struct CartSession {
    lines: Vec<CartLine>,
}

impl CartSession {
    pub fn new(lines: Vec<CartLine>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Apply a delta locally, reconcile with the backend, resync on
    /// failure
    ///
    /// A failed reconciliation may still have partially committed
    /// (multi-unit deltas walk unit-step endpoints), so the backend
    /// cart is refetched and taken wholesale. Only when that refetch
    /// also fails does the per-line snapshot restore the mutated line
    /// (value and position), leaving every other line untouched.
    pub async fn apply_delta(
        &mut self,
        line_id: i64,
        delta: i32,
        api: &dyn CartApi,
    ) -> PortalResult<LineDeltaOutcome> {
        let Some(idx) = self.lines.iter().position(|l| l.id == line_id) else {
            return Err(PortalError::not_found(format!("cart line {}", line_id)));
        };
        let snapshot = self.lines[idx].clone();

        let outcome = apply_line_delta(&mut self.lines, line_id, delta);
        if outcome == LineDeltaOutcome::Unchanged {
            return Ok(outcome);
        }

        let result = match snapshot.kind {
            LineKind::Product => api.change_quantity(line_id, delta).await,
            LineKind::Service => api.release_service(line_id).await,
        };

        if let Err(err) = result {
            tracing::warn!(line_id, %err, "Cart reconciliation failed, resynchronizing");
            match api.fetch_summary().await {
                Ok(summary) => self.apply_remote_summary(summary),
                Err(fetch_err) => {
                    tracing::warn!(%fetch_err, "Cart refetch failed, restoring line");
                    self.restore_line(idx, snapshot);
                }
            }
            return Err(err);
        }
        Ok(outcome)
    }

    /// Replace the projection with a pushed cart summary
    ///
    /// Last write wins, no merge: push and fetch both read from the
    /// same authoritative backend cart.
    pub fn apply_remote_summary(&mut self, summary: CartSummary) {
        self.lines = summary.cart_items;
    }

    fn restore_line(&mut self, idx: usize, snapshot: CartLine) {
        match self.lines.iter_mut().find(|l| l.id == snapshot.id) {
            Some(line) => *line = snapshot,
            None => self.lines.insert(idx.min(self.lines.len()), snapshot),
        }
    }
}

#[cfg(test)]
mod tests;
