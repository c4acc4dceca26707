//! Multi-order summary projection
//!
//! Keeps the list of a user's non-delivered orders current: status
//! events insert or update entries, `delivered` removes them, and the
//! poll fallback only runs while something is actually in flight.

use super::{NOTICE_CAPACITY, OrderApi};
use crate::events::EventSource;
use parking_lot::Mutex;
use serde_json::Value;
use shared::channels::{ORDER_STATUS_EVENT, order_status_channel};
use shared::models::{OrderDetails, OrderStatus, OrderSummaryEntry};
use shared::PortalResult;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Side effects emitted by the board
#[derive(Debug, Clone, PartialEq)]
pub enum BoardNotice {
    /// The active-order list changed; summary views should refresh
    Changed { active: usize },
}

#[derive(Default)]
struct BoardState {
    orders: Vec<OrderSummaryEntry>,
    cancel: Option<CancellationToken>,
}

/// Projection of all non-delivered orders for one user
#[derive(Clone)]
pub struct ActiveOrdersBoard {
    api: Arc<dyn OrderApi>,
    source: Arc<dyn EventSource>,
    user_id: i64,
    poll_interval: Duration,
    notices: mpsc::Sender<BoardNotice>,
    state: Arc<Mutex<BoardState>>,
}

impl ActiveOrdersBoard {
    pub fn new(
        api: Arc<dyn OrderApi>,
        source: Arc<dyn EventSource>,
        user_id: i64,
        poll_interval: Duration,
    ) -> (Self, mpsc::Receiver<BoardNotice>) {
        let (tx, rx) = mpsc::channel(NOTICE_CAPACITY);
        (
            Self {
                api,
                source,
                user_id,
                poll_interval,
                notices: tx,
                state: Arc::new(Mutex::new(BoardState::default())),
            },
            rx,
        )
    }

    /// Start maintaining the board
    ///
    /// Fetches the current summary, then keeps it fresh from the push
    /// channel with the poll as fallback. Repeated opens are no-ops.
    pub async fn open(&self) -> PortalResult<()> {
        if self.state.lock().cancel.as_ref().is_some_and(|c| !c.is_cancelled()) {
            tracing::debug!(user_id = self.user_id, "Board already open, ignoring");
            return Ok(());
        }

        match self.api.order_summary().await {
            Ok(entries) => self.replace_orders(entries),
            Err(err) if err.requires_login() => return Err(err),
            Err(err) => {
                tracing::warn!(user_id = self.user_id, %err, "Initial summary fetch failed")
            }
        }

        let cancel = CancellationToken::new();
        self.state.lock().cancel = Some(cancel.clone());

        let status_rx = self
            .source
            .subscribe(&order_status_channel(self.user_id), ORDER_STATUS_EVENT);

        let board = self.clone();
        tokio::spawn(async move {
            board.run(status_rx, cancel).await;
        });
        Ok(())
    }

    /// Stop maintaining the board and clear it
    pub fn close(&self) {
        let cancel = {
            let mut state = self.state.lock();
            state.orders.clear();
            state.cancel.take()
        };
        if let Some(cancel) = cancel {
            cancel.cancel();
        }
    }

    /// Current non-delivered orders
    pub fn active_orders(&self) -> Vec<OrderSummaryEntry> {
        self.state.lock().orders.clone()
    }

    async fn run(&self, mut status_rx: mpsc::Receiver<Value>, cancel: CancellationToken) {
        let mut poll = tokio::time::interval(self.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
        poll.tick().await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                Some(payload) = status_rx.recv() => self.on_status_payload(payload),
                // Backpressure: no polling while nothing is in flight
                _ = poll.tick(), if self.has_active() => self.poll_once().await,
            }
        }
        tracing::debug!(user_id = self.user_id, "Board loop stopped");
    }

    fn has_active(&self) -> bool {
        !self.state.lock().orders.is_empty()
    }

    async fn poll_once(&self) {
        match self.api.order_summary().await {
            Ok(entries) => self.replace_orders(entries),
            Err(err) => tracing::warn!(user_id = self.user_id, %err, "Summary poll failed"),
        }
    }

    fn on_status_payload(&self, payload: Value) {
        match serde_json::from_value::<OrderDetails>(payload) {
            Ok(details) => self.apply_event(&details),
            Err(err) => {
                tracing::warn!(user_id = self.user_id, %err, "Malformed status payload, ignoring")
            }
        }
    }

    /// Fold one order snapshot into the list
    ///
    /// Delivered orders leave the board; anything else is inserted or
    /// updated in place.
    fn apply_event(&self, details: &OrderDetails) {
        let changed;
        let active;
        {
            let mut state = self.state.lock();
            if details.status == OrderStatus::Delivered {
                let before = state.orders.len();
                state.orders.retain(|o| o.id != details.id);
                changed = state.orders.len() != before;
            } else {
                match state.orders.iter_mut().find(|o| o.id == details.id) {
                    Some(entry) => {
                        changed = entry.status != details.status;
                        entry.status = details.status;
                    }
                    None => {
                        state.orders.push(OrderSummaryEntry {
                            id: details.id,
                            status: details.status,
                            total_amount: details.total_amount,
                        });
                        changed = true;
                    }
                }
            }
            active = state.orders.len();
        }
        if changed {
            self.send_notice(BoardNotice::Changed { active });
        }
    }

    fn replace_orders(&self, entries: Vec<OrderSummaryEntry>) {
        let active = {
            let mut state = self.state.lock();
            state.orders = entries
                .into_iter()
                .filter(|o| o.status != OrderStatus::Delivered)
                .collect();
            state.orders.len()
        };
        self.send_notice(BoardNotice::Changed { active });
    }

    fn send_notice(&self, notice: BoardNotice) {
        // Board consumers may come and go; a missing or lagging one
        // is not an error
        let _ = self.notices.try_send(notice);
    }
}

impl std::fmt::Debug for ActiveOrdersBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveOrdersBoard")
            .field("user_id", &self.user_id)
            .field("active", &self.state.lock().orders.len())
            .finish()
    }
}
