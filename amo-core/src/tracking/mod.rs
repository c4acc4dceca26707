//! Live order-status tracking
//!
//! The backend is authoritative; the tracker only projects the latest
//! known snapshot of one in-flight order and detects edges. Snapshots
//! arrive on the per-user push channel and from a fixed-interval poll
//! fallback; whichever lands last wins wholesale — no merging and no
//! sequence inference, since both paths read the same source of
//! truth. A stale push arriving after a fresher poll can briefly
//! regress the displayed status; that is an accepted limitation of
//! the unsequenced channel.
//!
//! Side effects surface as [`TrackerNotice`] values on a channel so
//! the UI layer stays external: a status edge, courier movement, the
//! exactly-once feedback trigger on delivery, and session close.

use crate::events::EventSource;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use shared::channels::{DELIVERY_LOCATION_EVENT, ORDER_STATUS_EVENT};
use shared::channels::{delivery_location_channel, order_status_channel};
use shared::models::{CourierLocation, OrderDetails, OrderStatus, OrderSummaryEntry};
use shared::PortalResult;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

mod summary;
pub use summary::{ActiveOrdersBoard, BoardNotice};

/// Capacity of the notice channel
const NOTICE_CAPACITY: usize = 64;

/// Backend reads the tracking layer depends on
#[async_trait]
pub trait OrderApi: Send + Sync {
    /// Full order with nested per-shop statuses
    async fn order_details(&self, order_id: i64) -> PortalResult<OrderDetails>;
    /// Active orders for the signed-in user
    async fn order_summary(&self) -> PortalResult<Vec<OrderSummaryEntry>>;
}

/// Tracker configuration
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// User whose status channel carries the push snapshots
    pub user_id: i64,
    /// Poll fallback interval while the order is non-terminal
    pub poll_interval: Duration,
}

impl TrackerConfig {
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            poll_interval: Duration::from_secs(60),
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

/// In-memory projection of one tracked order
#[derive(Debug, Clone, PartialEq)]
pub struct LiveOrder {
    pub order_id: i64,
    pub status: OrderStatus,
    /// Status before the latest snapshot, for edge-triggered effects
    pub previous_status: Option<OrderStatus>,
    /// Per-shop sub-status, independent of the overall status
    pub shop_statuses: HashMap<i64, OrderStatus>,
    /// Last known courier coordinates, if any were pushed
    pub courier_location: Option<CourierLocation>,
    pub updated_at_millis: i64,
}

/// Side effects emitted by the tracker
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerNotice {
    /// Projected status differs from the previously recorded one
    StatusChanged {
        order_id: i64,
        from: Option<OrderStatus>,
        to: OrderStatus,
    },
    /// Order reached `delivered`; open the feedback flow. Emitted at
    /// most once per tracking session.
    FeedbackDue { order_id: i64 },
    /// Courier coordinates moved
    CourierMoved {
        order_id: i64,
        location: CourierLocation,
    },
    /// Tracking session closed; summary views should refresh
    TrackingClosed { order_id: i64 },
}

#[derive(Default)]
struct TrackerState {
    /// Last-opened order id; guards against duplicate sessions
    open_order: Option<i64>,
    projection: Option<LiveOrder>,
    /// Exactly-once guard for the feedback flow, reset only on close
    feedback_sent: bool,
    cancel: Option<CancellationToken>,
}

/// Client-side projector of one order's live status
///
/// Cheap to clone; all clones share the same session state.
#[derive(Clone)]
pub struct OrderStatusTracker {
    api: Arc<dyn OrderApi>,
    source: Arc<dyn EventSource>,
    config: TrackerConfig,
    notices: mpsc::Sender<TrackerNotice>,
    state: Arc<Mutex<TrackerState>>,
}

impl OrderStatusTracker {
    /// Create a tracker and the notice stream its side effects arrive on
    pub fn new(
        api: Arc<dyn OrderApi>,
        source: Arc<dyn EventSource>,
        config: TrackerConfig,
    ) -> (Self, mpsc::Receiver<TrackerNotice>) {
        let (tx, rx) = mpsc::channel(NOTICE_CAPACITY);
        (
            Self {
                api,
                source,
                config,
                notices: tx,
                state: Arc::new(Mutex::new(TrackerState::default())),
            },
            rx,
        )
    }

    /// Open a tracking session for an order
    ///
    /// Opening the id that is already open is a no-op: one poll loop,
    /// one set of subscriptions. Opening a different id closes the
    /// previous session first. A missing token surfaces as
    /// `Unauthorized` without starting anything; any other fetch
    /// failure leaves the session running on the poll fallback.
    pub async fn open(&self, order_id: i64) -> PortalResult<()> {
        {
            let state = self.state.lock();
            if state.open_order == Some(order_id) {
                tracing::debug!(order_id, "Tracking already open, ignoring");
                return Ok(());
            }
        }
        if self.state.lock().open_order.is_some() {
            self.close();
        }

        let initial = match self.api.order_details(order_id).await {
            Ok(details) => Some(details),
            Err(err) if err.requires_login() => return Err(err),
            Err(err) => {
                tracing::warn!(order_id, %err, "Initial order fetch failed, relying on poll");
                None
            }
        };

        let cancel = CancellationToken::new();
        {
            let mut state = self.state.lock();
            state.open_order = Some(order_id);
            state.projection = None;
            state.feedback_sent = false;
            state.cancel = Some(cancel.clone());
        }

        let status_rx = self
            .source
            .subscribe(&order_status_channel(self.config.user_id), ORDER_STATUS_EVENT);
        let location_rx = self
            .source
            .subscribe(&delivery_location_channel(order_id), DELIVERY_LOCATION_EVENT);

        if let Some(details) = initial {
            self.apply_snapshot(details);
        }

        let tracker = self.clone();
        tokio::spawn(async move {
            tracker.run(order_id, status_rx, location_rx, cancel).await;
        });
        tracing::info!(order_id, "Tracking opened");
        Ok(())
    }

    /// Close the tracking session
    ///
    /// Cancels the poll loop (its subscriptions drop with it), clears
    /// the projection, resets the feedback guard, and notifies
    /// dependent views.
    pub fn close(&self) {
        let (order_id, cancel) = {
            let mut state = self.state.lock();
            let Some(order_id) = state.open_order.take() else {
                return;
            };
            state.projection = None;
            state.feedback_sent = false;
            (order_id, state.cancel.take())
        };
        if let Some(cancel) = cancel {
            cancel.cancel();
        }
        self.send_notice(TrackerNotice::TrackingClosed { order_id });
        tracing::info!(order_id, "Tracking closed");
    }

    /// Current projection, if a session is open and a snapshot landed
    pub fn current(&self) -> Option<LiveOrder> {
        self.state.lock().projection.clone()
    }

    /// Whether a session is open and still polling/subscribed
    pub fn is_active(&self) -> bool {
        let state = self.state.lock();
        state.open_order.is_some()
            && state.cancel.as_ref().is_some_and(|c| !c.is_cancelled())
    }

    // ========================================================================
    // Event loop
    // ========================================================================

    async fn run(
        &self,
        order_id: i64,
        mut status_rx: mpsc::Receiver<Value>,
        mut location_rx: mpsc::Receiver<Value>,
        cancel: CancellationToken,
    ) {
        let mut poll = tokio::time::interval(self.config.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately and the initial fetch
        // already happened in open()
        poll.tick().await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                Some(payload) = status_rx.recv() => self.on_status_payload(order_id, payload),
                Some(payload) = location_rx.recv() => self.on_location_payload(order_id, payload),
                _ = poll.tick() => self.poll_once(order_id).await,
            }
        }
        tracing::debug!(order_id, "Tracking loop stopped");
    }

    async fn poll_once(&self, order_id: i64) {
        match self.api.order_details(order_id).await {
            Ok(details) => self.apply_snapshot(details),
            // One failed poll does not tear the session down; the
            // next tick retries
            Err(err) => tracing::warn!(order_id, %err, "Status poll failed"),
        }
    }

    fn on_status_payload(&self, order_id: i64, payload: Value) {
        match serde_json::from_value::<OrderDetails>(payload) {
            Ok(details) => {
                // The status channel is per-user; drop snapshots for
                // other orders
                if details.id == order_id {
                    self.apply_snapshot(details);
                }
            }
            Err(err) => tracing::warn!(order_id, %err, "Malformed status payload, ignoring"),
        }
    }

    fn on_location_payload(&self, order_id: i64, payload: Value) {
        match serde_json::from_value::<CourierLocation>(payload) {
            Ok(location) => {
                {
                    let mut state = self.state.lock();
                    let Some(projection) = state.projection.as_mut() else {
                        return;
                    };
                    projection.courier_location = Some(location);
                    projection.updated_at_millis = shared::util::now_millis();
                }
                self.send_notice(TrackerNotice::CourierMoved { order_id, location });
            }
            Err(err) => tracing::warn!(order_id, %err, "Malformed location payload, ignoring"),
        }
    }

    /// Apply an authoritative snapshot to the projection
    ///
    /// Last write wins wholesale. Emits `StatusChanged` on an edge,
    /// and on `delivered` stops the loop and emits `FeedbackDue`
    /// exactly once; the guard survives until an explicit `close()`,
    /// so repeated delivered snapshots never reopen feedback.
    fn apply_snapshot(&self, details: OrderDetails) {
        let mut to_send = Vec::new();
        {
            let mut state = self.state.lock();
            if state.open_order != Some(details.id) {
                return;
            }

            let previous = state.projection.as_ref().map(|p| p.status);
            let courier_location = state.projection.as_ref().and_then(|p| p.courier_location);
            let status = details.status;

            if previous != Some(status) {
                to_send.push(TrackerNotice::StatusChanged {
                    order_id: details.id,
                    from: previous,
                    to: status,
                });
            }

            state.projection = Some(LiveOrder {
                order_id: details.id,
                status,
                previous_status: previous,
                shop_statuses: details
                    .shops
                    .iter()
                    .map(|s| (s.id, s.pivot.status))
                    .collect(),
                courier_location,
                updated_at_millis: shared::util::now_millis(),
            });

            if status.is_terminal() && !state.feedback_sent {
                state.feedback_sent = true;
                if let Some(cancel) = state.cancel.take() {
                    cancel.cancel();
                }
                to_send.push(TrackerNotice::FeedbackDue {
                    order_id: details.id,
                });
            }
        }
        for notice in to_send {
            self.send_notice(notice);
        }
    }

    fn send_notice(&self, notice: TrackerNotice) {
        if let Err(err) = self.notices.try_send(notice) {
            match err {
                mpsc::error::TrySendError::Full(n) => {
                    tracing::warn!(?n, "Notice channel full, dropping tracker notice")
                }
                // UI went away; nothing to notify
                mpsc::error::TrySendError::Closed(_) => {}
            }
        }
    }
}

impl std::fmt::Debug for OrderStatusTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("OrderStatusTracker")
            .field("open_order", &state.open_order)
            .field("status", &state.projection.as_ref().map(|p| p.status))
            .finish()
    }
}
