use super::*;
use parking_lot::Mutex;
use shared::models::LineKind;

fn product(id: i64, quantity: i32) -> CartLine {
    CartLine {
        id,
        kind: LineKind::Product,
        name: format!("p{}", id),
        price: 10.0,
        quantity,
    }
}

fn service(id: i64) -> CartLine {
    CartLine {
        id,
        kind: LineKind::Service,
        name: format!("s{}", id),
        price: 499.0,
        quantity: 1,
    }
}

/// Scripted backend: records calls, fails when told to
///
/// `summary` is what a resync refetch returns; `None` makes the
/// refetch fail too.
#[derive(Default)]
struct ScriptedApi {
    fail: bool,
    summary: Option<CartSummary>,
    calls: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl CartApi for ScriptedApi {
    async fn change_quantity(&self, product_id: i64, delta: i32) -> shared::PortalResult<()> {
        self.calls
            .lock()
            .push(format!("qty {} {}", product_id, delta));
        if self.fail {
            Err(shared::PortalError::transport("backend unreachable"))
        } else {
            Ok(())
        }
    }

    async fn release_service(&self, service_id: i64) -> shared::PortalResult<()> {
        self.calls.lock().push(format!("release {}", service_id));
        if self.fail {
            Err(shared::PortalError::transport("backend unreachable"))
        } else {
            Ok(())
        }
    }

    async fn fetch_summary(&self) -> shared::PortalResult<CartSummary> {
        self.calls.lock().push("fetch".into());
        self.summary
            .clone()
            .ok_or_else(|| shared::PortalError::transport("backend unreachable"))
    }
}

// ============================================================================
// Pure transform
// ============================================================================

#[test]
fn test_product_delta_never_keeps_zero_quantity() {
    let mut lines = vec![product(1, 2)];
    assert_eq!(
        apply_line_delta(&mut lines, 1, -1),
        LineDeltaOutcome::Adjusted {
            line_id: 1,
            quantity: 1
        }
    );
    assert_eq!(
        apply_line_delta(&mut lines, 1, -1),
        LineDeltaOutcome::Removed { line_id: 1 }
    );
    assert!(lines.is_empty());

    // Over-decrement removes too, no negative quantities
    let mut lines = vec![product(2, 1)];
    apply_line_delta(&mut lines, 2, -5);
    assert!(lines.is_empty());
}

#[test]
fn test_service_decrement_always_removes() {
    let mut lines = vec![service(9)];
    assert_eq!(
        apply_line_delta(&mut lines, 9, -1),
        LineDeltaOutcome::Removed { line_id: 9 }
    );
    assert!(lines.is_empty());
}

#[test]
fn test_service_increment_is_noop() {
    let mut lines = vec![service(9)];
    assert_eq!(
        apply_line_delta(&mut lines, 9, 1),
        LineDeltaOutcome::Unchanged
    );
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, 1);
}

#[test]
fn test_unknown_line_is_unchanged() {
    let mut lines = vec![product(1, 2)];
    assert_eq!(
        apply_line_delta(&mut lines, 99, 1),
        LineDeltaOutcome::Unchanged
    );
}

// ============================================================================
// Optimistic session
// ============================================================================

#[tokio::test]
async fn test_successful_reconciliation_keeps_local_state() {
    let api = ScriptedApi::default();
    let mut session = CartSession::new(vec![product(1, 1)]);

    session.apply_delta(1, 2, &api).await.unwrap();
    assert_eq!(session.lines()[0].quantity, 3);
    assert_eq!(api.calls.lock().as_slice(), ["qty 1 2"]);
}

#[tokio::test]
async fn test_failed_reconciliation_restores_only_that_line() {
    let api = ScriptedApi {
        fail: true,
        ..Default::default()
    };
    let mut session = CartSession::new(vec![product(1, 2), product(2, 5)]);

    let err = session.apply_delta(1, -2, &api).await.unwrap_err();
    assert!(matches!(err, shared::PortalError::Transport(_)));

    // Refetch failed too, so the snapshot fallback applies: the
    // removed line is back in place, the other untouched
    assert_eq!(session.lines().len(), 2);
    assert_eq!(session.lines()[0].id, 1);
    assert_eq!(session.lines()[0].quantity, 2);
    assert_eq!(session.lines()[1].quantity, 5);
}

#[tokio::test]
async fn test_failed_mutation_resyncs_from_backend() {
    // A multi-unit delta can partially commit before failing; the
    // refetched backend cart wins over the local snapshot
    let api = ScriptedApi {
        fail: true,
        summary: Some(CartSummary {
            cart_items: vec![product(1, 4)],
            ..Default::default()
        }),
        ..Default::default()
    };
    let mut session = CartSession::new(vec![product(1, 2), product(2, 5)]);

    session.apply_delta(1, 3, &api).await.unwrap_err();
    assert_eq!(api.calls.lock().as_slice(), ["qty 1 3", "fetch"]);

    // The projection is the backend's view, not the pre-delta snapshot
    assert_eq!(session.lines().len(), 1);
    assert_eq!(session.lines()[0].quantity, 4);
}

#[tokio::test]
async fn test_service_removal_calls_release() {
    let api = ScriptedApi::default();
    let mut session = CartSession::new(vec![service(9), product(1, 1)]);

    session.apply_delta(9, -1, &api).await.unwrap();
    assert_eq!(session.lines().len(), 1);
    assert_eq!(api.calls.lock().as_slice(), ["release 9"]);
}

#[tokio::test]
async fn test_failed_service_release_restores_reservation() {
    let api = ScriptedApi {
        fail: true,
        ..Default::default()
    };
    let mut session = CartSession::new(vec![service(9)]);

    session.apply_delta(9, -1, &api).await.unwrap_err();
    assert_eq!(session.lines().len(), 1);
    assert_eq!(session.lines()[0].id, 9);
}

#[tokio::test]
async fn test_noop_issues_no_backend_call() {
    let api = ScriptedApi::default();
    let mut session = CartSession::new(vec![service(9)]);

    let outcome = session.apply_delta(9, 1, &api).await.unwrap();
    assert_eq!(outcome, LineDeltaOutcome::Unchanged);
    assert!(api.calls.lock().is_empty());
}

#[test]
fn test_remote_summary_overwrites_projection() {
    let mut session = CartSession::new(vec![product(1, 2)]);
    session.apply_remote_summary(CartSummary {
        cart_items: vec![product(1, 4), product(3, 1)],
        ..Default::default()
    });
    assert_eq!(session.lines().len(), 2);
    assert_eq!(session.lines()[0].quantity, 4);
}
