//! Requests in flight on one server, and the switch that cuts them off.

use sk_lifecycle::CancellationToken;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::watch;

#[derive(Debug, Clone)]
pub struct InFlight {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    active: watch::Sender<usize>,
    force: CancellationToken,
    cut_off: AtomicUsize,
}

impl Default for InFlight {
    fn default() -> Self {
        let (active, _) = watch::channel(0);

        Self {
            inner: Arc::new(Inner {
                active,
                force: CancellationToken::new(),
                cut_off: AtomicUsize::new(0),
            }),
        }
    }
}

impl InFlight {
    /// Requests currently inside the router
    pub fn active(&self) -> usize {
        *self.inner.active.borrow()
    }

    /// Requests answered with 503 because of [`InFlight::force_close`]
    pub fn cut_off(&self) -> usize {
        self.inner.cut_off.load(Ordering::SeqCst)
    }

    /// Abandon every in-flight request; returns how many were open.
    pub fn force_close(&self) -> usize {
        let open = self.active();
        self.inner.force.cancel();
        open
    }

    pub async fn wait_idle(&self) {
        let mut active = self.inner.active.subscribe();
        let _ = active.wait_for(|n| *n == 0).await;
    }

    fn enter(&self) -> RequestGuard {
        self.inner.active.send_modify(|n| *n += 1);
        RequestGuard(self.clone())
    }
}

/// Decrements the count when the request future completes or is dropped
struct RequestGuard(InFlight);

impl Drop for RequestGuard {
    fn drop(&mut self) {
        self.0.inner.active.send_modify(|n| *n = n.saturating_sub(1));
    }
}

/// Count the request for the server's drain, and cut it off on forced close.
pub async fn track_in_flight(
    State(in_flight): State<InFlight>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let _guard = in_flight.enter();

    tokio::select! {
        biased;
        _ = in_flight.inner.force.cancelled() => {
            in_flight.inner.cut_off.fetch_add(1, Ordering::SeqCst);
            StatusCode::SERVICE_UNAVAILABLE.into_response()
        }
        response = next.run(req) => response,
    }
}
