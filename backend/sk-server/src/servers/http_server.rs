use crate::servers::in_flight::{InFlight, track_in_flight};

use sk_lifecycle::{
    CancellationDomain, CancellationToken, LifecycleError, LifecycleErrorResult, ManagedServer,
    ServerError, ServerErrorResult, ServerRole, ServerState,
};
use sk_telemetry::{Field, Logger, Metrics};

use std::future::IntoFuture;
use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use axum::{Router, middleware};
use tokio::net::TcpListener;
use tokio::sync::watch;

/// Cut-off responses get this long to flush before the listener is dropped
const FORCED_FLUSH: Duration = Duration::from_millis(250);

/// Router served on a TCP listener under the [`ManagedServer`] contract.
///
/// The serve loop runs as a task of the cancellation domain. Bind and serve
/// failures of a critical server fail that task (and with it the process);
/// an auxiliary server only logs them.
///
/// `Stopped` is only published once no request is left in flight. Requests
/// still running `forced_close_after` past cancellation are answered with
/// 503, and [`ManagedServer::stop`] reports them as a close error.
pub struct HttpServer {
    name: &'static str,
    addr: String,
    role: ServerRole,
    router: Mutex<Option<Router>>,
    forced_close_after: Duration,
    state_tx: watch::Sender<ServerState>,
    stop_token: OnceLock<CancellationToken>,
    stop_requested: AtomicBool,
    local_addr: Arc<OnceLock<SocketAddr>>,
    in_flight: InFlight,
    logger: Logger,
    metrics: Metrics,
}

impl HttpServer {
    pub fn new(
        name: &'static str,
        addr: impl Into<String>,
        role: ServerRole,
        router: Router,
        forced_close_after: Duration,
        logger: &Logger,
        metrics: Metrics,
    ) -> Self {
        let (state_tx, _) = watch::channel(ServerState::NotStarted);

        Self {
            name,
            addr: addr.into(),
            role,
            router: Mutex::new(Some(router)),
            forced_close_after,
            state_tx,
            stop_token: OnceLock::new(),
            stop_requested: AtomicBool::new(false),
            local_addr: Arc::new(OnceLock::new()),
            in_flight: InFlight::default(),
            logger: logger.with(vec![Field::server(name)]),
            metrics,
        }
    }

    /// Address actually bound, once the listener is up
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr.get().copied()
    }

    /// Requests currently being handled
    pub fn in_flight(&self) -> usize {
        self.in_flight.active()
    }
}

#[async_trait]
impl ManagedServer for HttpServer {
    fn name(&self) -> &str {
        self.name
    }

    fn addr(&self) -> &str {
        &self.addr
    }

    fn role(&self) -> ServerRole {
        self.role
    }

    fn watch_state(&self) -> watch::Receiver<ServerState> {
        self.state_tx.subscribe()
    }

    fn start(&self, domain: &CancellationDomain) -> ServerErrorResult<()> {
        let router = self
            .router
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        let Some(router) = router else {
            return Err(ServerError::already_started(self.name));
        };

        let router = router.layer(middleware::from_fn_with_state(
            self.in_flight.clone(),
            track_in_flight,
        ));

        let token = domain.child_token();
        let _ = self.stop_token.set(token.clone());

        let serve = ServeLoop {
            name: self.name,
            addr: self.addr.clone(),
            role: self.role,
            forced_close_after: self.forced_close_after,
            state_tx: self.state_tx.clone(),
            local_addr: Arc::clone(&self.local_addr),
            in_flight: self.in_flight.clone(),
            logger: self.logger.clone(),
            metrics: self.metrics.clone(),
        };

        domain.spawn(self.name, serve.run(router, token));
        Ok(())
    }

    async fn stop(&self, deadline: Duration) -> ServerErrorResult<()> {
        if self.stop_requested.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let Some(token) = self.stop_token.get() else {
            return Ok(());
        };

        let draining = self.state_tx.send_if_modified(|state| {
            if *state == ServerState::Running {
                *state = ServerState::Stopping;
                true
            } else {
                false
            }
        });
        if draining {
            self.metrics
                .server_state_changed(self.name, ServerState::Stopping.as_str());
        }
        self.logger.info(
            "Draining connections",
            &[
                Field::duration("deadline", deadline),
                Field::uint("in_flight", self.in_flight.active() as u64),
            ],
        );
        token.cancel();

        let mut state = self.state_tx.subscribe();
        match tokio::time::timeout(deadline, state.wait_for(|s| *s == ServerState::Stopped)).await
        {
            Err(_) => Err(ServerError::drain_timeout(self.name, deadline)),
            Ok(_) => match self.in_flight.cut_off() {
                0 => Ok(()),
                cut_off => Err(ServerError::close(
                    self.name,
                    format!("forced close cut off {} in-flight request(s)", cut_off),
                )),
            },
        }
    }
}

/// Everything the serve task needs, detached from the server handle
struct ServeLoop {
    name: &'static str,
    addr: String,
    role: ServerRole,
    forced_close_after: Duration,
    state_tx: watch::Sender<ServerState>,
    local_addr: Arc<OnceLock<SocketAddr>>,
    in_flight: InFlight,
    logger: Logger,
    metrics: Metrics,
}

impl ServeLoop {
    async fn run(self, router: Router, token: CancellationToken) -> LifecycleErrorResult<()> {
        let listener = tokio::select! {
            _ = token.cancelled() => {
                self.set_state(ServerState::Stopped);
                return Ok(());
            }
            result = TcpListener::bind(&self.addr) => result,
        };

        let listener = match listener {
            Ok(listener) => listener,
            Err(e) => {
                self.set_state(ServerState::Stopped);
                return self.fail(ServerError::bind(self.name, &self.addr, e));
            }
        };

        let bound = match listener.local_addr() {
            Ok(bound) => bound,
            Err(e) => {
                self.set_state(ServerState::Stopped);
                return self.fail(ServerError::serve(self.name, e));
            }
        };
        let _ = self.local_addr.set(bound);

        self.logger.info("Server listening", &[Field::addr(bound)]);
        self.set_state(ServerState::Running);

        let serve = axum::serve(listener, router)
            .with_graceful_shutdown(token.clone().cancelled_owned())
            .into_future();
        tokio::pin!(serve);

        let forced = async {
            token.cancelled().await;
            tokio::time::sleep(self.forced_close_after).await;
        };

        let drained = tokio::select! {
            result = &mut serve => Some(result),
            _ = forced => None,
        };
        let result = match drained {
            Some(result) => result,
            None => self.force_close(serve.as_mut()).await,
        };

        self.in_flight.wait_idle().await;
        self.set_state(ServerState::Stopped);

        match result {
            Ok(()) => {
                self.logger.info("Server stopped", &[]);
                Ok(())
            }
            Err(e) => self.fail(ServerError::serve(self.name, e)),
        }
    }

    /// Cut off every in-flight request, then give the 503s a moment to flush.
    async fn force_close<F>(&self, serve: Pin<&mut F>) -> io::Result<()>
    where
        F: Future<Output = io::Result<()>>,
    {
        let open = self.in_flight.force_close();
        self.logger.warn(
            "Forcing close with requests still in flight",
            &[
                Field::duration("after", self.forced_close_after),
                Field::uint("in_flight", open as u64),
            ],
        );

        match tokio::time::timeout(FORCED_FLUSH, serve).await {
            Ok(result) => result,
            Err(_) => {
                self.logger
                    .warn("Dropping listener with connections still open", &[]);
                Ok(())
            }
        }
    }

    /// Critical failures end the task with an error, auxiliary ones are logged
    fn fail(&self, error: ServerError) -> LifecycleErrorResult<()> {
        match self.role {
            ServerRole::Critical => Err(LifecycleError::from(error)),
            ServerRole::Auxiliary => {
                self.logger
                    .error("Auxiliary server failed", &[Field::error(&error)]);
                Ok(())
            }
        }
    }

    fn set_state(&self, state: ServerState) {
        let changed = self.state_tx.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                *current = state;
                true
            }
        });

        if changed {
            self.metrics.server_state_changed(self.name, state.as_str());
        }
    }
}
