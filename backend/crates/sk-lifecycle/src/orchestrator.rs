use crate::signals::watch_signals;
use crate::{
    CancellationDomain, LifecycleError, LifecycleErrorResult, LifecycleState, ManagedServer,
    ServerError, ServerRole, ServerState, ShutdownCause, ShutdownReport, StopOutcome,
};

use std::fmt::Display;
use std::future::Future;
use std::panic::Location;
use std::sync::Arc;
use std::time::Duration;

use error_location::ErrorLocation;
use sk_telemetry::{Field, Logger, Metrics};
use tokio::sync::watch;
use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    /// Bound on init and on servers reaching a running state
    pub start_timeout: Duration,
    /// Bound on draining the critical servers
    pub stop_timeout: Duration,
    /// Wait for background tasks after cancellation before aborting them
    pub task_grace: Duration,
    /// Start auxiliary servers (metrics, diagnostics)
    pub run_auxiliary: bool,
}

/// Drives the process through `Init → Starting → Running → Stopping → Stopped`.
///
/// The orchestrator alone decides whether the run failed: every fatal path
/// (task failure, guard trip, start timeout) cancels the shared domain and
/// ends up in the [`ShutdownReport`] returned by [`run`](Self::run).
pub struct LifecycleOrchestrator {
    settings: OrchestratorSettings,
    domain: CancellationDomain,
    servers: Vec<Arc<dyn ManagedServer>>,
    init_error: Option<String>,
    state_tx: watch::Sender<LifecycleState>,
    logger: Logger,
    metrics: Metrics,
}

impl LifecycleOrchestrator {
    /// Create the orchestrator and its domain, and start watching for
    /// SIGINT/SIGTERM. Must be called from within a tokio runtime.
    pub fn new(settings: OrchestratorSettings, logger: Logger, metrics: Metrics) -> Self {
        let (state_tx, _) = watch::channel(LifecycleState::Init);
        metrics.lifecycle_state(LifecycleState::Init.as_str());

        let domain = CancellationDomain::new(logger.clone());
        watch_signals(&domain);

        Self {
            settings,
            domain,
            servers: Vec::new(),
            init_error: None,
            state_tx,
            logger,
            metrics,
        }
    }

    pub fn domain(&self) -> &CancellationDomain {
        &self.domain
    }

    pub fn register(&mut self, server: Arc<dyn ManagedServer>) {
        self.logger.debug(
            "Server registered",
            &[
                Field::server(server.name()),
                Field::addr(server.addr()),
                Field::str("role", role_label(server.role())),
            ],
        );
        self.servers.push(server);
    }

    pub fn state(&self) -> LifecycleState {
        *self.state_tx.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<LifecycleState> {
        self.state_tx.subscribe()
    }

    /// Run dependency construction (connect, migrate, ...) under the start
    /// timeout. On failure the orchestrator moves straight to `Stopped` and
    /// [`run`](Self::run) will not start any server.
    #[track_caller]
    pub fn initialize<T, E, F>(
        &mut self,
        init: F,
    ) -> impl Future<Output = LifecycleErrorResult<T>>
    where
        F: Future<Output = Result<T, E>>,
        E: Display,
    {
        let location = ErrorLocation::from(Location::caller());

        async move {
            let timeout = self.settings.start_timeout;
            let started = Instant::now();

            let error = match tokio::time::timeout(timeout, init).await {
                Ok(Ok(value)) => {
                    self.logger
                        .info("Initialization complete", &[Field::elapsed(started.elapsed())]);
                    return Ok(value);
                }
                Ok(Err(e)) => LifecycleError::Init {
                    message: e.to_string(),
                    location,
                },
                Err(_) => LifecycleError::InitTimeout { timeout, location },
            };

            self.init_error = Some(error.to_string());
            self.domain
                .trigger(ShutdownCause::Fatal(format!("initialization failed: {}", error)));
            self.set_state(LifecycleState::Stopped);

            Err(error)
        }
    }

    /// Start the servers, block until the domain is cancelled, then stop
    /// everything and report.
    pub async fn run(self) -> ShutdownReport {
        if let Some(init_error) = self.init_error.clone() {
            self.domain.shutdown(self.settings.task_grace).await;
            let report = ShutdownReport::init_failed(init_error, self.domain.cause());
            self.finish(&report);
            return report;
        }

        self.set_state(LifecycleState::Starting);
        let started = self.start_servers().await;

        if !self.domain.is_cancelled() {
            self.set_state(LifecycleState::Running);
            self.logger.info(
                "Service running",
                &[Field::list(
                    "servers",
                    started.iter().map(|s| s.name().to_string()),
                )],
            );
        }

        self.domain.cancelled().await;

        self.set_state(LifecycleState::Stopping);
        let mut entries = self.stop_critical(&started).await;

        let aborted_tasks = self.domain.shutdown(self.settings.task_grace).await;
        entries.extend(self.collect_auxiliary(&started));

        let report = ShutdownReport {
            entries,
            cause: self.domain.cause(),
            task_failures: self.domain.failures(),
            aborted_tasks,
            init_error: None,
        };

        self.finish(&report);
        report
    }

    /// Auxiliary servers first, then critical ones, each in registration
    /// order. Returns the servers that were started, in start order.
    async fn start_servers(&self) -> Vec<Arc<dyn ManagedServer>> {
        let (critical, auxiliary): (Vec<_>, Vec<_>) = self
            .servers
            .iter()
            .cloned()
            .partition(|s| s.role() == ServerRole::Critical);

        let mut order = Vec::with_capacity(self.servers.len());
        if self.settings.run_auxiliary {
            order.extend(auxiliary);
        } else if !auxiliary.is_empty() {
            self.logger.info(
                "Auxiliary servers disabled",
                &[Field::list(
                    "servers",
                    auxiliary.iter().map(|s| s.name().to_string()),
                )],
            );
        }
        order.extend(critical);

        let mut started = Vec::with_capacity(order.len());
        for server in order {
            if self.domain.is_cancelled() {
                break;
            }

            match server.start(&self.domain) {
                Ok(()) => started.push(server),
                Err(e) => {
                    self.logger.error(
                        "Server start rejected",
                        &[Field::server(server.name()), Field::error(&e)],
                    );
                    if server.role() == ServerRole::Critical {
                        self.domain.trigger(ShutdownCause::Fatal(e.to_string()));
                    }
                }
            }
        }

        let timeout = self.settings.start_timeout;
        let all_ready = async {
            for server in &started {
                let mut state = server.watch_state();
                // Errors mean the server dropped its sender, which only
                // happens once it is gone
                let _ = state.wait_for(|s| *s != ServerState::NotStarted).await;
            }
        };

        tokio::select! {
            _ = self.domain.cancelled() => {}
            result = tokio::time::timeout(timeout, all_ready) => {
                if result.is_err() {
                    self.domain.trigger(ShutdownCause::Fatal(format!(
                        "servers did not start within {}",
                        humantime::format_duration(timeout)
                    )));
                }
            }
        }

        started
    }

    /// Drain critical servers in reverse start order against one shared deadline.
    async fn stop_critical(&self, started: &[Arc<dyn ManagedServer>]) -> Vec<StopOutcome> {
        let deadline = Instant::now() + self.settings.stop_timeout;
        let mut entries = Vec::new();

        for server in started
            .iter()
            .rev()
            .filter(|s| s.role() == ServerRole::Critical)
        {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let result = server.stop(remaining).await;

            self.logger.log_if_error(
                "Server did not stop cleanly",
                &result,
                &[Field::server(server.name())],
            );

            entries.push(StopOutcome {
                server: server.name().to_string(),
                error: result.err(),
            });
        }

        entries
    }

    /// Auxiliary servers are not drained; they stop on cancellation. Anything
    /// still serving after the task grace is reported.
    fn collect_auxiliary(&self, started: &[Arc<dyn ManagedServer>]) -> Vec<StopOutcome> {
        started
            .iter()
            .rev()
            .filter(|s| s.role() == ServerRole::Auxiliary)
            .map(|server| {
                let error = match server.state() {
                    ServerState::Stopped | ServerState::NotStarted => None,
                    state => Some(ServerError::close(
                        server.name(),
                        format!("still {} after cancellation", state.as_str()),
                    )),
                };

                StopOutcome {
                    server: server.name().to_string(),
                    error,
                }
            })
            .collect()
    }

    fn finish(&self, report: &ShutdownReport) {
        if let Some(cause) = &report.cause {
            self.metrics.shutdown_cause(cause.kind());
        }
        report.log(&self.logger);
        self.set_state(LifecycleState::Stopped);
    }

    fn set_state(&self, state: LifecycleState) {
        let changed = self.state_tx.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                *current = state;
                true
            }
        });

        if changed {
            self.metrics.lifecycle_state(state.as_str());
            self.logger
                .debug("Lifecycle state changed", &[Field::str("state", state.as_str())]);
        }
    }
}

fn role_label(role: ServerRole) -> &'static str {
    match role {
        ServerRole::Critical => "critical",
        ServerRole::Auxiliary => "auxiliary",
    }
}
