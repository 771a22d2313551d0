
use crate::{
    CancellationDomain, CancellationToken, LifecycleError, ManagedServer, OrchestratorSettings,
    ServerError, ServerErrorResult, ServerRole, ServerState, ShutdownCause, ShutdownTrigger,
};

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;

pub(crate) fn settings() -> OrchestratorSettings {
    OrchestratorSettings {
        start_timeout: Duration::from_secs(2),
        stop_timeout: Duration::from_secs(2),
        task_grace: Duration::from_millis(200),
        run_auxiliary: true,
    }
}

/// Records every cause it is handed
#[derive(Default)]
pub(crate) struct CountingTrigger {
    pub causes: Mutex<Vec<ShutdownCause>>,
}

impl CountingTrigger {
    pub(crate) fn count(&self) -> usize {
        self.causes.lock().unwrap().len()
    }
}

impl ShutdownTrigger for CountingTrigger {
    fn trigger_shutdown(&self, cause: ShutdownCause) {
        self.causes.lock().unwrap().push(cause);
    }
}

/// In-memory server following the same state machine as the HTTP servers:
/// `Running` once "bound", drains for `drain` after cancellation, then `Stopped`.
pub(crate) struct MockServer {
    name: &'static str,
    role: ServerRole,
    fail_bind: bool,
    never_ready: bool,
    drain: Duration,
    state_tx: watch::Sender<ServerState>,
    stop_token: OnceLock<CancellationToken>,
    stop_requested: AtomicBool,
    pub starts: AtomicU32,
    pub stops: AtomicU32,
}

impl MockServer {
    pub(crate) fn critical(name: &'static str) -> Self {
        Self::new(name, ServerRole::Critical)
    }

    pub(crate) fn auxiliary(name: &'static str) -> Self {
        Self::new(name, ServerRole::Auxiliary)
    }

    pub(crate) fn failing_bind(mut self) -> Self {
        self.fail_bind = true;
        self
    }

    pub(crate) fn never_ready(mut self) -> Self {
        self.never_ready = true;
        self
    }

    pub(crate) fn with_drain(mut self, drain: Duration) -> Self {
        self.drain = drain;
        self
    }

    pub(crate) fn starts(&self) -> u32 {
        self.starts.load(Ordering::SeqCst)
    }

    pub(crate) fn stops(&self) -> u32 {
        self.stops.load(Ordering::SeqCst)
    }

    fn new(name: &'static str, role: ServerRole) -> Self {
        let (state_tx, _) = watch::channel(ServerState::NotStarted);
        Self {
            name,
            role,
            fail_bind: false,
            never_ready: false,
            drain: Duration::ZERO,
            state_tx,
            stop_token: OnceLock::new(),
            stop_requested: AtomicBool::new(false),
            starts: AtomicU32::new(0),
            stops: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl ManagedServer for MockServer {
    fn name(&self) -> &str {
        self.name
    }

    fn addr(&self) -> &str {
        "127.0.0.1:0"
    }

    fn role(&self) -> ServerRole {
        self.role
    }

    fn watch_state(&self) -> watch::Receiver<ServerState> {
        self.state_tx.subscribe()
    }

    fn start(&self, domain: &CancellationDomain) -> ServerErrorResult<()> {
        if self.starts.fetch_add(1, Ordering::SeqCst) > 0 {
            return Err(ServerError::already_started(self.name));
        }

        let token = domain.child_token();
        let _ = self.stop_token.set(token.clone());
        let state = self.state_tx.clone();
        let (name, role, fail_bind, never_ready, drain) = (
            self.name,
            self.role,
            self.fail_bind,
            self.never_ready,
            self.drain,
        );

        domain.spawn(name, async move {
            if fail_bind {
                state.send_replace(ServerState::Stopped);
                let source = std::io::Error::from(std::io::ErrorKind::AddrInUse);
                return match role {
                    ServerRole::Critical => Err(LifecycleError::from(ServerError::bind(
                        name,
                        "127.0.0.1:0",
                        source,
                    ))),
                    ServerRole::Auxiliary => Ok(()),
                };
            }

            if !never_ready {
                state.send_replace(ServerState::Running);
            }
            token.cancelled().await;
            state.send_replace(ServerState::Stopping);
            tokio::time::sleep(drain).await;
            state.send_replace(ServerState::Stopped);
            Ok(())
        });

        Ok(())
    }

    async fn stop(&self, deadline: Duration) -> ServerErrorResult<()> {
        self.stops.fetch_add(1, Ordering::SeqCst);

        if self.stop_requested.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let Some(token) = self.stop_token.get() else {
            return Ok(());
        };
        token.cancel();

        let mut state = self.state_tx.subscribe();
        match tokio::time::timeout(deadline, state.wait_for(|s| *s == ServerState::Stopped)).await
        {
            Ok(_) => Ok(()),
            Err(_) => Err(ServerError::drain_timeout(self.name, deadline)),
        }
    }
}
