use crate::{CancellationDomain, ServerErrorResult};

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerRole {
    /// Failure ends the process
    Critical,
    /// Failure is logged and the process keeps running
    Auxiliary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    NotStarted,
    Running,
    Stopping,
    Stopped,
}

impl ServerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServerState::NotStarted => "not_started",
            ServerState::Running => "running",
            ServerState::Stopping => "stopping",
            ServerState::Stopped => "stopped",
        }
    }
}

/// Uniform start/stop contract for the network servers of the process.
#[async_trait]
pub trait ManagedServer: Send + Sync {
    fn name(&self) -> &str;

    /// Configured listen address
    fn addr(&self) -> &str;

    fn role(&self) -> ServerRole;

    fn watch_state(&self) -> watch::Receiver<ServerState>;

    fn state(&self) -> ServerState {
        *self.watch_state().borrow()
    }

    /// Begin serving on a task of `domain` and return immediately.
    ///
    /// Bind and serve failures surface through the domain. An `Err` here
    /// only means the server was already started.
    fn start(&self, domain: &CancellationDomain) -> ServerErrorResult<()>;

    /// Drain gracefully. Returns `DrainTimeout` when `deadline` elapses with
    /// connections still open. Calling it again returns `Ok` immediately.
    async fn stop(&self, deadline: Duration) -> ServerErrorResult<()>;
}
