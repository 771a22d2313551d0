mod cancellation_domain;
mod error;
mod error_budget_guard;
mod guard_state;
mod lifecycle_state;
mod managed_server;
mod orchestrator;
mod server_error;
mod shutdown_cause;
mod shutdown_report;
mod shutdown_trigger;
mod signals;

#[cfg(test)]
mod tests;

pub use cancellation_domain::{CancellationDomain, TaskFailure};
pub use error::{LifecycleError, LifecycleErrorResult};
pub use error_budget_guard::{BUDGET_EXHAUSTED_REASON, ErrorBudgetGuard};
pub use guard_state::GuardState;
pub use lifecycle_state::LifecycleState;
pub use managed_server::{ManagedServer, ServerRole, ServerState};
pub use orchestrator::{LifecycleOrchestrator, OrchestratorSettings};
pub use server_error::{ServerError, ServerErrorResult};
pub use shutdown_cause::ShutdownCause;
pub use shutdown_report::{ShutdownReport, StopOutcome};
pub use shutdown_trigger::ShutdownTrigger;

pub use tokio_util::sync::CancellationToken;
