use crate::{GuardState, ShutdownCause, ShutdownTrigger};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use sk_db::ErrorReporter;
use sk_telemetry::{Field, Logger, Metrics};

pub const BUDGET_EXHAUSTED_REASON: &str = "database error budget exhausted";

/// Counts consecutive database failures and shuts the process down once the
/// count exceeds `max_failures`.
///
/// The trip is edge-triggered: the trigger fires once on the `max + 1`-th
/// consecutive failure and further failures are ignored until a success
/// re-arms the guard.
pub struct ErrorBudgetGuard {
    max_failures: u32,
    failures: AtomicU32,
    tripped: AtomicBool,
    trigger: Arc<dyn ShutdownTrigger>,
    logger: Logger,
    metrics: Metrics,
}

impl ErrorBudgetGuard {
    pub fn new(
        max_failures: u32,
        trigger: Arc<dyn ShutdownTrigger>,
        logger: Logger,
        metrics: Metrics,
    ) -> Self {
        Self {
            max_failures,
            failures: AtomicU32::new(0),
            tripped: AtomicBool::new(false),
            trigger,
            logger: logger.with(vec![Field::str("component", "error-budget")]),
            metrics,
        }
    }

    pub fn report_failure(&self) {
        if self.tripped.load(Ordering::SeqCst) {
            return;
        }

        let count = self.failures.fetch_add(1, Ordering::SeqCst).saturating_add(1);
        self.metrics.db_failure_reported(count);

        if count <= self.max_failures {
            self.logger.warn(
                "Database failure",
                &[
                    Field::uint("consecutive", count as u64),
                    Field::uint("max", self.max_failures as u64),
                ],
            );
            return;
        }

        if self
            .tripped
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            self.logger.error(
                "Database error budget exhausted, shutting down",
                &[
                    Field::uint("consecutive", count as u64),
                    Field::uint("max", self.max_failures as u64),
                ],
            );
            self.metrics.db_budget_tripped();
            self.trigger
                .trigger_shutdown(ShutdownCause::Fatal(BUDGET_EXHAUSTED_REASON.to_string()));
        }
    }

    pub fn report_success(&self) {
        let previous = self.failures.swap(0, Ordering::SeqCst);
        let was_tripped = self.tripped.swap(false, Ordering::SeqCst);
        self.metrics.db_success_reported();

        if previous > 0 || was_tripped {
            self.logger.info(
                "Database recovered",
                &[Field::uint("after_failures", previous as u64)],
            );
        }
    }

    pub fn state(&self) -> GuardState {
        if self.tripped.load(Ordering::SeqCst) {
            return GuardState::Tripped;
        }

        match self.failures.load(Ordering::SeqCst) {
            0 => GuardState::Healthy,
            n => GuardState::Degraded(n),
        }
    }

    pub fn max_failures(&self) -> u32 {
        self.max_failures
    }
}

impl ErrorReporter for ErrorBudgetGuard {
    fn report_failure(&self) {
        ErrorBudgetGuard::report_failure(self);
    }

    fn report_success(&self) {
        ErrorBudgetGuard::report_success(self);
    }
}
