use crate::{LifecycleErrorResult, ShutdownCause, ShutdownTrigger};

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use std::time::Duration;

use sk_telemetry::{Field, Logger};
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};

/// A background task that ended with an error or a panic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    pub task: String,
    pub error: String,
}

/// One cancellation token shared by every background task of the process,
/// plus the task group those tasks run in.
///
/// Cancellation is one-shot. The first task that fails cancels the token for
/// all of its siblings, and the first [`ShutdownCause`] recorded is kept.
#[derive(Clone)]
pub struct CancellationDomain {
    inner: Arc<Inner>,
}

struct Inner {
    token: CancellationToken,
    tasks: Mutex<JoinSet<()>>,
    cause: OnceLock<ShutdownCause>,
    failures: Mutex<Vec<TaskFailure>>,
    closed: AtomicBool,
    logger: Logger,
}

impl CancellationDomain {
    pub fn new(logger: Logger) -> Self {
        Self {
            inner: Arc::new(Inner {
                token: CancellationToken::new(),
                tasks: Mutex::new(JoinSet::new()),
                cause: OnceLock::new(),
                failures: Mutex::new(Vec::new()),
                closed: AtomicBool::new(false),
                logger,
            }),
        }
    }

    /// Run `task` in the group. An `Err` result is recorded as a task
    /// failure and cancels the domain with a fatal cause.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<F>(&self, name: impl Into<String>, task: F)
    where
        F: Future<Output = LifecycleErrorResult<()>> + Send + 'static,
    {
        let name = name.into();

        if self.inner.closed.load(Ordering::SeqCst) {
            self.inner.logger.warn(
                "Task spawned after shutdown, ignoring",
                &[Field::str("task", name)],
            );
            return;
        }

        let domain = self.clone();
        let mut tasks = lock(&self.inner.tasks);

        // Reap finished tasks so the set does not grow without bound
        while let Some(result) = tasks.try_join_next() {
            self.reap(result);
        }

        tasks.spawn(async move {
            if let Err(e) = task.await {
                domain.record_failure(&name, &e.to_string());
            }
        });
    }

    /// Record `cause` if none is recorded yet, then cancel.
    pub fn trigger(&self, cause: ShutdownCause) {
        let cause_kind = cause.kind();
        let reason = cause.to_string();

        if self.inner.cause.set(cause).is_ok() {
            self.inner.logger.info(
                "Shutdown triggered",
                &[Field::str("cause", cause_kind), Field::str("reason", reason)],
            );
        } else {
            self.inner.logger.debug(
                "Shutdown already triggered, cause ignored",
                &[Field::str("reason", reason)],
            );
        }

        self.inner.token.cancel();
    }

    pub fn request_shutdown(&self, origin: impl Into<String>) {
        self.trigger(ShutdownCause::Requested(origin.into()));
    }

    pub fn token(&self) -> CancellationToken {
        self.inner.token.clone()
    }

    /// Token cancelled with the domain that can also be cancelled on its own
    pub fn child_token(&self) -> CancellationToken {
        self.inner.token.child_token()
    }

    pub fn cancelled(&self) -> WaitForCancellationFutureOwned {
        self.inner.token.clone().cancelled_owned()
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.token.is_cancelled()
    }

    pub fn cause(&self) -> Option<ShutdownCause> {
        self.inner.cause.get().cloned()
    }

    pub fn failures(&self) -> Vec<TaskFailure> {
        lock(&self.inner.failures).clone()
    }

    /// Tasks spawned and not yet reaped
    pub fn task_count(&self) -> usize {
        lock(&self.inner.tasks).len()
    }

    /// Cancel, wait up to `grace` for every task to finish, then abort the
    /// stragglers. Returns how many tasks were aborted.
    pub async fn shutdown(&self, grace: Duration) -> usize {
        self.inner.token.cancel();
        self.inner.closed.store(true, Ordering::SeqCst);

        let mut tasks = std::mem::take(&mut *lock(&self.inner.tasks));

        let drained = tokio::time::timeout(grace, async {
            while let Some(result) = tasks.join_next().await {
                self.reap(result);
            }
        })
        .await;

        if drained.is_ok() {
            return 0;
        }

        let aborted = tasks.len();
        self.inner.logger.warn(
            "Tasks still running after grace period, aborting",
            &[
                Field::uint("tasks", aborted as u64),
                Field::duration("grace", grace),
            ],
        );

        tasks.abort_all();
        while let Some(result) = tasks.join_next().await {
            self.reap(result);
        }

        aborted
    }

    fn reap(&self, result: Result<(), JoinError>) {
        if let Err(e) = result
            && e.is_panic()
        {
            self.record_failure("<panicked>", &e.to_string());
        }
    }

    fn record_failure(&self, task: &str, error: &str) {
        self.inner.logger.error(
            "Background task failed",
            &[Field::str("task", task), Field::str("error", error)],
        );

        lock(&self.inner.failures).push(TaskFailure {
            task: task.to_string(),
            error: error.to_string(),
        });

        self.trigger(ShutdownCause::Fatal(format!("task {} failed: {}", task, error)));
    }
}

impl ShutdownTrigger for CancellationDomain {
    fn trigger_shutdown(&self, cause: ShutdownCause) {
        self.trigger(cause);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
