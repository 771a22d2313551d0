use crate::Result;

use async_trait::async_trait;

/// Receives the outcome of database round trips.
///
/// Implemented by the error budget guard; the database calls it after each
/// health probe and whenever a caller reports an outcome explicitly.
pub trait ErrorReporter: Send + Sync {
    fn report_failure(&self);
    fn report_success(&self);
}

/// Connection pool occupancy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DbStats {
    pub size: u32,
    pub idle: u32,
    pub max_connections: u32,
}

impl DbStats {
    pub fn in_use(&self) -> u32 {
        self.size.saturating_sub(self.idle)
    }
}

#[async_trait]
pub trait Database: Send + Sync {
    /// Round trip to the database. The outcome is also reported to the
    /// attached [`ErrorReporter`].
    async fn ping(&self) -> Result<()>;

    fn stats(&self) -> DbStats;

    /// Close the pool. Waits for checked-out connections to be returned.
    async fn close(&self);

    /// Count one failed operation against the error budget.
    fn increase_error_count(&self);

    /// Reset the consecutive failure count after a success.
    fn flush_error_count(&self);
}
