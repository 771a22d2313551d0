use sk_db::Database;
use sk_lifecycle::CancellationDomain;
use sk_telemetry::{Field, Logger, Metrics};

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};

/// Periodic database probe running as a domain task.
///
/// Each ping reports its outcome to the database's error reporter, so a
/// database that stays down exhausts the error budget and stops the
/// process. Pool occupancy is published after every probe.
pub struct DatabaseMonitor {
    database: Arc<dyn Database>,
    interval: Duration,
    logger: Logger,
    metrics: Metrics,
}

impl DatabaseMonitor {
    pub fn new(
        database: Arc<dyn Database>,
        interval: Duration,
        logger: &Logger,
        metrics: Metrics,
    ) -> Self {
        Self {
            database,
            interval,
            logger: logger.with(vec![Field::str("task", "db-monitor")]),
            metrics,
        }
    }

    /// Spawn the probe loop on `domain`. A zero interval disables it.
    pub fn spawn(self, domain: &CancellationDomain) {
        if self.interval.is_zero() {
            self.logger.info("Database health checks disabled", &[]);
            return;
        }

        let token = domain.token();
        domain.spawn("db-monitor", async move {
            let mut ticker = interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately
            ticker.tick().await;

            self.logger.debug(
                "Database monitoring started",
                &[Field::duration("interval", self.interval)],
            );

            loop {
                tokio::select! {
                    _ = token.cancelled() => return Ok(()),
                    _ = ticker.tick() => self.probe().await,
                }
            }
        });
    }

    async fn probe(&self) {
        if let Err(e) = self.database.ping().await {
            self.logger
                .warn("Database health check failed", &[Field::error(&e)]);
        }

        let stats = self.database.stats();
        self.metrics
            .pool_stats(stats.size, stats.idle, stats.max_connections);
    }
}
