mod cli;
mod middleware;

use crate::state::{AppState, ServiceIdentity};

use sk_db::{Database, DbError, DbStats};
use sk_lifecycle::CancellationDomain;
use sk_telemetry::{Logger, Metrics};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::response::Response;
use http_body_util::BodyExt;

pub(crate) const TEST_VERSION: &str = "1.2.3";

/// In-memory database whose ping outcome is switchable
pub(crate) struct FakeDatabase {
    healthy: AtomicBool,
    pings: AtomicU32,
    ping_delay: Duration,
}

impl FakeDatabase {
    pub(crate) fn healthy() -> Arc<Self> {
        Arc::new(Self {
            healthy: AtomicBool::new(true),
            pings: AtomicU32::new(0),
            ping_delay: Duration::ZERO,
        })
    }

    /// Healthy, but every ping takes `delay`
    pub(crate) fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            healthy: AtomicBool::new(true),
            pings: AtomicU32::new(0),
            ping_delay: delay,
        })
    }

    pub(crate) fn unhealthy() -> Arc<Self> {
        let database = Self::healthy();
        database.healthy.store(false, Ordering::SeqCst);
        database
    }

    pub(crate) fn pings(&self) -> u32 {
        self.pings.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Database for FakeDatabase {
    async fn ping(&self) -> sk_db::Result<()> {
        self.pings.fetch_add(1, Ordering::SeqCst);
        if !self.ping_delay.is_zero() {
            tokio::time::sleep(self.ping_delay).await;
        }
        if self.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(DbError::initialization("database is down"))
        }
    }

    fn stats(&self) -> DbStats {
        DbStats {
            size: 3,
            idle: 1,
            max_connections: 20,
        }
    }

    async fn close(&self) {}

    fn increase_error_count(&self) {}

    fn flush_error_count(&self) {}
}

pub(crate) fn test_state(database: Arc<FakeDatabase>) -> AppState {
    AppState {
        database,
        domain: CancellationDomain::new(Logger::default()),
        identity: ServiceIdentity::new("service-skeleton", TEST_VERSION, "development"),
        logger: Logger::default(),
        metrics: Metrics::default(),
    }
}

pub(crate) async fn body_json(response: Response<Body>) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}
