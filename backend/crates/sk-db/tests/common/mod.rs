#![allow(dead_code)]

use sk_db::{ErrorReporter, PoolSettings, SqliteDatabase};

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use tempfile::TempDir;

/// Counts outcomes reported by the database
#[derive(Default)]
pub struct CountingReporter {
    pub failures: AtomicU32,
    pub successes: AtomicU32,
}

impl CountingReporter {
    pub fn failures(&self) -> u32 {
        self.failures.load(Ordering::SeqCst)
    }

    pub fn successes(&self) -> u32 {
        self.successes.load(Ordering::SeqCst)
    }
}

impl ErrorReporter for CountingReporter {
    fn report_failure(&self) {
        self.failures.fetch_add(1, Ordering::SeqCst);
    }

    fn report_success(&self) {
        self.successes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Small pool on a file inside `dir`
pub fn test_settings(dir: &TempDir) -> PoolSettings {
    PoolSettings {
        path: dir.path().join("data").join("test.db"),
        max_connections: 4,
        min_connections: 1,
        max_lifetime: Duration::from_secs(60),
        busy_timeout: Duration::from_secs(5),
        slow_statement_threshold: Duration::from_secs(30),
    }
}

/// Connected and migrated database with a counting reporter attached
pub async fn create_test_database(dir: &TempDir) -> (SqliteDatabase, Arc<CountingReporter>) {
    let reporter = Arc::new(CountingReporter::default());
    let database = SqliteDatabase::connect(test_settings(dir), Some(reporter.clone()))
        .await
        .expect("Failed to connect test database");

    database.migrate().await.expect("Failed to run migrations");

    (database, reporter)
}
