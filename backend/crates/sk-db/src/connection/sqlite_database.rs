use crate::{Database, DbError, DbStats, ErrorReporter, Result};

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{LevelFilter, debug, info};
use sqlx::ConnectOptions;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use uuid::Uuid;

/// Pool bounds and statement logging for [`SqliteDatabase::connect`]
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub path: PathBuf,
    pub max_connections: u32,
    pub min_connections: u32,
    pub max_lifetime: Duration,
    pub busy_timeout: Duration,
    pub slow_statement_threshold: Duration,
}

/// [`Database`] adapter around a sqlx SQLite pool
pub struct SqliteDatabase {
    pool: SqlitePool,
    reporter: Option<Arc<dyn ErrorReporter>>,
}

impl SqliteDatabase {
    pub async fn connect(
        settings: PoolSettings,
        reporter: Option<Arc<dyn ErrorReporter>>,
    ) -> Result<Self> {
        if let Some(parent) = settings.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                DbError::initialization(format!(
                    "Failed to create database directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        info!("Connecting to database: {}", settings.path.display());

        let options = SqliteConnectOptions::new()
            .filename(&settings.path)
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(settings.busy_timeout)
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, settings.slow_statement_threshold);

        let pool = SqlitePoolOptions::new()
            .max_connections(settings.max_connections)
            .min_connections(settings.min_connections)
            .max_lifetime(settings.max_lifetime)
            .connect_with(options)
            .await?;

        info!(
            "Database connection established (pool {}-{})",
            settings.min_connections, settings.max_connections
        );

        Ok(Self { pool, reporter })
    }

    /// Apply pending migrations from `migrations/`.
    pub async fn migrate(&self) -> Result<()> {
        info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Migrations complete");

        Ok(())
    }

    /// Record this process start in `app_instances`. Returns the instance id.
    pub async fn register_instance(&self, version: &str) -> Result<Uuid> {
        let id = Uuid::new_v4();

        let result = sqlx::query(
            "INSERT INTO app_instances (id, version, started_at) VALUES (?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(version)
        .bind(chrono::Utc::now().timestamp())
        .execute(&self.pool)
        .await;

        self.observe(result)?;
        debug!("Registered instance {} (version {})", id, version);

        Ok(id)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Report the outcome of a query to the error budget and convert the error.
    pub fn observe<T>(&self, result: std::result::Result<T, sqlx::Error>) -> Result<T> {
        match result {
            Ok(value) => {
                self.flush_error_count();
                Ok(value)
            }
            Err(e) => {
                self.increase_error_count();
                Err(DbError::from(e))
            }
        }
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    async fn ping(&self) -> Result<()> {
        let result = sqlx::query("SELECT 1").execute(&self.pool).await;
        self.observe(result).map(|_| ())
    }

    fn stats(&self) -> DbStats {
        DbStats {
            size: self.pool.size(),
            idle: self.pool.num_idle() as u32,
            max_connections: self.pool.options().get_max_connections(),
        }
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("Database pool closed");
    }

    fn increase_error_count(&self) {
        if let Some(reporter) = &self.reporter {
            reporter.report_failure();
        }
    }

    fn flush_error_count(&self) {
        if let Some(reporter) = &self.reporter {
            reporter.report_success();
        }
    }
}
