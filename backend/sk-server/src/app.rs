use crate::db_monitor::DatabaseMonitor;
use crate::routes::{
    API_SERVER, DIAGNOSTICS_SERVER, METRICS_SERVER, build_api_router, build_diagnostics_router,
    build_metrics_router,
};
use crate::servers::http_server::HttpServer;
use crate::state::{AppState, ServiceIdentity};

use sk_config::{APP_NAME, Config, DatabaseConfig};
use sk_db::{Database, DbError, ErrorReporter, PoolSettings, SqliteDatabase};
use sk_lifecycle::{
    ErrorBudgetGuard, LifecycleOrchestrator, OrchestratorSettings, ServerRole, ShutdownReport,
};
use sk_telemetry::{Field, Logger, Metrics};

use std::path::PathBuf;
use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;

/// Run the service to completion: initialize dependencies, serve until a
/// shutdown cause arrives, then drain and report.
///
/// Expects logging and the metrics recorder to be installed already.
pub async fn run(config: Config, version: &str, prometheus: PrometheusHandle) -> ShutdownReport {
    let environment = config.environment.as_str();
    let logger = Logger::for_service(APP_NAME, version, environment);
    let metrics = Metrics::default();

    logger.info("Starting service", &[]);

    let mut orchestrator =
        LifecycleOrchestrator::new(orchestrator_settings(&config), logger.clone(), metrics.clone());
    let domain = orchestrator.domain().clone();

    let guard = Arc::new(ErrorBudgetGuard::new(
        config.database.error_budget,
        Arc::new(domain.clone()),
        logger.clone(),
        metrics.clone(),
    ));
    let reporter: Arc<dyn ErrorReporter> = guard;

    let init = orchestrator
        .initialize(async {
            let database = SqliteDatabase::connect(pool_settings(&config.database), Some(reporter))
                .await?;
            database.migrate().await?;
            let instance = database.register_instance(version).await?;
            logger.info(
                "Instance registered",
                &[Field::str("instance", instance.to_string())],
            );
            Ok::<Arc<dyn Database>, DbError>(Arc::new(database))
        })
        .await;

    let database = match init {
        Ok(database) => database,
        Err(_) => return orchestrator.run().await,
    };

    DatabaseMonitor::new(
        Arc::clone(&database),
        config.database.health_check_interval,
        &logger,
        metrics.clone(),
    )
    .spawn(&domain);

    let state = AppState {
        database: Arc::clone(&database),
        domain,
        identity: ServiceIdentity::new(APP_NAME, version, environment),
        logger: logger.clone(),
        metrics: metrics.clone(),
    };
    let forced_close_after = config.lifecycle.forced_close_after;
    let servers = &config.servers;

    orchestrator.register(Arc::new(HttpServer::new(
        METRICS_SERVER,
        servers.metrics_addr(),
        ServerRole::Auxiliary,
        build_metrics_router(prometheus, &state, &servers.metrics),
        forced_close_after,
        &logger,
        metrics.clone(),
    )));
    orchestrator.register(Arc::new(HttpServer::new(
        DIAGNOSTICS_SERVER,
        servers.diagnostics_addr(),
        ServerRole::Auxiliary,
        build_diagnostics_router(state.clone(), &servers.diagnostics),
        forced_close_after,
        &logger,
        metrics.clone(),
    )));
    orchestrator.register(Arc::new(HttpServer::new(
        API_SERVER,
        servers.api.addr.clone(),
        ServerRole::Critical,
        build_api_router(state, &servers.api),
        forced_close_after,
        &logger,
        metrics,
    )));

    let report = orchestrator.run().await;

    database.close().await;
    logger.debug("Database closed", &[]);

    report
}

pub fn orchestrator_settings(config: &Config) -> OrchestratorSettings {
    OrchestratorSettings {
        start_timeout: config.lifecycle.start_timeout,
        stop_timeout: config.lifecycle.stop_timeout,
        task_grace: config.lifecycle.task_grace,
        run_auxiliary: !config.servers.disable_auxiliary,
    }
}

pub fn pool_settings(config: &DatabaseConfig) -> PoolSettings {
    PoolSettings {
        path: PathBuf::from(&config.path),
        max_connections: config.max_connections,
        min_connections: config.min_connections,
        max_lifetime: config.max_lifetime,
        busy_timeout: config.busy_timeout,
        slow_statement_threshold: config.slow_statement_threshold,
    }
}
