use sk_config::Config;
use sk_server::{AppError, Cli};

use std::process::ExitCode;

use clap::Parser;
use log::LevelFilter;
use metrics_exporter_prometheus::PrometheusHandle;

const VERSION_ENV: &str = "APP_VERSION";

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let version =
        std::env::var(VERSION_ENV).unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string());

    let (config, prometheus) = match bootstrap(&cli) {
        Ok(ready) => ready,
        Err(e) => {
            // Logging may not be up yet
            eprintln!("sk-server: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let report = sk_server::run(config, &version, prometheus).await;

    ExitCode::from(report.exit_code() as u8)
}

/// Load and validate config, then install logging and the metrics recorder.
fn bootstrap(cli: &Cli) -> Result<(Config, PrometheusHandle), AppError> {
    let mut config = Config::load(&cli.config)?;
    if cli.disable_aux_servers {
        config.servers.disable_auxiliary = true;
    }
    config.validate()?;

    let (level, colored) = if config.is_development() {
        (LevelFilter::Debug, true)
    } else {
        (config.logging.level.0, config.logging.colored)
    };

    // Initialize logger (before any other logging)
    sk_telemetry::initialize(level, config.log_file_path(), colored)?;
    config.log_summary();

    let prometheus = sk_telemetry::install_recorder()?;

    Ok((config, prometheus))
}
