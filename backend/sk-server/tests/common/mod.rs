#![allow(dead_code)]

//! Test infrastructure for end-to-end service runs

use sk_config::Config;

use std::time::Duration;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tempfile::TempDir;

pub const TEST_VERSION: &str = "9.9.9-test";

/// Loopback address on a port that was free a moment ago
pub fn free_addr() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind probe port");
    listener
        .local_addr()
        .expect("Failed to read probe address")
        .to_string()
}

/// Config with short timeouts, a small pool and a database inside `dir`
pub fn test_config(dir: &TempDir) -> Config {
    let mut config = Config::default();

    config.servers.api.addr = free_addr();
    config.servers.metrics.addr = free_addr();
    config.servers.diagnostics.addr = free_addr();

    config.database.path = dir
        .path()
        .join("data")
        .join("service.db")
        .to_string_lossy()
        .into_owned();
    config.database.max_connections = 4;
    config.database.min_connections = 1;
    config.database.health_check_interval = Duration::from_millis(50);

    config.lifecycle.start_timeout = Duration::from_secs(5);
    config.lifecycle.stop_timeout = Duration::from_secs(2);
    config.lifecycle.forced_close_after = Duration::from_millis(200);
    config.lifecycle.task_grace = Duration::from_millis(500);

    config
}

/// Handle of a recorder that is not installed globally
pub fn prometheus_handle() -> PrometheusHandle {
    PrometheusBuilder::new().build_recorder().handle()
}

/// Poll `url` until it answers or `timeout` passes
pub async fn wait_for_http(url: &str, timeout: Duration) -> reqwest::Response {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if let Ok(response) = reqwest::get(url).await {
            return response;
        }
        if tokio::time::Instant::now() >= deadline {
            panic!("{} did not answer within {:?}", url, timeout);
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

/// True when something accepts connections on `addr`
pub async fn is_listening(addr: &str) -> bool {
    tokio::net::TcpStream::connect(addr).await.is_ok()
}
