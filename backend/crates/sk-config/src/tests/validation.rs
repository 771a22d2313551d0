use crate::{Config, ConfigError, DatabaseConfig, LifecycleConfig, ServersConfig};

use std::time::Duration;

use googletest::assert_that;
use googletest::prelude::{anything, eq, err, ok};

// =========================================================================
// Servers
// =========================================================================

#[test]
fn given_default_servers_when_validate_then_ok() {
    assert_that!(ServersConfig::default().validate(), ok(anything()));
}

#[test]
fn given_addr_without_port_when_validate_then_invalid_value() {
    // Given
    let mut servers = ServersConfig::default();
    servers.api.addr = "localhost".to_string();

    // When
    let result = servers.validate();

    // Then
    assert_that!(
        matches!(result, Err(ConfigError::InvalidValue { .. })),
        eq(true)
    );
}

#[test]
fn given_duplicate_addresses_when_validate_then_error() {
    // Given
    let mut servers = ServersConfig::default();
    servers.metrics.addr = servers.api.addr.clone();

    // When / Then
    assert_that!(servers.validate(), err(anything()));
}

#[test]
fn given_duplicate_addresses_with_aux_disabled_when_validate_then_ok() {
    // Given
    let mut servers = ServersConfig::default();
    servers.metrics.addr = servers.api.addr.clone();
    servers.disable_auxiliary = true;

    // When / Then
    assert_that!(servers.validate(), ok(anything()));
}

#[test]
fn given_all_port_zero_when_validate_then_ok() {
    // Given
    let mut servers = ServersConfig::default();
    servers.api.addr = "127.0.0.1:0".to_string();
    servers.metrics.addr = "127.0.0.1:0".to_string();
    servers.diagnostics.addr = "127.0.0.1:0".to_string();

    // When / Then
    assert_that!(servers.validate(), ok(anything()));
}

#[test]
fn given_zero_api_timeout_when_validate_then_error() {
    // Given
    let mut servers = ServersConfig::default();
    servers.api.write_timeout = Duration::ZERO;

    // When / Then
    assert_that!(servers.validate(), err(anything()));
}

// =========================================================================
// Database
// =========================================================================

#[test]
fn given_empty_path_when_validate_then_error() {
    let database = DatabaseConfig {
        path: "  ".to_string(),
        ..DatabaseConfig::default()
    };

    assert_that!(database.validate(), err(anything()));
}

#[test]
fn given_min_above_max_connections_when_validate_then_error() {
    let database = DatabaseConfig {
        max_connections: 4,
        min_connections: 5,
        ..DatabaseConfig::default()
    };

    assert_that!(database.validate(), err(anything()));
}

#[test]
fn given_zero_error_budget_when_validate_then_error() {
    let database = DatabaseConfig {
        error_budget: 0,
        ..DatabaseConfig::default()
    };

    assert_that!(database.validate(), err(anything()));
}

#[test]
fn given_max_connections_at_bounds_when_validate_then_ok() {
    for max in [1, 1000] {
        let database = DatabaseConfig {
            max_connections: max,
            min_connections: 1,
            ..DatabaseConfig::default()
        };

        assert_that!(database.validate(), ok(anything()));
    }
}

// =========================================================================
// Lifecycle
// =========================================================================

#[test]
fn given_zero_stop_timeout_when_validate_then_error() {
    let lifecycle = LifecycleConfig {
        stop_timeout: Duration::ZERO,
        ..LifecycleConfig::default()
    };

    assert_that!(lifecycle.validate(), err(anything()));
}

#[test]
fn given_task_grace_not_above_forced_close_when_validate_then_error() {
    for task_grace in [Duration::from_secs(1), Duration::from_secs(3)] {
        // Given
        let lifecycle = LifecycleConfig {
            forced_close_after: Duration::from_secs(3),
            task_grace,
            ..LifecycleConfig::default()
        };

        // When
        let result = lifecycle.validate();

        // Then
        assert_that!(
            matches!(result, Err(ConfigError::Generic { .. })),
            eq(true)
        );
    }
}

#[test]
fn given_default_lifecycle_when_validate_then_ok() {
    assert_that!(LifecycleConfig::default().validate(), ok(anything()));
}

#[test]
fn given_invalid_section_when_config_validate_then_error_surfaces() {
    // Given
    let mut config = Config::default();
    config.lifecycle.task_grace = Duration::ZERO;

    // When / Then
    assert_that!(config.validate(), err(anything()));
}
