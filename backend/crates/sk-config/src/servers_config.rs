use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_ALLOW_ORIGIN, DEFAULT_API_ADDR, DEFAULT_API_TIMEOUT,
    DEFAULT_AUX_TIMEOUT, DEFAULT_DIAGNOSTICS_ADDR, DEFAULT_METRICS_ADDR,
};

use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServersConfig {
    /// Skip the metrics and diagnostics servers (avoids port conflicts in dev setups)
    pub disable_auxiliary: bool,
    pub api: ApiServerConfig,
    pub metrics: AuxServerConfig,
    pub diagnostics: AuxServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiServerConfig {
    pub addr: String,
    #[serde(deserialize_with = "crate::duration::deserialize")]
    pub read_timeout: Duration,
    #[serde(deserialize_with = "crate::duration::deserialize")]
    pub write_timeout: Duration,
    pub allow_origin: String,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            addr: String::from(DEFAULT_API_ADDR),
            read_timeout: DEFAULT_API_TIMEOUT,
            write_timeout: DEFAULT_API_TIMEOUT,
            allow_origin: String::from(DEFAULT_ALLOW_ORIGIN),
        }
    }
}

/// Metrics / diagnostics listener settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuxServerConfig {
    pub addr: String,
    #[serde(deserialize_with = "crate::duration::deserialize")]
    pub read_timeout: Duration,
    #[serde(deserialize_with = "crate::duration::deserialize")]
    pub write_timeout: Duration,
}

impl Default for AuxServerConfig {
    fn default() -> Self {
        Self {
            addr: String::new(),
            read_timeout: DEFAULT_AUX_TIMEOUT,
            write_timeout: DEFAULT_AUX_TIMEOUT,
        }
    }
}

impl ServersConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        validate_addr("servers.api.addr", &self.api.addr)?;
        validate_timeouts("servers.api", self.api.read_timeout, self.api.write_timeout)?;

        if self.disable_auxiliary {
            return Ok(());
        }

        validate_addr("servers.metrics.addr", &self.metrics_addr())?;
        validate_addr("servers.diagnostics.addr", &self.diagnostics_addr())?;
        validate_timeouts(
            "servers.metrics",
            self.metrics.read_timeout,
            self.metrics.write_timeout,
        )?;
        validate_timeouts(
            "servers.diagnostics",
            self.diagnostics.read_timeout,
            self.diagnostics.write_timeout,
        )?;

        let addrs = [
            self.api.addr.clone(),
            self.metrics_addr(),
            self.diagnostics_addr(),
        ];
        for (i, addr) in addrs.iter().enumerate() {
            // Port 0 is OS-assigned and never collides
            if port_of(addr) == Some(0) {
                continue;
            }
            if addrs[i + 1..].contains(addr) {
                return Err(ConfigError::server(format!(
                    "address {} is assigned to more than one server",
                    addr
                )));
            }
        }

        Ok(())
    }

    pub fn metrics_addr(&self) -> String {
        if self.metrics.addr.is_empty() {
            String::from(DEFAULT_METRICS_ADDR)
        } else {
            self.metrics.addr.clone()
        }
    }

    pub fn diagnostics_addr(&self) -> String {
        if self.diagnostics.addr.is_empty() {
            String::from(DEFAULT_DIAGNOSTICS_ADDR)
        } else {
            self.diagnostics.addr.clone()
        }
    }
}

fn port_of(addr: &str) -> Option<u16> {
    addr.rsplit_once(':')
        .and_then(|(_, port)| port.parse::<u16>().ok())
}

fn validate_addr(key: &str, addr: &str) -> ConfigErrorResult<()> {
    match addr.rsplit_once(':') {
        Some((host, _)) if !host.is_empty() && port_of(addr).is_some() => Ok(()),
        _ => Err(ConfigError::invalid_value(key, "host:port")),
    }
}

fn validate_timeouts(prefix: &str, read: Duration, write: Duration) -> ConfigErrorResult<()> {
    if read.is_zero() || write.is_zero() {
        return Err(ConfigError::server(format!(
            "{}.read_timeout and {}.write_timeout must be greater than zero",
            prefix, prefix
        )));
    }

    Ok(())
}
