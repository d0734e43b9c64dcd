// services/infra-dash/src/config.rs
//
// Layered configuration: optional YAML file, then INFRA_DASH__* environment.

use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use svckit::config::{AuthConfig, ObservabilityConfig};
use svckit::InfraError;
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub auth: AuthConfig,
    pub refresh: RefreshConfig,
    pub observability: ObservabilityConfig,
}

/// Cadences of the simulated feeds, in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    pub ui_tick_ms: u64,
    pub clock_ms: u64,
    pub monitoring_ms: u64,
    pub orders_ms: u64,
    pub analytics_ms: u64,
    pub sync_clock_ms: u64,
    pub discovery_ms: u64,
    pub bulk_step_ms: u64,
    pub bulk_step: u8,
    pub counter_ms: u64,
    pub reload_ms: u64,
    pub apply_ms: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            ui_tick_ms: 100,
            clock_ms: 1_000,
            monitoring_ms: 2_000,
            orders_ms: 5_000,
            analytics_ms: 5_000,
            sync_clock_ms: 30_000,
            discovery_ms: 3_000,
            bulk_step_ms: 200,
            bulk_step: 10,
            counter_ms: 50,
            reload_ms: 1_000,
            apply_ms: 3_000,
        }
    }
}

impl RefreshConfig {
    pub fn every(ms: u64) -> Duration {
        Duration::from_millis(ms.max(1))
    }
}

pub fn load_config(path: &str) -> Result<DashboardConfig> {
    let present = Path::new(path).exists();
    let config = Config::builder()
        .add_source(File::with_name(path).required(false))
        .add_source(Environment::with_prefix("INFRA_DASH").separator("__").try_parsing(true))
        .build()
        .map_err(|e| InfraError::Config(e.to_string()))?;

    let config: DashboardConfig = config
        .try_deserialize()
        .map_err(|e| InfraError::Config(format!("{}: {}", path, e)))?;
    if present {
        info!("Loaded configuration from {}", path);
    } else {
        info!("No configuration file at {}, using defaults", path);
    }
    Ok(config)
}
