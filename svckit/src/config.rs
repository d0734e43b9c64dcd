use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Credentials and session persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
    pub login_delay_ms: u64,
    pub storage_path: String,
}

impl AuthConfig {
    pub fn login_delay(&self) -> Duration {
        Duration::from_millis(self.login_delay_ms)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            username: "telkom_admin".to_string(),
            password: "123".to_string(),
            login_delay_ms: 1_000,
            storage_path: ".infra-dash/storage.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub log_file: String,
    pub dump_metrics_on_exit: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_file: "infra-dash.log".to_string(),
            dump_metrics_on_exit: false,
        }
    }
}
