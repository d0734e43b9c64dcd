use lazy_static::lazy_static;
use prometheus::{
    register_int_counter_vec, register_int_gauge_vec, Encoder, IntCounterVec, IntGaugeVec,
    TextEncoder,
};

use crate::errors::InfraError;

lazy_static! {
    pub static ref LOGIN_ATTEMPTS: IntCounterVec = register_int_counter_vec!(
        "login_attempts_total",
        "Login attempts by outcome",
        &["outcome"]
    ).expect("login_attempts_total registers once");

    pub static ref REFRESH_TICKS: IntCounterVec = register_int_counter_vec!(
        "refresh_ticks_total",
        "Refresh timer ticks by task and whether the tick mutated state",
        &["task", "outcome"]
    ).expect("refresh_ticks_total registers once");

    pub static ref ACTIVE_TASKS: IntGaugeVec = register_int_gauge_vec!(
        "active_tasks",
        "Background tasks currently owned by a mounted view",
        &["task"]
    ).expect("active_tasks registers once");
}

pub fn record_login(success: bool) {
    let outcome = if success { "success" } else { "failure" };
    LOGIN_ATTEMPTS.with_label_values(&[outcome]).inc();
}

pub fn record_tick(task: &str, applied: bool) {
    let outcome = if applied { "applied" } else { "skipped" };
    REFRESH_TICKS.with_label_values(&[task, outcome]).inc();
}

pub fn task_started(task: &str) {
    ACTIVE_TASKS.with_label_values(&[task]).inc();
}

pub fn task_stopped(task: &str) {
    ACTIVE_TASKS.with_label_values(&[task]).dec();
}

/// Text exposition of everything in the default registry.
pub fn render() -> Result<String, InfraError> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&prometheus::gather(), &mut buffer)
        .map_err(|e| InfraError::Unknown(format!("metrics encoding failed: {}", e)))?;
    String::from_utf8(buffer).map_err(|e| InfraError::Unknown(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_includes_recorded_series() {
        record_login(false);
        record_tick("metrics-test", true);
        let text = render().unwrap();
        assert!(text.contains("login_attempts_total"));
        assert!(text.contains("task=\"metrics-test\""));
    }
}
