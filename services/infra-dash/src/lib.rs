// services/infra-dash/src/lib.rs
//
// Telkom infrastructure management console rendered in the terminal.

pub mod app;
pub mod config;
pub mod filter;
pub mod mock;
pub mod notifications;
pub mod progress;
pub mod refresh;
pub mod router;
pub mod selection;
pub mod session;
pub mod ui;
pub mod views;

pub use app::App;
pub use config::{load_config, DashboardConfig, RefreshConfig};
