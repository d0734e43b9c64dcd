// services/infra-dash/src/main.rs
//
// Terminal console for Telkom infrastructure operations
//
// Run with: cargo run --bin infra-dash -- --ephemeral

use std::fs::OpenOptions;
use std::io::stdout;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, Event},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use svckit::config::ObservabilityConfig;
use svckit::{metrics, FileStore, InfraError, KeyValueStore, MemoryStore};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use infra_dash::{load_config, mock, App, RefreshConfig};

#[derive(Parser, Debug)]
#[command(name = "infra-dash")]
#[command(about = "Terminal console for Telkom infrastructure operations")]
#[command(version = "0.1.0")]
struct Args {
    #[arg(short, long, default_value = "config/infra-dash.yaml")]
    config: String,

    /// Keep the session in memory instead of the storage file
    #[arg(long)]
    ephemeral: bool,

    /// Print every fixture collection as JSON and exit
    #[arg(long)]
    dump_fixtures: bool,

    /// Redraw interval in milliseconds (overrides refresh.ui_tick_ms)
    #[arg(long)]
    tick_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = load_config(&args.config)?;
    if let Some(ms) = args.tick_ms {
        config.refresh.ui_tick_ms = ms;
    }

    if args.dump_fixtures {
        println!("{}", serde_json::to_string_pretty(&mock::fixture_dump())?);
        return Ok(());
    }

    // The terminal belongs to the UI, so logs go to a file.
    init_tracing(&config.observability)?;
    info!("Starting infra-dash with configuration {}", args.config);

    let storage: Arc<dyn KeyValueStore> = if args.ephemeral {
        info!("Using in-memory session storage");
        Arc::new(MemoryStore::new())
    } else {
        let store = FileStore::open(&config.auth.storage_path)?;
        info!("Session storage at {}", store.path().display());
        Arc::new(store)
    };

    let mut app = App::new(&config, storage);

    // Setup terminal
    enable_raw_mode().map_err(terminal_error)?;
    let result = stdout()
        .execute(EnterAlternateScreen)
        .and_then(|_| Terminal::new(CrosstermBackend::new(stdout())))
        .map_err(|e| anyhow::Error::from(terminal_error(e)))
        .and_then(|mut terminal| {
            run_app(&mut terminal, &mut app, RefreshConfig::every(config.refresh.ui_tick_ms))
        });

    // Restore terminal even when setup or the loop failed
    let restored = restore_terminal();

    app.shutdown();
    if config.observability.dump_metrics_on_exit {
        match metrics::render() {
            Ok(text) => info!("Metrics at exit:\n{}", text),
            Err(e) => warn!("Could not render metrics: {}", e),
        }
    }
    if let Err(e) = &result {
        warn!("Dashboard stopped with error: {}", e);
    }
    result?;
    restored.map_err(Into::into)
}

fn terminal_error(err: std::io::Error) -> InfraError {
    InfraError::Terminal(err.to_string())
}

/// Runs every restore step and reports the first failure.
fn restore_terminal() -> Result<(), InfraError> {
    let raw = disable_raw_mode();
    let screen = stdout().execute(LeaveAlternateScreen).map(|_| ());
    raw.and(screen).map_err(terminal_error)
}

fn init_tracing(observability: &ObservabilityConfig) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&observability.log_file)?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("infra_dash={0},svckit={0}", observability.log_level))),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .init();
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App, tick_rate: Duration) -> Result<()> {
    let mut last_tick = Instant::now();

    while app.is_running() {
        terminal.draw(|frame| app.draw(frame))?;

        // Blocking poll; feed timers keep running on the other workers.
        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if tokio::task::block_in_place(|| event::poll(timeout))? {
            if let Event::Key(key) = event::read()? {
                app.on_key(key);
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            last_tick = Instant::now();
        }
    }
    Ok(())
}
