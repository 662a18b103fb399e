//! tickbeacon host binary
//!
//! Trivial collaborator around the core: parses arguments, initializes
//! logging, constructs the peripheral service exactly once and lets it run.
//! Process termination is the only teardown path.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};

use tickbeacon_core::{radio_event_channel, PeripheralConfig, PeripheralService, TimedGrantProvider};
use tickbeacon_ble::PlatformRadio;

#[derive(Parser)]
#[command(author, version, about = "Write-triggered BLE counting peripheral")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Delay before the first tick, in seconds
    #[arg(long, default_value_t = 15)]
    initial_delay_secs: u64,

    /// Delay between ticks, in milliseconds
    #[arg(long, default_value_t = 100)]
    tick_interval_ms: u64,

    /// Number of ticks per counting run
    #[arg(long, default_value_t = 20)]
    max_count: u32,

    /// Background execution grant duration, in seconds
    #[arg(long, default_value_t = 180)]
    grant_secs: u64,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let config = PeripheralConfig::new()
        .with_initial_delay(Duration::from_secs(cli.initial_delay_secs))
        .with_tick_interval(Duration::from_millis(cli.tick_interval_ms))
        .with_max_count(cli.max_count)
        .with_grant_duration(Duration::from_secs(cli.grant_secs));

    let (events_tx, events_rx) = radio_event_channel();
    let mut radio = PlatformRadio::new(events_tx);
    if let Err(e) = radio.start().await {
        error!("failed to start radio backend: {}", e);
        std::process::exit(1);
    }

    let grants = Arc::new(TimedGrantProvider::new(config.grant_duration));
    let (service, _progress) = PeripheralService::new(radio, grants, config);

    tokio::select! {
        _ = service.run(events_rx) => {}
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted, exiting");
        }
    }
}

/// Timestamped log lines: `[YYYY-MM-DD HH:mm:ss.SSS] <message>`.
fn setup_logging(verbose: bool) {
    let log_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::new(
            "[%Y-%m-%d %H:%M:%S%.3f]".to_owned(),
        ))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
