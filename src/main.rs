//! Floating IP failover controller (v1)
//!
//! Keeps a shared floating IP on whichever of two droplets, a main and a
//! standby, is healthy.
//!
//! # Architecture Overview
//!
//! ```text
//!   env / flags / TOML ──▶ config ──▶ ControllerConfig
//!                                           │
//!                                           ▼
//!        ┌──────────────────── FailoverController ────────────────────┐
//!        │  every poll interval:                                      │
//!        │   kick ──▶ watchdog (own task, exits process on stall)     │
//!        │   probe ─▶ health::HttpProbe (self, then main if standby)  │
//!        │   query ─▶ ownership::DigitalOceanClient ─▶ acquire        │
//!        └────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Exit behaviour
//! - mode unset: logs and exits 0
//! - invalid configuration: exits non-zero before any cycle
//! - SIGINT/SIGTERM: stops between cycles, exits 0
//! - watchdog trip: logs and exits 1

use std::sync::Arc;

use clap::Parser;

use floating_failover::config::loader::finalize;
use floating_failover::config::validation::worst_case_kick_gap;
use floating_failover::config::{ConfigArgs, Validated};
use floating_failover::failover::FailoverController;
use floating_failover::health::HttpProbe;
use floating_failover::lifecycle::{Shutdown, Watchdog};
use floating_failover::observability::{logging, metrics};
use floating_failover::ownership::DigitalOceanClient;

#[derive(Parser)]
#[command(name = "floating-failover", version)]
#[command(about = "Moves a floating IP between a main and a standby server", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    /// Default log level when RUST_LOG is unset.
    #[arg(long, env = "FAILOVER_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level);

    tracing::info!("floating-failover v{} starting", env!("CARGO_PKG_VERSION"));

    let settings = cli
        .config
        .settings()
        .inspect_err(|e| tracing::error!(error = %e, "Failed to load configuration"))?;
    let config = match finalize(&settings)
        .inspect_err(|e| tracing::error!(error = %e, "Invalid configuration"))?
    {
        Validated::Disabled => {
            tracing::info!("Not set up for automatic failover, exiting");
            return Ok(());
        }
        Validated::Enabled(config) => *config,
    };

    tracing::info!(
        role = %config.controller.role(),
        floating_ip = %config.controller.resource_id,
        "Configuration loaded"
    );

    let worst_gap = worst_case_kick_gap(&settings);
    if config.controller.watchdog_timeout < worst_gap {
        tracing::warn!(
            watchdog_timeout_secs = config.controller.watchdog_timeout.as_secs(),
            worst_case_secs = worst_gap.as_secs(),
            "Watchdog timeout is shorter than the slowest possible cycle; slow cycles will kill the process"
        );
    }

    if let Some(addr) = config.metrics_address {
        metrics::init_metrics(addr)?;
    }

    let probe = HttpProbe::new(config.probe_timeout)?;
    let ownership = DigitalOceanClient::new(&config.authority, config.api_key.clone())?;
    let watchdog = Watchdog::new(config.controller.watchdog_timeout, Arc::new(on_watchdog_timeout));

    let shutdown = Shutdown::new();
    let stop = shutdown.subscribe();
    shutdown.trigger_on_signal();

    let mut controller = FailoverController::new(config.controller, probe, ownership, watchdog);
    controller
        .run(stop)
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Failover controller stopped"))?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn on_watchdog_timeout() {
    tracing::error!("Watchdog timeout! The controller loop has stalled, exiting");
    std::process::exit(1);
}
