//! Main/standby failover controller.
//!
//! # Cycle
//! ```text
//! kick watchdog
//!     → probe self ── unhealthy ──▶ do nothing (never grab traffic we can't serve)
//!     → query ownership ── owned ──▶ do nothing
//!     → main:    acquire
//!     → standby: probe peer ── healthy ──▶ do nothing
//!                          └─ unhealthy ─▶ acquire
//! sleep poll interval
//! ```
//!
//! # Design Decisions
//! - Ownership is queried fresh every cycle, never cached
//! - No retries inside a cycle; the next cycle is the retry
//! - Authority errors end the cycle, not the controller
//! - Hangs are the watchdog's job, not the loop's

use tokio::sync::broadcast;
use tokio::time;

use thiserror::Error;

use crate::config::schema::{ControllerConfig, RoleConfig};
use crate::health::HealthProbe;
use crate::lifecycle::watchdog::{Watchdog, WatchdogError};
use crate::observability::metrics;
use crate::ownership::{OwnershipClient, OwnershipError};

/// What a single cycle decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// This node failed its own health check; no ownership action taken.
    SelfUnhealthy,
    /// This node already holds the resource.
    Holding,
    /// Standby only: the main looks healthy and is presumed in control.
    PeerHealthy,
    /// An acquire request was accepted.
    Acquired,
}

impl CycleOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            CycleOutcome::SelfUnhealthy => "self_unhealthy",
            CycleOutcome::Holding => "holding",
            CycleOutcome::PeerHealthy => "peer_healthy",
            CycleOutcome::Acquired => "acquired",
        }
    }
}

/// Errors that end a controller run.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("failed to arm watchdog: {0}")]
    Watchdog(#[from] WatchdogError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Stopped,
    Running,
}

/// Drives the failover decision on a fixed cadence.
pub struct FailoverController<P, O> {
    config: ControllerConfig,
    probe: P,
    ownership: O,
    watchdog: Watchdog,
    state: ControllerState,
}

impl<P, O> FailoverController<P, O>
where
    P: HealthProbe,
    O: OwnershipClient,
{
    /// The watchdog is owned by the controller and armed only while it runs.
    pub fn new(config: ControllerConfig, probe: P, ownership: O, watchdog: Watchdog) -> Self {
        Self {
            config,
            probe,
            ownership,
            watchdog,
            state: ControllerState::Stopped,
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Run cycles until `shutdown` fires.
    ///
    /// Shutdown is honoured between cycles; an in-flight cycle is never
    /// cancelled.
    pub async fn run(&mut self, mut shutdown: broadcast::Receiver<()>) -> Result<(), ControllerError> {
        self.watchdog.start()?;
        self.state = ControllerState::Running;

        let role = self.config.role();
        tracing::info!(
            role = %role,
            floating_ip = %self.config.resource_id,
            check = %self.config.self_check,
            poll_interval_secs = self.config.poll_interval.as_secs(),
            watchdog_timeout_secs = self.watchdog.timeout().as_secs(),
            "Failover controller running"
        );

        loop {
            self.watchdog.kick();

            match self.run_cycle().await {
                Ok(outcome) => metrics::record_cycle(role.as_str(), outcome.as_str()),
                Err(e) => {
                    tracing::error!(role = %role, floating_ip = %self.config.resource_id, error = %e, "Cycle aborted, retrying next interval");
                    metrics::record_ownership_error(e.kind());
                    metrics::record_cycle(role.as_str(), "error");
                }
            }

            tokio::select! {
                _ = time::sleep(self.config.poll_interval) => {}
                _ = shutdown.recv() => {
                    tracing::info!("Failover controller received shutdown signal, exiting loop");
                    break;
                }
            }
        }

        self.watchdog.stop();
        self.state = ControllerState::Stopped;
        Ok(())
    }

    /// Evaluate health and ownership once and act on the result.
    pub async fn run_cycle(&self) -> Result<CycleOutcome, OwnershipError> {
        let role = self.config.role();
        let floating_ip = self.config.resource_id.as_str();

        let healthy = self.probe.check(&self.config.self_check).await;
        metrics::record_self_health(healthy);
        if !healthy {
            tracing::error!(role = %role, "Service not running, leaving the floating IP alone");
            return Ok(CycleOutcome::SelfUnhealthy);
        }

        let owned = self.ownership.is_owned_by_this_node(floating_ip).await?;
        metrics::record_ownership(owned);
        if owned {
            tracing::debug!(role = %role, floating_ip, "We're in control of the floating IP");
            return Ok(CycleOutcome::Holding);
        }

        match &self.config.role {
            RoleConfig::Main => {
                tracing::info!(floating_ip, "Lost control of the floating IP, getting it back");
            }
            RoleConfig::Standby { peer } => {
                if self.probe.check(peer).await {
                    tracing::debug!(main = %peer, "Main server up and running");
                    return Ok(CycleOutcome::PeerHealthy);
                }
                tracing::warn!(main = %peer, floating_ip, "Main server is down, taking over");
            }
        }

        self.ownership.acquire(floating_ip).await?;
        metrics::record_acquisition(role.as_str());
        metrics::record_ownership(true);
        Ok(CycleOutcome::Acquired)
    }
}
