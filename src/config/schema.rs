//! Configuration schema definitions.
//!
//! [`FailoverSettings`] is the raw, all-optional shape read from a TOML file
//! and overlaid with flags/environment variables. Validation turns it into a
//! [`RuntimeConfig`] whose [`ControllerConfig`] is immutable for the rest of
//! the process.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::health::EndpointSet;

/// Raw failover settings before validation.
#[derive(Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct FailoverSettings {
    /// "main", "standby", or unset to disable failover.
    pub mode: Option<String>,

    /// API token for the ownership authority.
    pub api_key: Option<String>,

    /// The shared floating IP.
    pub floating_ip: Option<String>,

    /// Pipe-delimited URLs checked to decide whether this node is healthy.
    pub check_urls: Option<String>,

    /// Pipe-delimited URLs of the main node (checked by the standby).
    pub main_urls: Option<String>,

    /// Host header sent with requests to `main_urls`.
    pub main_host: Option<String>,

    /// Poll and timeout settings.
    pub timing: TimingConfig,

    /// Ownership authority endpoints.
    pub authority: AuthorityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl std::fmt::Debug for FailoverSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FailoverSettings")
            .field("mode", &self.mode)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("floating_ip", &self.floating_ip)
            .field("check_urls", &self.check_urls)
            .field("main_urls", &self.main_urls)
            .field("main_host", &self.main_host)
            .field("timing", &self.timing)
            .field("authority", &self.authority)
            .field("observability", &self.observability)
            .finish()
    }
}

/// Cycle and timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Pause between controller cycles in seconds.
    pub poll_interval_secs: u64,

    /// Per-URL health check timeout in seconds.
    pub probe_timeout_secs: u64,

    /// Seconds without progress before the watchdog kills the process.
    pub watchdog_timeout_secs: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 60,
            probe_timeout_secs: 20,
            watchdog_timeout_secs: 180,
        }
    }
}

/// Ownership authority configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthorityConfig {
    /// Base URL of the cloud API.
    pub api_base_url: String,

    /// Instance metadata document URL.
    pub metadata_url: String,

    /// Request timeout for authority and metadata calls in seconds.
    pub request_timeout_secs: u64,
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.digitalocean.com".to_string(),
            metadata_url: "http://169.254.169.254/metadata/v1.json".to_string(),
            request_timeout_secs: 20,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Prometheus listener address. Metrics are not exported when unset.
    pub metrics_address: Option<String>,
}

/// Fixed operational role of this node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Preferred holder; reclaims the resource whenever healthy.
    Main,
    /// Takes over only when the main looks down.
    Standby,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Main => "main",
            Role::Standby => "standby",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role together with what that role needs to run.
///
/// A standby without a peer set cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleConfig {
    Main,
    Standby { peer: EndpointSet },
}

impl RoleConfig {
    pub fn role(&self) -> Role {
        match self {
            RoleConfig::Main => Role::Main,
            RoleConfig::Standby { .. } => Role::Standby,
        }
    }

    /// The peer's endpoints, present only for the standby.
    pub fn peer(&self) -> Option<&EndpointSet> {
        match self {
            RoleConfig::Main => None,
            RoleConfig::Standby { peer } => Some(peer),
        }
    }
}

/// Immutable controller configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    pub role: RoleConfig,
    /// Identifier of the shared resource (the floating IP).
    pub resource_id: String,
    pub self_check: EndpointSet,
    pub poll_interval: Duration,
    pub watchdog_timeout: Duration,
}

impl ControllerConfig {
    pub fn role(&self) -> Role {
        self.role.role()
    }
}

/// Everything the daemon needs once validation has passed.
#[derive(Clone)]
pub struct RuntimeConfig {
    pub controller: ControllerConfig,
    pub api_key: String,
    pub authority: AuthorityConfig,
    pub probe_timeout: Duration,
    pub metrics_address: Option<std::net::SocketAddr>,
}

impl std::fmt::Debug for RuntimeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeConfig")
            .field("controller", &self.controller)
            .field("api_key", &"<redacted>")
            .field("authority", &self.authority)
            .field("probe_timeout", &self.probe_timeout)
            .field("metrics_address", &self.metrics_address)
            .finish()
    }
}

/// Outcome of validating [`FailoverSettings`].
#[derive(Debug, Clone)]
pub enum Validated {
    /// No mode configured: the process should exit cleanly.
    Disabled,
    Enabled(Box<RuntimeConfig>),
}
