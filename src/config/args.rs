//! Command-line and environment overrides.
//!
//! Each flag also reads the environment variable the controller has always
//! been configured with, so a plain `FAILOVER_MODE=main API_KEY=...` setup
//! keeps working without a config file.

use std::path::PathBuf;

use clap::Args;

use crate::config::loader::{finalize, load_settings, ConfigError};
use crate::config::schema::{FailoverSettings, Validated};

#[derive(Debug, Clone, Default, Args)]
pub struct ConfigArgs {
    /// Optional TOML config file; flags and environment take precedence.
    #[arg(short, long, env = "FAILOVER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Failover mode: "main" or "standby". Unset disables failover.
    #[arg(long, env = "FAILOVER_MODE")]
    pub mode: Option<String>,

    /// Cloud API token.
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// The floating IP shared by main and standby.
    #[arg(long, env = "FLOATING_IP")]
    pub floating_ip: Option<String>,

    /// Local URL(s) deciding this server's health, split by '|'.
    #[arg(long, env = "FAILOVER_CHECK")]
    pub check_urls: Option<String>,

    /// URL(s) of the main server, split by '|'.
    #[arg(long, env = "FAILOVER_MAIN")]
    pub main_urls: Option<String>,

    /// Host header for requests to the main server's URLs.
    #[arg(long, env = "FAILOVER_MAIN_HOST")]
    pub main_host: Option<String>,

    /// Prometheus listener address (metrics are off when unset).
    #[arg(long, env = "FAILOVER_METRICS_ADDRESS")]
    pub metrics_address: Option<String>,
}

impl ConfigArgs {
    /// Load the config file (if any) and overlay flags/environment.
    pub fn settings(&self) -> Result<FailoverSettings, ConfigError> {
        let mut settings = match &self.config {
            Some(path) => load_settings(path)?,
            None => FailoverSettings::default(),
        };
        self.apply(&mut settings);
        Ok(settings)
    }

    /// Load, overlay and validate.
    pub fn resolve(&self) -> Result<Validated, ConfigError> {
        finalize(&self.settings()?)
    }

    fn apply(&self, settings: &mut FailoverSettings) {
        overlay(&mut settings.mode, &self.mode);
        overlay(&mut settings.api_key, &self.api_key);
        overlay(&mut settings.floating_ip, &self.floating_ip);
        overlay(&mut settings.check_urls, &self.check_urls);
        overlay(&mut settings.main_urls, &self.main_urls);
        overlay(&mut settings.main_host, &self.main_host);
        overlay(&mut settings.observability.metrics_address, &self.metrics_address);
    }
}

fn overlay(target: &mut Option<String>, value: &Option<String>) {
    if let Some(value) = value {
        *target = Some(value.clone());
    }
}
