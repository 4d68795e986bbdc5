//! Configuration validation.
//!
//! # Responsibilities
//! - Resolve the failover mode (disabled, main, standby)
//! - Check required settings for the selected mode
//! - Parse endpoint lists and value ranges
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: FailoverSettings → Validated
//! - Runs once before the controller starts; nothing is re-validated per cycle

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use crate::config::schema::{
    ControllerConfig, FailoverSettings, RoleConfig, RuntimeConfig, TimingConfig, Validated,
};
use crate::health::{EndpointError, EndpointSet};

/// Upper bound for every configured duration: one day.
pub const MAX_DURATION_SECS: u64 = 24 * 60 * 60;

/// A single violated configuration rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unsupported failover mode '{0}' (expected 'main' or 'standby')")]
    UnknownMode(String),

    #[error("missing required setting '{0}'")]
    Missing(&'static str),

    #[error("invalid '{field}': {source}")]
    Endpoints {
        field: &'static str,
        source: EndpointError,
    },

    #[error("'{0}' must be greater than zero")]
    ZeroDuration(&'static str),

    #[error("'{field}' must not exceed {max_secs}s (got {secs}s)")]
    DurationTooLarge {
        field: &'static str,
        secs: u64,
        max_secs: u64,
    },

    #[error("watchdog timeout ({watchdog_secs}s) must exceed the poll interval ({poll_secs}s)")]
    WatchdogTooShort { watchdog_secs: u64, poll_secs: u64 },

    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),
}

/// Validate raw settings.
pub fn validate_settings(settings: &FailoverSettings) -> Result<Validated, Vec<ValidationError>> {
    let mode = match non_blank(&settings.mode) {
        None => return Ok(Validated::Disabled),
        Some(mode) => mode.to_ascii_lowercase(),
    };

    let mut errors = Vec::new();

    let is_main = match mode.as_str() {
        "main" => true,
        "standby" => false,
        _ => {
            errors.push(ValidationError::UnknownMode(mode.clone()));
            false
        }
    };

    let api_key = non_blank(&settings.api_key);
    if api_key.is_none() {
        errors.push(ValidationError::Missing("api_key"));
    }
    let floating_ip = non_blank(&settings.floating_ip);
    if floating_ip.is_none() {
        errors.push(ValidationError::Missing("floating_ip"));
    }

    let main_urls = non_blank(&settings.main_urls);

    // The main checks itself through its public URLs when they are known.
    let check_urls = match (is_main, main_urls) {
        (true, Some(urls)) => Some(urls),
        _ => non_blank(&settings.check_urls),
    };

    let self_check = match check_urls {
        Some(raw) => parse_endpoints("check_urls", raw, None, &mut errors),
        None => {
            errors.push(ValidationError::Missing("check_urls"));
            None
        }
    };

    let role = if is_main {
        Some(RoleConfig::Main)
    } else {
        match main_urls {
            Some(raw) => parse_endpoints("main_urls", raw, settings.main_host.clone(), &mut errors)
                .map(|peer| RoleConfig::Standby { peer }),
            None => {
                errors.push(ValidationError::Missing("main_urls"));
                None
            }
        }
    };

    validate_timing(&settings.timing, &mut errors);
    validate_duration("request_timeout_secs", settings.authority.request_timeout_secs, &mut errors);

    let metrics_address = match non_blank(&settings.observability.metrics_address) {
        Some(raw) => match raw.parse::<SocketAddr>() {
            Ok(addr) => Some(addr),
            Err(_) => {
                errors.push(ValidationError::MetricsAddress(raw.to_string()));
                None
            }
        },
        None => None,
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    // Every `None` below has pushed an error above.
    let (Some(role), Some(self_check), Some(api_key), Some(floating_ip)) =
        (role, self_check, api_key, floating_ip)
    else {
        return Err(vec![ValidationError::Missing("mode")]);
    };

    let timing = &settings.timing;
    let controller = ControllerConfig {
        role,
        resource_id: floating_ip.to_string(),
        self_check,
        poll_interval: Duration::from_secs(timing.poll_interval_secs),
        watchdog_timeout: Duration::from_secs(timing.watchdog_timeout_secs),
    };

    Ok(Validated::Enabled(Box::new(RuntimeConfig {
        controller,
        api_key: api_key.to_string(),
        authority: settings.authority.clone(),
        probe_timeout: Duration::from_secs(timing.probe_timeout_secs),
        metrics_address,
    })))
}

/// Longest expected gap between two watchdog kicks: one poll interval, a
/// self and a peer probe, and an ownership query plus an acquire.
pub fn worst_case_kick_gap(settings: &FailoverSettings) -> Duration {
    let timing = &settings.timing;
    Duration::from_secs(
        timing
            .poll_interval_secs
            .saturating_add(timing.probe_timeout_secs.saturating_mul(2))
            .saturating_add(settings.authority.request_timeout_secs.saturating_mul(2)),
    )
}

fn validate_timing(timing: &TimingConfig, errors: &mut Vec<ValidationError>) {
    validate_duration("poll_interval_secs", timing.poll_interval_secs, errors);
    validate_duration("probe_timeout_secs", timing.probe_timeout_secs, errors);
    if timing.watchdog_timeout_secs > MAX_DURATION_SECS {
        errors.push(ValidationError::DurationTooLarge {
            field: "watchdog_timeout_secs",
            secs: timing.watchdog_timeout_secs,
            max_secs: MAX_DURATION_SECS,
        });
    } else if timing.watchdog_timeout_secs <= timing.poll_interval_secs {
        errors.push(ValidationError::WatchdogTooShort {
            watchdog_secs: timing.watchdog_timeout_secs,
            poll_secs: timing.poll_interval_secs,
        });
    }
}

fn validate_duration(field: &'static str, secs: u64, errors: &mut Vec<ValidationError>) {
    if secs == 0 {
        errors.push(ValidationError::ZeroDuration(field));
    } else if secs > MAX_DURATION_SECS {
        errors.push(ValidationError::DurationTooLarge {
            field,
            secs,
            max_secs: MAX_DURATION_SECS,
        });
    }
}

fn parse_endpoints(
    field: &'static str,
    raw: &str,
    host: Option<String>,
    errors: &mut Vec<ValidationError>,
) -> Option<EndpointSet> {
    match EndpointSet::parse(raw, host) {
        Ok(set) => Some(set),
        Err(source) => {
            errors.push(ValidationError::Endpoints { field, source });
            None
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
