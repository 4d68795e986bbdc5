//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::{FailoverSettings, Validated};
use crate::config::validation::{validate_settings, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Read raw settings from a TOML file without validating them.
pub fn load_settings(path: &Path) -> Result<FailoverSettings, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_settings(&content)
}

/// Parse raw settings from TOML text.
pub fn parse_settings(content: &str) -> Result<FailoverSettings, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Validate settings, collapsing all violations into one [`ConfigError`].
pub fn finalize(settings: &FailoverSettings) -> Result<Validated, ConfigError> {
    validate_settings(settings).map_err(ConfigError::Validation)
}
