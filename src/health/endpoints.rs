//! Health check targets.
//!
//! An [`EndpointSet`] is one logical health target: every URL in it must
//! answer successfully for the target to count as healthy. Sets are parsed
//! from the pipe-delimited form used by the configuration
//! (`http://a/health|http://b/health`).

use std::fmt;

use thiserror::Error;
use url::Url;

/// Errors produced while parsing an endpoint list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EndpointError {
    /// The list contained no URLs after splitting and trimming.
    #[error("no URLs given")]
    Empty,

    /// A URL failed to parse.
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// A URL parsed but is not http or https.
    #[error("unsupported scheme in '{url}' (expected http or https)")]
    UnsupportedScheme { url: String },
}

/// An immutable set of URLs checked together, with an optional `Host`
/// header override applied to every request in the set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointSet {
    urls: Vec<Url>,
    host: Option<String>,
}

impl EndpointSet {
    /// Build a set from already-parsed URLs.
    pub fn new(urls: Vec<Url>, host: Option<String>) -> Result<Self, EndpointError> {
        if urls.is_empty() {
            return Err(EndpointError::Empty);
        }
        if let Some(url) = urls.iter().find(|u| !matches!(u.scheme(), "http" | "https")) {
            return Err(EndpointError::UnsupportedScheme {
                url: url.to_string(),
            });
        }
        let host = host.filter(|h| !h.trim().is_empty());
        Ok(Self { urls, host })
    }

    /// Parse a pipe-delimited URL list.
    ///
    /// Whitespace around each entry is ignored, as are empty entries, so
    /// `"a| b |"` yields two URLs.
    pub fn parse(raw: &str, host: Option<String>) -> Result<Self, EndpointError> {
        let urls = split_list(raw)
            .map(|entry| {
                Url::parse(entry).map_err(|e| EndpointError::InvalidUrl {
                    url: entry.to_string(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(urls, host)
    }

    pub fn urls(&self) -> &[Url] {
        &self.urls
    }

    /// The `Host` header override, if any.
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

}

impl fmt::Display for EndpointSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, url) in self.urls.iter().enumerate() {
            if i > 0 {
                write!(f, "|")?;
            }
            write!(f, "{}", url)?;
        }
        if let Some(host) = &self.host {
            write!(f, " (Host: {})", host)?;
        }
        Ok(())
    }
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split('|').map(str::trim).filter(|s| !s.is_empty())
}
