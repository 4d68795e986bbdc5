//! HTTP health probing.
//!
//! # Responsibilities
//! - GET every URL of an [`EndpointSet`] with a bounded timeout
//! - Apply the set's `Host` override to each request
//! - Reduce the results to a single boolean
//!
//! # Design Decisions
//! - A failed probe is a routine event: it is logged and reported as `false`,
//!   never returned as an error
//! - Stops at the first failing URL, the outcome is already decided

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HOST, USER_AGENT};
use tokio::time;

use crate::health::endpoints::EndpointSet;

const PROBE_USER_AGENT: &str = "floating-failover-health-check";

/// Evaluates an [`EndpointSet`] to healthy or unhealthy.
pub trait HealthProbe: Send + Sync {
    /// Returns `true` only if every URL in the set answered successfully.
    fn check(&self, endpoints: &EndpointSet) -> impl Future<Output = bool> + Send;
}

impl<T: HealthProbe> HealthProbe for Arc<T> {
    fn check(&self, endpoints: &EndpointSet) -> impl Future<Output = bool> + Send {
        (**self).check(endpoints)
    }
}

/// [`HealthProbe`] backed by plain HTTP GET requests.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpProbe {
    /// Create a probe whose requests each time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(0)
            .build()?;
        Ok(Self { client, timeout })
    }

    async fn check_url(&self, url: &url::Url, host: Option<&str>) -> bool {
        let mut request = self
            .client
            .get(url.clone())
            .header(USER_AGENT, PROBE_USER_AGENT);
        if let Some(host) = host {
            request = request.header(HOST, host);
        }

        match time::timeout(self.timeout, request.send()).await {
            Ok(Ok(response)) => {
                let success = response.status().is_success();
                if !success {
                    tracing::error!(url = %url, status = %response.status(), "Health check failed: non-success status");
                }
                success
            }
            Ok(Err(e)) if e.is_timeout() => {
                tracing::error!(url = %url, "Health check failed: timeout");
                false
            }
            Ok(Err(e)) => {
                tracing::error!(url = %url, error = %e, "Health check failed: connection error");
                false
            }
            Err(_) => {
                tracing::error!(url = %url, "Health check failed: timeout");
                false
            }
        }
    }
}

impl HealthProbe for HttpProbe {
    async fn check(&self, endpoints: &EndpointSet) -> bool {
        for url in endpoints.urls() {
            if !self.check_url(url, endpoints.host()).await {
                return false;
            }
            tracing::trace!(url = %url, "Health check passed");
        }
        true
    }
}
