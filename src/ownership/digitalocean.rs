//! DigitalOcean floating IP client.
//!
//! # Responsibilities
//! - Resolve this droplet's id from the metadata service
//! - Query which droplet a floating IP is assigned to
//! - Request assignment of a floating IP to this droplet
//!
//! # Design Decisions
//! - Ownership is read from the public API, not from the metadata
//!   `floating_ip` section, which has been seen reporting "active" on both
//!   droplets at once
//! - The droplet id never changes for a running process and is cached after
//!   the first successful lookup; ownership is never cached

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use crate::config::schema::AuthorityConfig;
use crate::ownership::types::{OwnershipClient, OwnershipError, OwnershipResult};

/// Droplet metadata, reduced to the fields we read.
#[derive(Debug, Deserialize)]
struct DropletMetadata {
    droplet_id: u64,
}

#[derive(Debug, Deserialize)]
struct FloatingIpEnvelope {
    floating_ip: FloatingIp,
}

#[derive(Debug, Deserialize)]
struct FloatingIp {
    #[serde(default)]
    droplet: Option<Droplet>,
}

#[derive(Debug, Deserialize)]
struct Droplet {
    id: u64,
}

#[derive(Debug, Serialize)]
struct AssignAction {
    #[serde(rename = "type")]
    kind: &'static str,
    droplet_id: u64,
}

/// [`OwnershipClient`] for DigitalOcean floating IPs.
pub struct DigitalOceanClient {
    http: reqwest::Client,
    api_key: String,
    api_base_url: String,
    metadata_url: String,
    droplet_id: OnceCell<u64>,
}

impl DigitalOceanClient {
    /// Create a client for the given authority settings.
    pub fn new(config: &AuthorityConfig, api_key: impl Into<String>) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            metadata_url: config.metadata_url.clone(),
            droplet_id: OnceCell::new(),
        })
    }

    /// This droplet's id, looked up once and cached.
    pub async fn droplet_id(&self) -> OwnershipResult<u64> {
        self.droplet_id
            .get_or_try_init(|| self.fetch_droplet_id())
            .await
            .copied()
    }

    async fn fetch_droplet_id(&self) -> OwnershipResult<u64> {
        let response = self
            .http
            .get(&self.metadata_url)
            .send()
            .await
            .map_err(|e| unreachable_err("metadata request failed", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(OwnershipError::AuthorityUnreachable(format!(
                "metadata service returned {}",
                status
            )));
        }

        let metadata: DropletMetadata = response
            .json()
            .await
            .map_err(|e| unreachable_err("invalid metadata response", e))?;

        tracing::info!(droplet_id = metadata.droplet_id, "Resolved droplet identity");
        Ok(metadata.droplet_id)
    }

    fn floating_ip_url(&self, ip: &str) -> String {
        format!("{}/v2/floating_ips/{}", self.api_base_url, ip)
    }
}

impl OwnershipClient for DigitalOceanClient {
    async fn is_owned_by_this_node(&self, resource_id: &str) -> OwnershipResult<bool> {
        let droplet_id = self.droplet_id().await?;

        let response = self
            .http
            .get(self.floating_ip_url(resource_id))
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| unreachable_err("floating IP lookup failed", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(OwnershipError::AuthorityUnreachable(format!(
                "floating IP lookup for {} returned {}",
                resource_id, status
            )));
        }

        let envelope: FloatingIpEnvelope = response
            .json()
            .await
            .map_err(|e| unreachable_err("invalid floating IP response", e))?;

        let holder = envelope.floating_ip.droplet.map(|d| d.id);
        tracing::trace!(floating_ip = %resource_id, ?holder, droplet_id, "Floating IP holder");
        Ok(holder == Some(droplet_id))
    }

    async fn acquire(&self, resource_id: &str) -> OwnershipResult<()> {
        let droplet_id = self.droplet_id().await?;
        let action = AssignAction {
            kind: "assign",
            droplet_id,
        };

        let response = self
            .http
            .post(format!("{}/actions", self.floating_ip_url(resource_id)))
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .json(&action)
            .send()
            .await
            .map_err(|e| OwnershipError::AcquireFailed(format!("assign request failed: {}", e)))?;

        let status = response.status();
        if status != StatusCode::OK && status != StatusCode::CREATED {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(floating_ip = %resource_id, %status, body = %body, "Floating IP assignment rejected");
            return Err(OwnershipError::AcquireFailed(format!(
                "assign request returned {}",
                status
            )));
        }

        tracing::info!(floating_ip = %resource_id, droplet_id, "Acquired the floating IP");
        Ok(())
    }
}

impl std::fmt::Debug for DigitalOceanClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DigitalOceanClient")
            .field("api_base_url", &self.api_base_url)
            .field("metadata_url", &self.metadata_url)
            .field("droplet_id", &self.droplet_id.get())
            .finish_non_exhaustive()
    }
}

fn unreachable_err(context: &str, e: reqwest::Error) -> OwnershipError {
    OwnershipError::AuthorityUnreachable(format!("{}: {}", context, e))
}
