// Copyright (c) 2025 - Cowboy AI, Inc.

//! Compute Engine Inventory Source
//!
//! Lists instances through the Compute Engine REST API, equivalent to
//! `gcloud compute instances list`:
//!
//! ```text
//! GET {api}/projects/{project}/zones                      (paged)
//! GET {api}/projects/{project}/zones/{zone}/instances     (paged, per zone)
//! ```
//!
//! Credentials come from the metadata server's default service account
//! unless a static access token is configured. The same metadata server
//! answers "which instance am I" for [`MetadataIdentity`].
//!
//! # Example
//!
//! ```rust,no_run
//! use cim_instances::source::{ComputeApiConfig, ComputeApiSource, InventorySource};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = ComputeApiSource::new(ComputeApiConfig::default())?;
//!     let instances = source.list_instances("my-project").await?;
//!     println!("{} instances", instances.len());
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use super::{InventorySource, SelfIdentity};
use crate::domain::Instance;
use crate::errors::{InventoryError, InventoryResult};

const METADATA_FLAVOR: &str = "Metadata-Flavor";
const METADATA_FLAVOR_VALUE: &str = "Google";

/// Configuration for the Compute Engine API client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputeApiConfig {
    /// API base URL, without trailing slash
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Metadata server host; `GCE_METADATA_HOST` overrides the default
    #[serde(default = "default_metadata_host")]
    pub metadata_host: String,

    /// Static bearer token; skips the metadata token exchange when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_api_base_url() -> String {
    "https://compute.googleapis.com/compute/v1".to_string()
}

fn default_metadata_host() -> String {
    std::env::var("GCE_METADATA_HOST").unwrap_or_else(|_| "metadata.google.internal".to_string())
}

fn default_timeout() -> u64 {
    30
}

impl Default for ComputeApiConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            metadata_host: default_metadata_host(),
            access_token: None,
            timeout_secs: default_timeout(),
        }
    }
}

impl ComputeApiConfig {
    fn metadata_url(&self, path: &str) -> String {
        format!("http://{}/computeMetadata/v1/{}", self.metadata_host, path)
    }
}

/// One page of a list call
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListPage<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Zone {
    name: String,
}

#[derive(Debug, Deserialize)]
struct AccessToken {
    access_token: String,
}

/// Inventory source backed by the Compute Engine API
pub struct ComputeApiSource {
    config: ComputeApiConfig,
    client: Client,
}

impl ComputeApiSource {
    /// Create a new source
    pub fn new(config: ComputeApiConfig) -> InventoryResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                InventoryError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    /// Bearer token for this listing
    async fn access_token(&self) -> InventoryResult<String> {
        if let Some(token) = &self.config.access_token {
            return Ok(token.clone());
        }

        let url = self
            .config
            .metadata_url("instance/service-accounts/default/token");
        let response = self
            .client
            .get(&url)
            .header(METADATA_FLAVOR, METADATA_FLAVOR_VALUE)
            .send()
            .await
            .map_err(|e| InventoryError::Fetch(format!("metadata token request failed: {}", e)))?;

        let token: AccessToken = check_status(response, "metadata token").await?.json().await?;
        Ok(token.access_token)
    }

    /// Follow `nextPageToken` until the listing at `url` is exhausted
    async fn list_all<T>(&self, url: &str, token: &str, what: &str) -> InventoryResult<Vec<T>>
    where
        T: for<'de> Deserialize<'de>,
    {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page_url = match &page_token {
                Some(next) => format!("{}?pageToken={}", url, urlencoding::encode(next)),
                None => url.to_string(),
            };

            let response = self
                .client
                .get(&page_url)
                .bearer_auth(token)
                .send()
                .await
                .map_err(|e| InventoryError::Fetch(format!("{}: {}", what, e)))?;

            let page: ListPage<T> = check_status(response, what).await?.json().await?;
            items.extend(page.items);

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        Ok(items)
    }

    fn project_url(&self, project: &str) -> String {
        format!(
            "{}/projects/{}",
            self.config.api_base_url,
            urlencoding::encode(project)
        )
    }
}

#[async_trait]
impl InventorySource for ComputeApiSource {
    async fn list_instances(&self, project: &str) -> InventoryResult<Vec<Instance>> {
        let token = self.access_token().await?;
        let project_url = self.project_url(project);

        let zones: Vec<Zone> = self
            .list_all(&format!("{}/zones", project_url), &token, "zones.list")
            .await?;
        debug!(project = %project, zones = zones.len(), "Listed zones");

        let mut result = Vec::new();
        for zone in zones {
            let url = format!(
                "{}/zones/{}/instances",
                project_url,
                urlencoding::encode(&zone.name)
            );
            let instances: Vec<Instance> = self.list_all(&url, &token, "instances.list").await?;
            result.extend(instances);
        }

        Ok(result)
    }

    fn name(&self) -> &str {
        "compute-api"
    }
}

async fn check_status(
    response: reqwest::Response,
    what: &str,
) -> InventoryResult<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(InventoryError::Fetch(format!(
        "{} returned {}: {}",
        what, status, body
    )))
}

/// Self identity from the metadata server
pub struct MetadataIdentity {
    config: ComputeApiConfig,
    client: Client,
}

impl MetadataIdentity {
    /// Timeout for the "are we on a cloud VM" probe
    const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

    pub fn new(config: ComputeApiConfig) -> InventoryResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                InventoryError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;
        Ok(Self { config, client })
    }

    /// True when the metadata server answers with the expected flavor header
    async fn on_gce(&self) -> bool {
        let response = self
            .client
            .get(self.config.metadata_url(""))
            .header(METADATA_FLAVOR, METADATA_FLAVOR_VALUE)
            .timeout(Self::PROBE_TIMEOUT)
            .send()
            .await;

        match response {
            Ok(response) => response
                .headers()
                .get(METADATA_FLAVOR)
                .is_some_and(|v| v == METADATA_FLAVOR_VALUE),
            Err(e) => {
                debug!("Metadata server not reachable: {}", e);
                false
            }
        }
    }
}

#[async_trait]
impl SelfIdentity for MetadataIdentity {
    async fn current_instance_name(&self) -> InventoryResult<Option<String>> {
        if !self.on_gce().await {
            return Ok(None);
        }

        let response = self
            .client
            .get(self.config.metadata_url("instance/name"))
            .header(METADATA_FLAVOR, METADATA_FLAVOR_VALUE)
            .send()
            .await
            .map_err(|e| InventoryError::SelfIdentity(e.to_string()))?;

        if response.status() != StatusCode::OK {
            return Err(InventoryError::SelfIdentity(format!(
                "metadata instance/name returned {}",
                response.status()
            )));
        }

        let name = response
            .text()
            .await
            .map_err(|e| InventoryError::SelfIdentity(e.to_string()))?
            .trim()
            .to_string();
        info!(instance = %name, "Resolved current instance name");
        Ok(Some(name))
    }
}
