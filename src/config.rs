// Copyright (c) 2025 - Cowboy AI, Inc.
//! Configuration for inventory-backed targets
//!
//! Two layers of configuration exist:
//!
//! - [`GlobalInstancesOptions`] is process-wide and drives the shared cache:
//!   which project to list and how often.
//! - [`AddressingRequest`] is per facade and selects which address of a
//!   cached instance a caller wants.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::{InventoryError, InventoryResult};

/// Which address of a network interface to resolve to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IpType {
    /// Interface's private address
    #[default]
    Private,
    /// First access config's NAT address
    Public,
    /// First alias range, as an address
    Alias,
}

/// IP family requested by the caller
///
/// Only the DNS path honours this; cached records resolve to whatever
/// literal the inventory reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpVersion {
    #[default]
    Any,
    V4,
    V6,
}

impl IpVersion {
    /// Whether `ip` belongs to this family
    pub fn matches(&self, ip: &std::net::IpAddr) -> bool {
        match self {
            IpVersion::Any => true,
            IpVersion::V4 => ip.is_ipv4(),
            IpVersion::V6 => ip.is_ipv6(),
        }
    }
}

/// Explicit interface selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInterfaceSelector {
    #[serde(default)]
    pub index: u32,

    #[serde(default)]
    pub ip_type: IpType,
}

/// Per-facade addressing policy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressingRequest {
    /// Interface and address kind; `None` means index 0, private address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_interface: Option<NetworkInterfaceSelector>,

    /// Resolve names through DNS instead of the cached records
    #[serde(default)]
    pub use_dns_to_resolve: bool,
}

impl AddressingRequest {
    /// Request a specific interface and address kind
    pub fn interface(index: u32, ip_type: IpType) -> Self {
        Self {
            network_interface: Some(NetworkInterfaceSelector { index, ip_type }),
            use_dns_to_resolve: false,
        }
    }

    /// Request DNS-based resolution
    pub fn dns() -> Self {
        Self {
            network_interface: None,
            use_dns_to_resolve: true,
        }
    }

    /// Effective interface selection, with defaults applied
    pub fn selector(&self) -> NetworkInterfaceSelector {
        self.network_interface.unwrap_or_default()
    }

    /// Check the request is internally consistent
    pub fn validate(&self) -> InventoryResult<()> {
        if self.network_interface.is_some() && self.use_dns_to_resolve {
            return Err(InventoryError::Configuration(
                "network_interface and use_dns_to_resolve are mutually exclusive".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_re_eval_interval() -> Duration {
    Duration::from_secs(GlobalInstancesOptions::DEFAULT_RE_EVAL_SECS)
}

/// Process-wide options for the shared instance cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalInstancesOptions {
    /// Project whose instances are listed
    pub project: String,

    /// Interval between inventory refreshes
    #[serde(default = "default_re_eval_interval")]
    pub re_eval_interval: Duration,

    /// Name to exclude from listings, bypassing the identity lookup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_name_override: Option<String>,
}

impl Default for GlobalInstancesOptions {
    fn default() -> Self {
        Self {
            project: String::new(),
            re_eval_interval: default_re_eval_interval(),
            self_name_override: None,
        }
    }
}

impl GlobalInstancesOptions {
    /// Default refresh interval in seconds
    pub const DEFAULT_RE_EVAL_SECS: u64 = 900;

    /// Options for `project` with the default interval
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            ..Default::default()
        }
    }

    /// Override the refresh interval
    pub fn with_re_eval_interval(mut self, interval: Duration) -> Self {
        self.re_eval_interval = interval;
        self
    }

    /// Load options from environment variables
    ///
    /// - `GCE_PROJECT` (required)
    /// - `GCE_RE_EVAL_SEC` (optional, seconds)
    /// - `GCE_SELF_NAME` (optional)
    pub fn from_env() -> InventoryResult<Self> {
        let project = std::env::var("GCE_PROJECT")
            .map_err(|_| InventoryError::Configuration("GCE_PROJECT not set".to_string()))?;

        let re_eval_interval = match std::env::var("GCE_RE_EVAL_SEC") {
            Ok(secs) => Duration::from_secs(secs.parse().map_err(|e| {
                InventoryError::Configuration(format!("invalid GCE_RE_EVAL_SEC {:?}: {}", secs, e))
            })?),
            Err(_) => default_re_eval_interval(),
        };

        let options = Self {
            project,
            re_eval_interval,
            self_name_override: std::env::var("GCE_SELF_NAME").ok().filter(|s| !s.is_empty()),
        };
        options.validate()?;
        Ok(options)
    }

    /// Check the options can drive a refresh loop
    pub fn validate(&self) -> InventoryResult<()> {
        if self.project.is_empty() {
            return Err(InventoryError::Configuration("project must not be empty".to_string()));
        }
        if self.re_eval_interval.is_zero() {
            return Err(InventoryError::Configuration(
                "re_eval_interval must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
