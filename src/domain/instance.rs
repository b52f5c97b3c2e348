// Copyright (c) 2025 - Cowboy AI, Inc.
//! Instance Records as Reported by the Compute API
//!
//! These types mirror the subset of the compute `Instance` resource that
//! address resolution needs. Field names follow the API's JSON so a listing
//! response deserializes straight into them.
//!
//! Records are replaced wholesale on every inventory refresh and are never
//! mutated once they have been published in a snapshot.

use serde::{Deserialize, Serialize};

/// One virtual machine in a project
///
/// `name` is unique within a project. The order of `network_interfaces` is
/// significant: callers pick an interface by index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default)]
    pub network_interfaces: Vec<NetworkInterface>,
}

/// A network interface attached to an instance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterface {
    /// Private address literal
    #[serde(rename = "networkIP", default)]
    pub network_ip: String,

    /// Public NAT mappings; the first entry is authoritative
    #[serde(default)]
    pub access_configs: Vec<AccessConfig>,

    /// Secondary ranges routed to this interface
    #[serde(default)]
    pub alias_ip_ranges: Vec<AliasIpRange>,
}

/// Public-facing NAT mapping of an interface
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessConfig {
    #[serde(rename = "natIP", default)]
    pub nat_ip: String,
}

/// Alias range, stored as CIDR or as a bare address
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AliasIpRange {
    #[serde(default)]
    pub ip_cidr_range: String,
}

impl Instance {
    /// Create an instance with no interfaces
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            zone: None,
            status: None,
            network_interfaces: Vec::new(),
        }
    }

    /// Builder pattern for fluent construction
    pub fn builder(name: impl Into<String>) -> InstanceBuilder {
        InstanceBuilder {
            instance: Self::new(name),
        }
    }

    /// Interface at `index`, if present
    pub fn interface(&self, index: usize) -> Option<&NetworkInterface> {
        self.network_interfaces.get(index)
    }
}

impl NetworkInterface {
    /// Interface with a private address only
    pub fn private(network_ip: impl Into<String>) -> Self {
        Self {
            network_ip: network_ip.into(),
            ..Default::default()
        }
    }

    /// Add a NAT address
    pub fn with_nat_ip(mut self, nat_ip: impl Into<String>) -> Self {
        self.access_configs.push(AccessConfig {
            nat_ip: nat_ip.into(),
        });
        self
    }

    /// Add an alias range
    pub fn with_alias_range(mut self, ip_cidr_range: impl Into<String>) -> Self {
        self.alias_ip_ranges.push(AliasIpRange {
            ip_cidr_range: ip_cidr_range.into(),
        });
        self
    }
}

/// Builder for [`Instance`]
pub struct InstanceBuilder {
    instance: Instance,
}

impl InstanceBuilder {
    pub fn zone(mut self, zone: impl Into<String>) -> Self {
        self.instance.zone = Some(zone.into());
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.instance.status = Some(status.into());
        self
    }

    pub fn interface(mut self, interface: NetworkInterface) -> Self {
        self.instance.network_interfaces.push(interface);
        self
    }

    pub fn build(self) -> Instance {
        self.instance
    }
}
