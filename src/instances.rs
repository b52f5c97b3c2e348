// Copyright (c) 2025 - Cowboy AI, Inc.
//! Instance Targets
//!
//! [`Instances`] is what a probe holds: a view over the shared instance cache
//! with its own addressing policy. Listing and resolving only read the
//! current snapshot; neither triggers an inventory fetch.
//!
//! # Resolution
//!
//! ```text
//! name ──> cache.get ──> interface[index] ──> PRIVATE: networkIP
//!                                          ├─> PUBLIC:  accessConfigs[0].natIP
//!                                          └─> ALIAS:   aliasIpRanges[0] (bare IP, else CIDR address part)
//! ```
//!
//! With `use_dns_to_resolve` the name goes to the shared [`NameResolver`]
//! instead and the cache is not consulted.

use std::net::IpAddr;
use std::sync::Arc;

use crate::config::{AddressingRequest, GlobalInstancesOptions, IpType, IpVersion, NetworkInterfaceSelector};
use crate::domain::{parse_alias_range, parse_ip, Instance, NetworkError};
use crate::errors::{InventoryError, InventoryResult};
use crate::provider::{InstancesProvider, SharedInstancesProvider};
use crate::resolver::NameResolver;
use crate::source::{InventorySource, SelfIdentity};

enum Addressing {
    Dns(Arc<dyn NameResolver>),
    Cached(NetworkInterfaceSelector),
}

/// Probe-facing view of the instance inventory
pub struct Instances {
    provider: Arc<InstancesProvider>,
    addressing: Addressing,
}

impl std::fmt::Debug for Instances {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let addressing = match &self.addressing {
            Addressing::Dns(_) => "dns".to_string(),
            Addressing::Cached(sel) => format!("{:?}@{}", sel.ip_type, sel.index),
        };
        f.debug_struct("Instances")
            .field("project", &self.provider.project())
            .field("addressing", &addressing)
            .finish()
    }
}

impl Instances {
    /// Create a facade over an already started provider
    ///
    /// # Errors
    ///
    /// - DNS resolution together with an explicit interface
    /// - DNS resolution without a resolver
    pub fn new(
        request: AddressingRequest,
        provider: Arc<InstancesProvider>,
        resolver: Option<Arc<dyn NameResolver>>,
    ) -> InventoryResult<Self> {
        let addressing = Self::addressing(&request, resolver)?;
        Ok(Self {
            provider,
            addressing,
        })
    }

    /// Create a facade, starting the shared provider if nobody has yet
    ///
    /// The request is validated before the provider is touched, so a bad
    /// configuration never starts a refresh loop.
    pub async fn with_shared(
        request: AddressingRequest,
        shared: &SharedInstancesProvider,
        options: GlobalInstancesOptions,
        source: Arc<dyn InventorySource>,
        identity: Arc<dyn SelfIdentity>,
        resolver: Option<Arc<dyn NameResolver>>,
    ) -> InventoryResult<Self> {
        let addressing = Self::addressing(&request, resolver)?;
        let provider = shared.get_or_start(options, source, identity).await?;
        Ok(Self {
            provider,
            addressing,
        })
    }

    fn addressing(
        request: &AddressingRequest,
        resolver: Option<Arc<dyn NameResolver>>,
    ) -> InventoryResult<Addressing> {
        request.validate()?;
        if !request.use_dns_to_resolve {
            return Ok(Addressing::Cached(request.selector()));
        }
        resolver.map(Addressing::Dns).ok_or_else(|| {
            InventoryError::Configuration(
                "use_dns_to_resolve configured, but no resolver provided".to_string(),
            )
        })
    }

    /// Names of all cached instances, in listing order
    pub fn list(&self) -> Vec<String> {
        self.provider.cache().list()
    }

    /// Resolve `name` to an address according to this facade's policy
    ///
    /// `ip_version` is only honoured by DNS resolution.
    pub async fn resolve(&self, name: &str, ip_version: IpVersion) -> InventoryResult<IpAddr> {
        match &self.addressing {
            Addressing::Dns(resolver) => resolver.resolve(name, ip_version).await,
            Addressing::Cached(selector) => self.resolve_cached(name, *selector),
        }
    }

    fn resolve_cached(&self, name: &str, selector: NetworkInterfaceSelector) -> InventoryResult<IpAddr> {
        let instance = self
            .provider
            .cache()
            .get(name)
            .ok_or_else(|| InventoryError::NotFound {
                name: name.to_string(),
            })?;
        resolve_instance(&instance, selector)
    }

    pub fn provider(&self) -> &Arc<InstancesProvider> {
        &self.provider
    }
}

/// Extract the address `selector` asks for from one instance record
pub fn resolve_instance(instance: &Instance, selector: NetworkInterfaceSelector) -> InventoryResult<IpAddr> {
    let name = &instance.name;
    let intf = instance
        .interface(selector.index as usize)
        .ok_or_else(|| InventoryError::NoNetworkInterface {
            name: name.clone(),
            index: selector.index,
        })?;

    let invalid = |value: &str, e: NetworkError| InventoryError::InvalidAddress {
        name: name.clone(),
        value: value.to_string(),
        reason: e.to_string(),
    };

    match selector.ip_type {
        IpType::Private => parse_ip(&intf.network_ip).map_err(|e| invalid(&intf.network_ip, e)),
        IpType::Public => {
            let config = intf
                .access_configs
                .first()
                .ok_or_else(|| InventoryError::NoPublicIp { name: name.clone() })?;
            parse_ip(&config.nat_ip).map_err(|e| invalid(&config.nat_ip, e))
        }
        IpType::Alias => {
            let range = intf
                .alias_ip_ranges
                .first()
                .ok_or_else(|| InventoryError::NoAliasRange { name: name.clone() })?;
            parse_alias_range(&range.ip_cidr_range).map_err(|e| invalid(&range.ip_cidr_range, e))
        }
    }
}
