// Copyright (c) 2025 - Cowboy AI, Inc.
//! Name Resolver Seam
//!
//! Facades configured with `use_dns_to_resolve` hand names to a
//! [`NameResolver`] instead of reading the instance cache. The resolver is
//! shared process-wide and owned by the composition root.

use async_trait::async_trait;
use hickory_resolver::config::{LookupIpStrategy, ResolverConfig, ResolverOpts};
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::{Resolver, TokioResolver};
use std::net::IpAddr;

use crate::config::IpVersion;
use crate::errors::{InventoryError, InventoryResult};

/// Resolves a host name to one address
#[async_trait]
pub trait NameResolver: Send + Sync {
    async fn resolve(&self, name: &str, ip_version: IpVersion) -> InventoryResult<IpAddr>;
}

/// DNS resolver using the host's resolver configuration
///
/// Queries both address families so that a V6 request still succeeds for a
/// dual-stack name. IP literals are answered without a query.
#[derive(Clone)]
pub struct SystemResolver {
    resolver: TokioResolver,
}

impl SystemResolver {
    /// Build from the system configuration (`/etc/resolv.conf` on Unix)
    pub fn new() -> InventoryResult<Self> {
        let mut builder = TokioResolver::builder_tokio().map_err(|e| {
            InventoryError::Configuration(format!("Failed to load DNS configuration: {}", e))
        })?;
        builder.options_mut().ip_strategy = LookupIpStrategy::Ipv4AndIpv6;
        Ok(Self {
            resolver: builder.build(),
        })
    }

    /// Build from an explicit name server configuration
    pub fn with_config(config: ResolverConfig) -> Self {
        let mut opts = ResolverOpts::default();
        opts.ip_strategy = LookupIpStrategy::Ipv4AndIpv6;
        let resolver = Resolver::builder_with_config(config, TokioConnectionProvider::default())
            .with_options(opts)
            .build();
        Self { resolver }
    }
}

impl std::fmt::Debug for SystemResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemResolver").finish_non_exhaustive()
    }
}

#[async_trait]
impl NameResolver for SystemResolver {
    async fn resolve(&self, name: &str, ip_version: IpVersion) -> InventoryResult<IpAddr> {
        let lookup = self
            .resolver
            .lookup_ip(name)
            .await
            .map_err(|e| InventoryError::Dns {
                name: name.to_string(),
                reason: e.to_string(),
            })?;

        lookup
            .iter()
            .find(|ip| ip_version.matches(ip))
            .ok_or_else(|| InventoryError::Dns {
                name: name.to_string(),
                reason: format!("no {:?} address found", ip_version),
            })
    }
}
