// Copyright (c) 2025 - Cowboy AI, Inc.
//! Instances Lister
//!
//! Keeps the instance inventory of a project cached and periodically prints
//! every cached instance with the address each configured policy resolves to.
//!
//! Run with: cargo run --bin instances-lister --features gce
//!
//! Environment:
//! 1. `GCE_PROJECT` - project to list (required)
//! 2. `GCE_RE_EVAL_SEC` - refresh interval in seconds (default 900)
//! 3. `GCE_SELF_NAME` - instance name to exclude, skips the metadata lookup
//! 4. `GCE_ACCESS_TOKEN` - static bearer token, skips the metadata token exchange
//! 5. `INSTANCES_IP_TYPES` - comma separated `PRIVATE`, `PUBLIC`, `ALIAS`, `DNS`
//!    (default `PRIVATE`)
//! 6. `INSTANCES_INTERFACE` - interface index for non-DNS policies (default 0)

use anyhow::{bail, Context, Result};
use cim_instances::source::{ComputeApiConfig, ComputeApiSource, MetadataIdentity};
use cim_instances::{
    AddressingRequest, GlobalInstancesOptions, Instances, IpType, IpVersion, NameResolver,
    SharedInstancesProvider, SystemResolver,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{info, warn};

/// Configuration for the lister
#[derive(Debug, Clone)]
struct ListerConfig {
    options: GlobalInstancesOptions,
    api: ComputeApiConfig,
    policies: Vec<(String, AddressingRequest)>,
}

impl ListerConfig {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        let options = GlobalInstancesOptions::from_env().context("Invalid inventory options")?;

        let api = ComputeApiConfig {
            access_token: std::env::var("GCE_ACCESS_TOKEN").ok(),
            ..Default::default()
        };

        let index: u32 = std::env::var("INSTANCES_INTERFACE")
            .unwrap_or_else(|_| "0".to_string())
            .parse()
            .context("INSTANCES_INTERFACE must be a non-negative integer")?;

        let types = std::env::var("INSTANCES_IP_TYPES").unwrap_or_else(|_| "PRIVATE".to_string());
        let policies = parse_policies(&types, index)?;

        Ok(Self {
            options,
            api,
            policies,
        })
    }
}

/// Parse the comma separated policy list; at least one policy is required
fn parse_policies(types: &str, index: u32) -> Result<Vec<(String, AddressingRequest)>> {
    let mut policies = Vec::new();
    for label in types.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let label = label.to_ascii_uppercase();
        let request = match label.as_str() {
            "PRIVATE" => AddressingRequest::interface(index, IpType::Private),
            "PUBLIC" => AddressingRequest::interface(index, IpType::Public),
            "ALIAS" => AddressingRequest::interface(index, IpType::Alias),
            "DNS" => AddressingRequest::dns(),
            other => bail!("Unknown IP type in INSTANCES_IP_TYPES: {}", other),
        };
        policies.push((label, request));
    }

    if policies.is_empty() {
        bail!("INSTANCES_IP_TYPES names no IP type: {:?}", types);
    }
    Ok(policies)
}

/// Report ticker whose first tick is one period out, after the first refresh
fn report_ticker(period: Duration) -> Interval {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting instances lister");

    let config = ListerConfig::from_env()?;
    info!("Configuration loaded:");
    info!("  - Project: {}", config.options.project);
    info!("  - Refresh interval: {:?}", config.options.re_eval_interval);
    info!("  - Policies: {:?}", config.policies.iter().map(|(l, _)| l).collect::<Vec<_>>());

    let source = Arc::new(
        ComputeApiSource::new(config.api.clone()).context("Failed to create Compute API source")?,
    );
    let identity = Arc::new(
        MetadataIdentity::new(config.api.clone()).context("Failed to create metadata client")?,
    );
    let resolver: Arc<dyn NameResolver> =
        Arc::new(SystemResolver::new().context("Failed to create DNS resolver")?);

    let shared = SharedInstancesProvider::new();
    let mut facades = Vec::with_capacity(config.policies.len());
    for (label, request) in &config.policies {
        let facade = Instances::with_shared(
            request.clone(),
            &shared,
            config.options.clone(),
            source.clone(),
            identity.clone(),
            Some(resolver.clone()),
        )
        .await
        .with_context(|| format!("Failed to configure {} targets", label))?;
        facades.push((label.clone(), facade));
    }

    let provider = shared.get().context("Instances provider was not started")?;
    let mut ticker = report_ticker(config.options.re_eval_interval);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                break;
            }
            _ = ticker.tick() => {}
        }

        for (label, facade) in &facades {
            let names = facade.list();
            let lookups = names
                .iter()
                .map(|name| facade.resolve(name, IpVersion::Any));
            let results = futures::future::join_all(lookups).await;

            info!("{} targets ({}):", label, names.len());
            for (name, result) in names.iter().zip(results) {
                match result {
                    Ok(ip) => println!("{}\t{}\t{}", label, name, ip),
                    Err(e) => warn!("{}", e),
                }
            }
        }
    }

    provider.shutdown().await;
    Ok(())
}
