// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for cim-instances
//!
//! Provides deterministic instance records and scriptable collaborators
//! (inventory source, name resolver) for integration tests.
//!
//! # Design Principles
//! - Instance data is fixed; no test depends on a real cloud project
//! - Fakes count their calls so tests can assert on fetch cadence
//! - Failure is switched on and off explicitly by the test

#![allow(dead_code)]

use async_trait::async_trait;
use std::net::IpAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cim_instances::domain::{Instance, NetworkInterface};
use cim_instances::source::InventorySource;
use cim_instances::{InventoryError, InventoryResult, IpVersion, NameResolver};

pub const PROJECT: &str = "probe-project";

/// Refresh interval used by time-driven tests
pub const RE_EVAL: Duration = Duration::from_secs(10);

/// Instance with a private, a public and an alias address on interface 0
pub fn web_instance() -> Instance {
    Instance::builder("web-1")
        .zone("us-central1-a")
        .status("RUNNING")
        .interface(
            NetworkInterface::private("10.0.0.5")
                .with_nat_ip("34.1.2.3")
                .with_alias_range("10.1.2.0/24"),
        )
        .build()
}

/// Instance whose alias range is stored as a bare address
pub fn bare_alias_instance() -> Instance {
    Instance::builder("alias-bare")
        .interface(NetworkInterface::private("10.0.0.6").with_alias_range("10.1.2.9"))
        .build()
}

/// Instance whose alias range is a CIDR written with host bits set
pub fn host_alias_instance() -> Instance {
    Instance::builder("alias-host")
        .interface(NetworkInterface::private("10.0.0.9").with_alias_range("10.1.2.77/24"))
        .build()
}

/// Instance with a private address only
pub fn private_only_instance() -> Instance {
    Instance::builder("db-1")
        .interface(NetworkInterface::private("10.0.0.7"))
        .build()
}

/// Instance with two interfaces
pub fn dual_nic_instance() -> Instance {
    Instance::builder("router-1")
        .interface(NetworkInterface::private("10.0.0.8"))
        .interface(NetworkInterface::private("192.168.10.8").with_nat_ip("35.4.5.6"))
        .build()
}

/// Instance the prober runs on
pub fn prober_instance() -> Instance {
    Instance::builder("prober-0")
        .interface(NetworkInterface::private("10.0.0.2"))
        .build()
}

pub fn standard_inventory() -> Vec<Instance> {
    vec![
        web_instance(),
        bare_alias_instance(),
        private_only_instance(),
        dual_nic_instance(),
        prober_instance(),
    ]
}

/// Inventory source whose listing and health are controlled by the test
pub struct FakeSource {
    instances: Mutex<Vec<Instance>>,
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl FakeSource {
    pub fn new(instances: Vec<Instance>) -> Arc<Self> {
        Arc::new(Self {
            instances: Mutex::new(instances),
            failing: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn set_instances(&self, instances: Vec<Instance>) {
        *self.instances.lock().unwrap() = instances;
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InventorySource for FakeSource {
    async fn list_instances(&self, project: &str) -> InventoryResult<Vec<Instance>> {
        assert_eq!(project, PROJECT);
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(InventoryError::Fetch("instances.list returned 503".to_string()));
        }
        Ok(self.instances.lock().unwrap().clone())
    }

    fn name(&self) -> &str {
        "fake"
    }
}

/// Resolver answering every name with one address
pub struct FixedResolver {
    pub answer: IpAddr,
    pub seen: Mutex<Vec<(String, IpVersion)>>,
}

impl FixedResolver {
    pub fn new(answer: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: answer.parse().unwrap(),
            seen: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl NameResolver for FixedResolver {
    async fn resolve(&self, name: &str, ip_version: IpVersion) -> InventoryResult<IpAddr> {
        self.seen.lock().unwrap().push((name.to_string(), ip_version));
        Ok(self.answer)
    }
}

/// Let spawned tasks run; with a paused clock this also advances time by 1ms
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
