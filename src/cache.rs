// Copyright (c) 2025 - Cowboy AI, Inc.
//! Instance Cache
//!
//! Holds the last successfully fetched inventory as an immutable
//! [`Snapshot`]. Readers load the current snapshot pointer; the refresh loop
//! publishes a fully built replacement with a single atomic swap.
//!
//! # Invariants
//!
//! - A reader sees exactly one snapshot per load, never a mix of two.
//! - `names` and the keys of `instances` always come from the same refresh.
//! - Published records are never mutated.

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::Instance;

/// One complete, immutable view of the inventory
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    instances: HashMap<String, Arc<Instance>>,
    names: Vec<String>,
    refreshed_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// Build a snapshot from a listing, dropping `exclude` if given
    ///
    /// Listing order is kept for `names`. A name listed twice keeps its
    /// last record and appears once.
    pub fn from_instances(instances: Vec<Instance>, exclude: Option<&str>) -> Self {
        let mut by_name = HashMap::with_capacity(instances.len());
        let mut names = Vec::with_capacity(instances.len());

        for instance in instances {
            if exclude == Some(instance.name.as_str()) {
                continue;
            }
            let name = instance.name.clone();
            if by_name.insert(name.clone(), Arc::new(instance)).is_none() {
                names.push(name);
            }
        }

        Self {
            instances: by_name,
            names,
            refreshed_at: Some(Utc::now()),
        }
    }

    /// Record for `name`
    pub fn get(&self, name: &str) -> Option<Arc<Instance>> {
        self.instances.get(name).cloned()
    }

    /// Names in listing order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// When this snapshot was built; `None` before the first refresh
    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }
}

/// Concurrency-safe store for the current [`Snapshot`]
#[derive(Debug)]
pub struct InstanceCache {
    snap: ArcSwap<Snapshot>,
}

impl Default for InstanceCache {
    fn default() -> Self {
        Self::new()
    }
}

impl InstanceCache {
    /// Empty cache; lists nothing until the first refresh lands
    pub fn new() -> Self {
        Self {
            snap: ArcSwap::from_pointee(Snapshot::default()),
        }
    }

    /// Point lookup in the current snapshot
    #[inline]
    pub fn get(&self, name: &str) -> Option<Arc<Instance>> {
        self.snap.load().get(name)
    }

    /// Owned copy of the current names
    pub fn list(&self) -> Vec<String> {
        self.snap.load().names.clone()
    }

    /// The current snapshot, for several reads that must agree
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snap.load_full()
    }

    /// Publish `snapshot`, replacing the previous one wholesale
    pub fn replace_snapshot(&self, snapshot: Snapshot) {
        self.snap.store(Arc::new(snapshot));
    }

    pub fn len(&self) -> usize {
        self.snap.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snap.load().is_empty()
    }

    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.snap.load().refreshed_at
    }
}
