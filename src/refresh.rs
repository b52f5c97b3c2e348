// Copyright (c) 2025 - Cowboy AI, Inc.
//! Inventory Refresh Loop
//!
//! Keeps an [`InstanceCache`] eventually consistent with an
//! [`InventorySource`].
//!
//! ```text
//! tick ──> list_instances(project) ──> Snapshot::from_instances ──> replace_snapshot
//!              │ error
//!              └──> log, keep previous snapshot, wait for next tick
//! ```
//!
//! The first refresh runs immediately; later ones follow a fixed interval.
//! There is no backoff: the interval is the retry interval. The fetch runs
//! outside any lock, only the final pointer swap touches the cache.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::cache::{InstanceCache, Snapshot};
use crate::errors::InventoryResult;
use crate::source::InventorySource;

/// Repopulates a cache from an inventory source
pub struct Refresher {
    project: String,
    self_name: Option<String>,
    source: Arc<dyn InventorySource>,
    cache: Arc<InstanceCache>,
}

impl Refresher {
    pub fn new(
        project: impl Into<String>,
        self_name: Option<String>,
        source: Arc<dyn InventorySource>,
        cache: Arc<InstanceCache>,
    ) -> Self {
        Self {
            project: project.into(),
            self_name,
            source,
            cache,
        }
    }

    /// Fetch once and publish the result
    ///
    /// Returns the number of names published. On error the cache is left
    /// untouched.
    pub async fn refresh_once(&self) -> InventoryResult<usize> {
        info!(project = %self.project, source = self.source.name(), "Expanding instance targets");

        let instances = self.source.list_instances(&self.project).await?;
        let snapshot = Snapshot::from_instances(instances, self.self_name.as_deref());
        let count = snapshot.len();

        debug!(project = %self.project, names = ?snapshot.names(), "Expanded target list");
        self.cache.replace_snapshot(snapshot);
        Ok(count)
    }

    /// Run [`refresh_once`](Self::refresh_once) now and then every `interval`
    /// until `token` is cancelled
    ///
    /// `interval` must be non-zero.
    pub fn spawn(self, interval: Duration, token: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(interval, token).await })
    }

    async fn run(self, interval: Duration, token: CancellationToken) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let result = tokio::select! {
                biased;
                _ = token.cancelled() => break,
                result = self.refresh_once() => result,
            };

            if let Err(e) = result {
                error!(
                    project = %self.project,
                    "Error while getting list of all instances: {}", e
                );
            }
        }

        debug!(project = %self.project, "Refresh loop stopped");
    }
}
