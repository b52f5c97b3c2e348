// Copyright (c) 2025 - Cowboy AI, Inc.
//! Shared Instances Provider
//!
//! An [`InstancesProvider`] owns the instance cache and the background loop
//! that refreshes it. It is expensive (one API listing per interval) and
//! shareable, so a process keeps exactly one and hands it to every
//! [`Instances`](crate::Instances) facade.
//!
//! [`SharedInstancesProvider`] is the once-only guard a composition root
//! holds: the first caller starts the provider, every later or concurrent
//! caller gets the same `Arc`.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use cim_instances::{GlobalInstancesOptions, SharedInstancesProvider};
//! use cim_instances::source::StaticIdentity;
//! # use cim_instances::source::InventorySource;
//! # async fn run(source: Arc<dyn InventorySource>) -> cim_instances::InventoryResult<()> {
//!
//! let shared = SharedInstancesProvider::new();
//! let provider = shared
//!     .get_or_start(
//!         GlobalInstancesOptions::new("my-project"),
//!         source,
//!         Arc::new(StaticIdentity::none()),
//!     )
//!     .await?;
//! println!("{:?}", provider.cache().list());
//! # Ok(())
//! # }
//! ```

use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cache::InstanceCache;
use crate::config::GlobalInstancesOptions;
use crate::errors::{InventoryError, InventoryResult};
use crate::refresh::Refresher;
use crate::source::{InventorySource, SelfIdentity};

/// Instance cache plus the loop that keeps it fresh
#[derive(Debug)]
pub struct InstancesProvider {
    project: String,
    self_name: Option<String>,
    cache: Arc<InstanceCache>,
    token: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl InstancesProvider {
    /// Resolve self identity and start the refresh loop
    ///
    /// Must be called inside a tokio runtime. The first refresh starts
    /// immediately in the background; this call does not wait for it.
    pub async fn start(
        options: GlobalInstancesOptions,
        source: Arc<dyn InventorySource>,
        identity: Arc<dyn SelfIdentity>,
    ) -> InventoryResult<Self> {
        options.validate()?;

        let self_name = match options.self_name_override.clone() {
            Some(name) => Some(name),
            None => identity.current_instance_name().await.map_err(|e| match e {
                InventoryError::SelfIdentity(msg) => InventoryError::SelfIdentity(format!(
                    "error while getting current instance name: {}",
                    msg
                )),
                other => other,
            })?,
        };
        if let Some(name) = &self_name {
            info!(project = %options.project, instance = %name, "This instance is excluded from listings");
        }

        let cache = Arc::new(InstanceCache::new());
        let token = CancellationToken::new();
        let refresher = Refresher::new(
            options.project.clone(),
            self_name.clone(),
            source,
            cache.clone(),
        );
        let task = refresher.spawn(options.re_eval_interval, token.child_token());

        info!(
            project = %options.project,
            interval_secs = options.re_eval_interval.as_secs_f64(),
            "Started instances provider"
        );

        Ok(Self {
            project: options.project,
            self_name,
            cache,
            token,
            task: Mutex::new(Some(task)),
        })
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    /// Name excluded from listings, if known
    pub fn self_name(&self) -> Option<&str> {
        self.self_name.as_deref()
    }

    pub fn cache(&self) -> &Arc<InstanceCache> {
        &self.cache
    }

    /// Whether the refresh loop has been asked to stop
    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Stop refreshing and wait for the loop to exit
    ///
    /// The cache keeps serving its last snapshot.
    pub async fn shutdown(&self) {
        self.token.cancel();
        let task = self.task.lock().ok().and_then(|mut task| task.take());
        if let Some(task) = task {
            if let Err(e) = task.await {
                warn!(project = %self.project, "Refresh loop ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for InstancesProvider {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Once-only holder for the process's [`InstancesProvider`]
#[derive(Debug, Default)]
pub struct SharedInstancesProvider {
    cell: OnceCell<Arc<InstancesProvider>>,
}

impl SharedInstancesProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the provider, starting it if this is the first call
    ///
    /// Concurrent callers wait for the one in-flight start. A failed start
    /// leaves the holder empty so a later call can try again. Options passed
    /// after the provider exists are ignored.
    pub async fn get_or_start(
        &self,
        options: GlobalInstancesOptions,
        source: Arc<dyn InventorySource>,
        identity: Arc<dyn SelfIdentity>,
    ) -> InventoryResult<Arc<InstancesProvider>> {
        self.cell
            .get_or_try_init(|| async move {
                InstancesProvider::start(options, source, identity)
                    .await
                    .map(Arc::new)
            })
            .await
            .cloned()
    }

    /// The provider, if already started
    pub fn get(&self) -> Option<Arc<InstancesProvider>> {
        self.cell.get().cloned()
    }
}
