// Copyright (c) 2025 - Cowboy AI, Inc.
//! Inventory Sources
//!
//! The cache never talks to a cloud API directly. It asks an
//! [`InventorySource`] for the full listing of a project and a
//! [`SelfIdentity`] for the name of the machine it runs on.
//!
//! # Contract
//!
//! - `list_instances` returns every instance across all zones, or fails as a
//!   whole. Partial listings are never returned.
//! - Calls may be slow and may fail; the refresh loop retries on its next tick.
//!
//! # Example
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use cim_instances::domain::Instance;
//! use cim_instances::source::InventorySource;
//! use cim_instances::InventoryResult;
//!
//! struct FixedSource(Vec<Instance>);
//!
//! #[async_trait]
//! impl InventorySource for FixedSource {
//!     async fn list_instances(&self, _project: &str) -> InventoryResult<Vec<Instance>> {
//!         Ok(self.0.clone())
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::domain::Instance;
use crate::errors::InventoryResult;

#[cfg(feature = "gce")]
pub mod gce;

#[cfg(feature = "gce")]
pub use gce::{ComputeApiConfig, ComputeApiSource, MetadataIdentity};

/// Lists the instances of a project
#[async_trait]
pub trait InventorySource: Send + Sync {
    /// Every instance currently in `project`
    async fn list_instances(&self, project: &str) -> InventoryResult<Vec<Instance>>;

    /// Name used in logs
    fn name(&self) -> &str {
        "inventory-source"
    }
}

/// Reports the name of the instance this process runs on
#[async_trait]
pub trait SelfIdentity: Send + Sync {
    /// `Ok(None)` when not running on a cloud instance
    async fn current_instance_name(&self) -> InventoryResult<Option<String>>;
}

/// Identity known up front, or known to be absent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticIdentity(pub Option<String>);

impl StaticIdentity {
    pub fn named(name: impl Into<String>) -> Self {
        Self(Some(name.into()))
    }

    pub fn none() -> Self {
        Self(None)
    }
}

#[async_trait]
impl SelfIdentity for StaticIdentity {
    async fn current_instance_name(&self) -> InventoryResult<Option<String>> {
        Ok(self.0.clone())
    }
}
