//! Cached cloud instance inventory for probe targets
//!
//! Keeps a periodically refreshed snapshot of the instances in a project so
//! probes can turn an instance name into an address without an API call per
//! probe cycle.
//!
//! - [`InstancesProvider`] owns the cache and its refresh loop; one per process.
//! - [`Instances`] is the per-probe facade: `list()` and `resolve()`.
//! - [`source::InventorySource`] is where listings come from.

pub mod cache;
pub mod config;
pub mod domain;
pub mod errors;
pub mod instances;
pub mod provider;
pub mod refresh;
pub mod resolver;
pub mod source;

// Re-export commonly used types
pub use cache::{InstanceCache, Snapshot};
pub use config::{AddressingRequest, GlobalInstancesOptions, IpType, IpVersion, NetworkInterfaceSelector};
pub use errors::{InventoryError, InventoryResult};
pub use instances::{resolve_instance, Instances};
pub use provider::{InstancesProvider, SharedInstancesProvider};
pub use resolver::{NameResolver, SystemResolver};
