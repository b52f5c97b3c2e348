//! Error types for inventory operations

use thiserror::Error;

/// Errors that can occur while building, refreshing or resolving against the
/// instance inventory
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    /// Conflicting or incomplete configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Inventory source failed to produce a listing
    #[error("Inventory fetch error: {0}")]
    Fetch(String),

    /// Current instance name could not be determined
    #[error("Self identity error: {0}")]
    SelfIdentity(String),

    /// Name is not in the cached inventory
    #[error("instances.resolve({name}): instance not in in-memory instances database")]
    NotFound { name: String },

    /// Instance has fewer interfaces than the requested index
    #[error("instances.resolve({name}): no network interface at index {index}")]
    NoNetworkInterface { name: String, index: u32 },

    /// Interface carries no access config
    #[error("instances.resolve({name}): no public IP configured, instance has no access config")]
    NoPublicIp { name: String },

    /// Interface carries no alias range
    #[error("instances.resolve({name}): no alias IP range")]
    NoAliasRange { name: String },

    /// Stored address could not be parsed
    #[error("instances.resolve({name}): invalid address {value:?}: {reason}")]
    InvalidAddress {
        name: String,
        value: String,
        reason: String,
    },

    /// Delegated DNS resolution failed
    #[error("dns.resolve({name}): {reason}")]
    Dns { name: String, reason: String },
}

/// Result type for inventory operations
pub type InventoryResult<T> = Result<T, InventoryError>;

impl InventoryError {
    /// True for errors raised while constructing a facade or provider
    pub fn is_configuration(&self) -> bool {
        matches!(self, InventoryError::Configuration(_))
    }

    /// True for errors raised by a single resolution call
    pub fn is_resolution(&self) -> bool {
        matches!(
            self,
            InventoryError::NotFound { .. }
                | InventoryError::NoNetworkInterface { .. }
                | InventoryError::NoPublicIp { .. }
                | InventoryError::NoAliasRange { .. }
                | InventoryError::InvalidAddress { .. }
                | InventoryError::Dns { .. }
        )
    }
}

impl From<serde_json::Error> for InventoryError {
    fn from(err: serde_json::Error) -> Self {
        InventoryError::Fetch(format!("malformed inventory payload: {}", err))
    }
}

#[cfg(feature = "gce")]
impl From<reqwest::Error> for InventoryError {
    fn from(err: reqwest::Error) -> Self {
        InventoryError::Fetch(err.to_string())
    }
}
