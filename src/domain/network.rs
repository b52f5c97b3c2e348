// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network Value Objects for Address Resolution

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;
use thiserror::Error;

/// Network parsing error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("invalid IP address: {0}")]
    InvalidIpAddress(String),

    #[error("invalid CIDR address: {0}")]
    InvalidCidr(String),

    #[error("invalid prefix length {0} (must be 0-32 for IPv4, 0-128 for IPv6)")]
    InvalidPrefixLength(u8),
}

/// IP address with a mandatory prefix length
///
/// Represents one address inside a CIDR block, e.g. `10.1.2.9/24`.
/// Invariants:
/// - Valid IP address format
/// - Prefix length within the range of the address family
///
/// # Examples
///
/// ```rust
/// use cim_instances::domain::IpCidr;
///
/// let cidr = IpCidr::new("10.1.2.9/24").unwrap();
/// assert_eq!(cidr.address().to_string(), "10.1.2.9");
/// assert_eq!(cidr.network().to_string(), "10.1.2.0");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IpCidr {
    address: IpAddr,
    prefix_length: u8,
}

impl IpCidr {
    /// Parse CIDR notation (`addr/prefix`)
    ///
    /// A bare address without `/prefix` is rejected; use
    /// [`parse_alias_range`] when either form is acceptable.
    pub fn new(cidr: impl AsRef<str>) -> Result<Self, NetworkError> {
        let cidr = cidr.as_ref();

        let (addr_str, prefix_str) = cidr
            .split_once('/')
            .ok_or_else(|| NetworkError::InvalidCidr(cidr.to_string()))?;

        let address = IpAddr::from_str(addr_str)
            .map_err(|_| NetworkError::InvalidCidr(cidr.to_string()))?;

        // Leading '+' or empty prefixes parse as u8 in some forms; reject them.
        if prefix_str.is_empty() || !prefix_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(NetworkError::InvalidCidr(cidr.to_string()));
        }
        let prefix_length = prefix_str
            .parse::<u8>()
            .map_err(|_| NetworkError::InvalidCidr(cidr.to_string()))?;

        Self::from_parts(address, prefix_length)
    }

    /// Create from separate address and prefix
    pub fn from_parts(address: IpAddr, prefix_length: u8) -> Result<Self, NetworkError> {
        let max_prefix = match address {
            IpAddr::V4(_) => 32,
            IpAddr::V6(_) => 128,
        };

        if prefix_length > max_prefix {
            return Err(NetworkError::InvalidPrefixLength(prefix_length));
        }

        Ok(Self {
            address,
            prefix_length,
        })
    }

    /// The address as written
    pub fn address(&self) -> IpAddr {
        self.address
    }

    /// The prefix length
    pub fn prefix_length(&self) -> u8 {
        self.prefix_length
    }

    /// The network address: `address` with all host bits cleared
    pub fn network(&self) -> IpAddr {
        match self.address {
            IpAddr::V4(v4) => {
                let mask = u32::MAX
                    .checked_shl(32 - u32::from(self.prefix_length))
                    .unwrap_or(0);
                IpAddr::V4(Ipv4Addr::from(u32::from(v4) & mask))
            }
            IpAddr::V6(v6) => {
                let mask = u128::MAX
                    .checked_shl(128 - u32::from(self.prefix_length))
                    .unwrap_or(0);
                IpAddr::V6(Ipv6Addr::from(u128::from(v6) & mask))
            }
        }
    }
}

impl fmt::Display for IpCidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix_length)
    }
}

impl FromStr for IpCidr {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Parse an alias IP range into a single address
///
/// The compute API accepts a bare address where a CIDR range is expected,
/// so a bare address is tried first. Otherwise the value must be a CIDR
/// range and its address part is returned as written, host bits included.
/// When both fail the CIDR parser's error is returned unchanged.
pub fn parse_alias_range(range: &str) -> Result<IpAddr, NetworkError> {
    if let Ok(ip) = IpAddr::from_str(range) {
        return Ok(ip);
    }
    IpCidr::new(range).map(|cidr| cidr.address())
}

/// Parse a plain IP literal as reported by the inventory
pub fn parse_ip(value: &str) -> Result<IpAddr, NetworkError> {
    IpAddr::from_str(value).map_err(|_| NetworkError::InvalidIpAddress(value.to_string()))
}
