// Copyright (c) 2025 - Cowboy AI, Inc.
//! Inventory Domain Models
//!
//! Instance records as reported by the compute API and the network value
//! objects used to turn them into reachable addresses.
//!
//! # Records
//!
//! - [`Instance`] - One VM, with its ordered network interfaces
//! - [`NetworkInterface`] - Private address, NAT configs and alias ranges
//!
//! # Value Objects
//!
//! - [`IpCidr`] - Address with prefix length and derived network address

pub mod instance;
pub mod network;

pub use instance::{AccessConfig, AliasIpRange, Instance, InstanceBuilder, NetworkInterface};
pub use network::{parse_alias_range, parse_ip, IpCidr, NetworkError};
