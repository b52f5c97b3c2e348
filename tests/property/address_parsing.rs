// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Alias Range Parsing

use cim_instances::domain::{parse_alias_range, IpCidr};
use proptest::prelude::*;
use std::net::{IpAddr, Ipv4Addr};

proptest! {
    /// A bare address always comes back unchanged
    #[test]
    fn prop_bare_address_is_identity(raw in any::<u32>()) {
        let ip = IpAddr::V4(Ipv4Addr::from(raw));
        prop_assert_eq!(parse_alias_range(&ip.to_string()).unwrap(), ip);
    }

    /// A CIDR range resolves to its address part as written, inside the range
    #[test]
    fn prop_cidr_yields_written_address(raw in any::<u32>(), prefix in 0u8..=32) {
        let written = IpAddr::V4(Ipv4Addr::from(raw));
        let range = format!("{}/{}", written, prefix);
        let resolved = parse_alias_range(&range).unwrap();

        prop_assert_eq!(resolved, written);

        // The resolved address lies in the range's network
        let cidr = IpCidr::new(&range).unwrap();
        let again = IpCidr::new(format!("{}/{}", resolved, prefix)).unwrap();
        prop_assert_eq!(again.network(), cidr.network());
    }
}
