// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Snapshot Construction
//!
//! Whatever the inventory returns, a snapshot's name list and record map
//! describe the same set of instances, and the excluded name is never in it.

use cim_instances::domain::{Instance, NetworkInterface};
use cim_instances::{InstanceCache, Snapshot};
use proptest::prelude::*;
use std::collections::HashSet;

// ============================================================================
// Generators
// ============================================================================

fn arb_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,6}"
}

fn arb_instance() -> impl Strategy<Value = Instance> {
    (arb_name(), 0u8..=255, 0u8..=255).prop_map(|(name, a, b)| {
        Instance::builder(name)
            .interface(NetworkInterface::private(format!("10.0.{}.{}", a, b)))
            .build()
    })
}

fn arb_listing() -> impl Strategy<Value = Vec<Instance>> {
    prop::collection::vec(arb_instance(), 0..40)
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// list() is exactly the key set of the record map
    #[test]
    fn prop_names_match_records(listing in arb_listing()) {
        let cache = InstanceCache::new();
        cache.replace_snapshot(Snapshot::from_instances(listing.clone(), None));

        let names = cache.list();
        let unique: HashSet<&String> = names.iter().collect();
        prop_assert_eq!(unique.len(), names.len(), "names are unique");

        for name in &names {
            prop_assert!(cache.get(name).is_some());
        }

        let listed: HashSet<&str> = listing.iter().map(|i| i.name.as_str()).collect();
        let cached: HashSet<&str> = names.iter().map(String::as_str).collect();
        prop_assert_eq!(listed, cached);
    }

    /// The excluded name never appears, everything else does
    #[test]
    fn prop_self_is_excluded(listing in arb_listing(), pick in any::<prop::sample::Index>()) {
        prop_assume!(!listing.is_empty());
        let me = listing[pick.index(listing.len())].name.clone();

        let snap = Snapshot::from_instances(listing.clone(), Some(me.as_str()));

        prop_assert!(!snap.names().contains(&me));
        prop_assert!(snap.get(&me).is_none());
        let others: HashSet<&str> = listing
            .iter()
            .map(|i| i.name.as_str())
            .filter(|n| *n != me)
            .collect();
        prop_assert_eq!(snap.len(), others.len());
    }

    /// Listing order is preserved for first occurrences
    #[test]
    fn prop_first_occurrence_order(listing in arb_listing()) {
        let snap = Snapshot::from_instances(listing.clone(), None);

        let mut seen = HashSet::new();
        let expected: Vec<String> = listing
            .iter()
            .filter(|i| seen.insert(i.name.clone()))
            .map(|i| i.name.clone())
            .collect();
        prop_assert_eq!(snap.names(), expected.as_slice());
    }
}
