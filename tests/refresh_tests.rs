// Copyright (c) 2025 - Cowboy AI, Inc.
//! Tests for the shared provider and its refresh loop
//!
//! All tests run on tokio's paused clock, so intervals elapse instantly and
//! fetch counts are exact.

mod fixtures;

use std::sync::Arc;
use std::time::Duration;

use cim_instances::source::StaticIdentity;
use cim_instances::{
    AddressingRequest, GlobalInstancesOptions, Instances, InstancesProvider, IpType, IpVersion,
    SharedInstancesProvider,
};
use fixtures::*;
use pretty_assertions::assert_eq;

fn options() -> GlobalInstancesOptions {
    GlobalInstancesOptions::new(PROJECT).with_re_eval_interval(RE_EVAL)
}

/// User Story: C1 - Background Refresh
///
/// As a probe runner
/// I want the instance list refreshed on a fixed interval in the background
/// So that probes see new VMs without making API calls themselves
///
/// ```mermaid
/// sequenceDiagram
///     participant Loop as Refresh loop
///     participant Source as Inventory source
///     participant Cache
///
///     Loop->>Source: list_instances (t=0)
///     Source-->>Loop: instances
///     Loop->>Cache: replace_snapshot
///     Loop->>Source: list_instances (t=interval)
/// ```
///
/// Acceptance Criteria:
/// - The first fetch happens immediately, not after one interval
/// - One fetch per interval afterwards
/// - New listings replace old ones wholesale
#[tokio::test(start_paused = true)]
async fn test_first_fetch_is_immediate_then_every_interval() {
    // Given a provider with a 10s interval
    let source = FakeSource::new(standard_inventory());
    let provider =
        InstancesProvider::start(options(), source.clone(), Arc::new(StaticIdentity::none()))
            .await
            .unwrap();

    // When no interval has elapsed yet
    settle().await;

    // Then the cache is already populated
    assert_eq!(source.calls(), 1);
    assert_eq!(provider.cache().len(), 5);

    // And each interval brings one more fetch
    tokio::time::sleep(Duration::from_secs(35)).await;
    assert_eq!(source.calls(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_new_listing_replaces_old() {
    let source = FakeSource::new(vec![web_instance(), private_only_instance()]);
    let provider =
        InstancesProvider::start(options(), source.clone(), Arc::new(StaticIdentity::none()))
            .await
            .unwrap();
    settle().await;
    assert_eq!(provider.cache().list(), vec!["web-1", "db-1"]);

    source.set_instances(vec![dual_nic_instance()]);
    tokio::time::sleep(RE_EVAL).await;

    assert_eq!(provider.cache().list(), vec!["router-1"]);
    assert!(provider.cache().get("web-1").is_none());
}

/// User Story: C2 - Stale Over Empty
///
/// As a probe runner
/// I want inventory outages to leave the last good listing in place
/// So that a flaky API never makes all my targets disappear
///
/// Acceptance Criteria:
/// - A failed fetch leaves list() and resolve() unchanged
/// - The next successful fetch takes effect normally
#[tokio::test(start_paused = true)]
async fn test_failed_refresh_keeps_last_good_snapshot() {
    // Given a populated cache
    let source = FakeSource::new(standard_inventory());
    let provider = Arc::new(
        InstancesProvider::start(options(), source.clone(), Arc::new(StaticIdentity::none()))
            .await
            .unwrap(),
    );
    let instances = Instances::new(
        AddressingRequest::interface(0, IpType::Public),
        provider.clone(),
        None,
    )
    .unwrap();
    settle().await;

    let names_before = instances.list();
    let ip_before = instances.resolve("web-1", IpVersion::Any).await.unwrap();

    // When the inventory source starts failing
    source.set_failing(true);
    tokio::time::sleep(RE_EVAL * 2).await;
    assert_eq!(source.calls(), 3);

    // Then callers see exactly what they saw before
    assert_eq!(instances.list(), names_before);
    assert_eq!(instances.resolve("web-1", IpVersion::Any).await.unwrap(), ip_before);

    // And recovery publishes the new listing
    source.set_failing(false);
    source.set_instances(vec![private_only_instance()]);
    tokio::time::sleep(RE_EVAL).await;
    assert_eq!(instances.list(), vec!["db-1"]);
}

#[tokio::test(start_paused = true)]
async fn test_failing_first_fetch_leaves_cache_empty() {
    let source = FakeSource::new(standard_inventory());
    source.set_failing(true);

    let provider =
        InstancesProvider::start(options(), source.clone(), Arc::new(StaticIdentity::none()))
            .await
            .unwrap();
    settle().await;

    assert_eq!(source.calls(), 1);
    assert!(provider.cache().is_empty());
    assert!(provider.cache().refreshed_at().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_self_never_listed_after_refreshes() {
    let source = FakeSource::new(standard_inventory());
    let provider = InstancesProvider::start(
        options(),
        source.clone(),
        Arc::new(StaticIdentity::named("prober-0")),
    )
    .await
    .unwrap();

    for _ in 0..3 {
        settle().await;
        assert!(!provider.cache().list().iter().any(|n| n == "prober-0"));
        tokio::time::sleep(RE_EVAL).await;
    }
    assert_eq!(provider.cache().len(), 4);
}

/// User Story: C3 - One Cache per Process
///
/// As a probe runner
/// I want every probe to share one instance cache
/// So that ten probes cost one API listing per interval, not ten
///
/// Acceptance Criteria:
/// - Concurrent construction starts exactly one refresh loop
/// - All facades observe the same provider
#[tokio::test(start_paused = true)]
async fn test_concurrent_construction_starts_one_loop() {
    // Given one shared holder and many probes starting at once
    let shared = Arc::new(SharedInstancesProvider::new());
    let source = FakeSource::new(standard_inventory());

    let mut handles = Vec::new();
    for i in 0..16u32 {
        let shared = shared.clone();
        let source = source.clone();
        let ip_type = [IpType::Private, IpType::Public, IpType::Alias][(i % 3) as usize];
        handles.push(tokio::spawn(async move {
            Instances::with_shared(
                AddressingRequest::interface(0, ip_type),
                &shared,
                options(),
                source,
                Arc::new(StaticIdentity::none()),
                None,
            )
            .await
            .unwrap()
        }));
    }

    let mut facades = Vec::new();
    for handle in handles {
        facades.push(handle.await.unwrap());
    }

    // Then they all share one provider
    let first = facades[0].provider().clone();
    assert!(facades.iter().all(|f| Arc::ptr_eq(f.provider(), &first)));

    // And the source sees one fetch per tick
    tokio::time::sleep(RE_EVAL * 2 + Duration::from_secs(5)).await;
    assert_eq!(source.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_stops_refreshing_but_keeps_serving() {
    let source = FakeSource::new(standard_inventory());
    let provider =
        InstancesProvider::start(options(), source.clone(), Arc::new(StaticIdentity::none()))
            .await
            .unwrap();
    settle().await;

    provider.shutdown().await;
    tokio::time::sleep(RE_EVAL * 10).await;

    assert_eq!(source.calls(), 1);
    assert!(provider.is_stopped());
    assert_eq!(provider.cache().len(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_provider_stops_loop() {
    let source = FakeSource::new(standard_inventory());
    let provider =
        InstancesProvider::start(options(), source.clone(), Arc::new(StaticIdentity::none()))
            .await
            .unwrap();
    settle().await;

    drop(provider);
    tokio::time::sleep(RE_EVAL * 5).await;

    assert_eq!(source.calls(), 1);
}
