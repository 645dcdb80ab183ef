//! Integration Test: configuration file edits flow through the sync cycle into the timers

use crate::support::{monitor_for, write_config, ScriptedProbe, TWO_ENDPOINTS};
use apiwatch::schedule::{RebuildReason, SyncOutcome};
use apiwatch::shutdown::ShutdownController;
use apiwatch_common::types::{Endpoint, TestStatus};
use serde_json::Value;
use std::time::Duration;

fn intervals(monitor: &apiwatch::monitor::Monitor) -> Vec<(String, u64)> {
    monitor
        .scheduler()
        .snapshot()
        .into_iter()
        .map(|t| (t.name, t.interval_minutes))
        .collect()
}

/// paused clock: sleeping runs every ready task first
async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

#[tokio::test(start_paused = true)]
async fn test_startup_arms_timers_with_effective_intervals() {
    let (_dir, path) = write_config(TWO_ENDPOINTS);
    let probe = ScriptedProbe::new();
    let monitor = monitor_for(&path, probe.clone());
    let shutdown = ShutdownController::default();

    let sync_loop = monitor.start(Duration::from_secs(300), shutdown.clone()).await;
    settle().await;

    assert_eq!(
        intervals(&monitor),
        vec![("relay-a".to_string(), 5), ("relay-b".to_string(), 10)]
    );
    // one immediate test per endpoint
    assert_eq!(probe.calls(), 2);
    assert!(monitor
        .get_results()
        .await
        .iter()
        .all(|r| r.status == TestStatus::Online));

    // relay-a fires again after five minutes, relay-b is not due yet
    tokio::time::sleep(Duration::from_secs(5 * 60)).await;
    settle().await;
    assert_eq!(probe.calls(), 3);

    shutdown.request_shutdown();
    sync_loop.await.unwrap();
    assert_eq!(monitor.scheduler().timer_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_interval_edit_is_picked_up_on_next_cycle() {
    let (_dir, path) = write_config(TWO_ENDPOINTS);
    let monitor = monitor_for(&path, ScriptedProbe::new());
    let shutdown = ShutdownController::default();
    let sync_loop = monitor.start(Duration::from_secs(300), shutdown.clone()).await;

    let mut doc: Value = serde_json::from_str(TWO_ENDPOINTS).unwrap();
    doc["endpoints"][0]["testInterval"] = Value::from(2);
    std::fs::write(&path, serde_json::to_string_pretty(&doc).unwrap()).unwrap();

    // nothing changes before the cycle fires
    tokio::time::sleep(Duration::from_secs(299)).await;
    assert_eq!(intervals(&monitor)[0].1, 5);

    tokio::time::sleep(Duration::from_secs(2)).await;
    settle().await;
    assert_eq!(
        intervals(&monitor),
        vec![("relay-a".to_string(), 2), ("relay-b".to_string(), 10)]
    );

    shutdown.request_shutdown();
    sync_loop.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_broken_file_keeps_previous_configuration_and_timers() {
    let (_dir, path) = write_config(TWO_ENDPOINTS);
    let monitor = monitor_for(&path, ScriptedProbe::new());
    monitor.load_config().await.unwrap();
    monitor.start_all_timers().await;
    let before = monitor.scheduler().snapshot();

    std::fs::write(&path, "{ \"endpoints\": [").unwrap();
    assert_eq!(monitor.sync_once().await, SyncOutcome::LoadFailed);
    assert_eq!(monitor.scheduler().snapshot(), before);
    assert_eq!(monitor.get_results().await.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_registered_endpoint_gets_timer_on_next_sync() {
    let (_dir, path) = write_config(TWO_ENDPOINTS);
    let monitor = monitor_for(&path, ScriptedProbe::new());
    monitor.load_config().await.unwrap();
    monitor.start_all_timers().await;

    monitor
        .register_endpoint(Endpoint {
            name: "relay-c".to_string(),
            api_base: "https://relay-c.example.com".to_string(),
            api_key: "sk-relay-c".to_string(),
            test_interval: Some(1),
            invite_link: None,
        })
        .await
        .unwrap();
    settle().await;
    assert_eq!(monitor.scheduler().timer_count(), 2);

    assert_eq!(
        monitor.sync_once().await,
        SyncOutcome::Rebuilt(RebuildReason::EndpointCountChanged {
            running: 2,
            configured: 3
        })
    );
    assert_eq!(monitor.scheduler().timer_count(), 3);
    assert_eq!(monitor.sync_once().await, SyncOutcome::Unchanged);
}

#[tokio::test(start_paused = true)]
async fn test_removed_endpoint_disappears_from_results() {
    let (_dir, path) = write_config(TWO_ENDPOINTS);
    let monitor = monitor_for(&path, ScriptedProbe::new());
    monitor.test_all_endpoints().await;
    assert_eq!(monitor.get_results().await.len(), 2);

    let mut doc: Value = serde_json::from_str(TWO_ENDPOINTS).unwrap();
    doc["endpoints"].as_array_mut().unwrap().remove(0);
    std::fs::write(&path, doc.to_string()).unwrap();

    monitor.sync_once().await;
    let results = monitor.get_results().await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].name, "relay-b");
}
