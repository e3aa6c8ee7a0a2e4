// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for connectivity-driven sync.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Notify};

use super::auto::{check_and_sync, sync_status, AutoSync, CheckOutcome, SyncEvent, SyncStatus};
use super::monitor::ConnectivityMonitor;
use crate::sync::test_helpers::{enqueue_update, make_engine};
use crate::sync::transport_tests::MockReply;
use crate::sync::SyncSummary;

async fn next_event(rx: &mut mpsc::Receiver<SyncEvent>) -> SyncEvent {
    tokio::time::timeout(Duration::from_secs(10), rx.recv())
        .await
        .expect("timed out waiting for auto-sync event")
        .expect("auto-sync channel closed")
}

#[tokio::test]
async fn test_check_and_sync_offline_leaves_queue() {
    let (engine, queue, transport) = make_engine();
    enqueue_update(&queue, "tx-1", 1.0);
    let monitor = ConnectivityMonitor::new(false);

    let outcome = check_and_sync(&monitor, &engine).await.unwrap();

    assert_eq!(outcome, CheckOutcome::Offline);
    assert!(outcome.is_success());
    assert_eq!(queue.pending_count().unwrap(), 1);
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn test_check_and_sync_idle_when_nothing_pending() {
    let (engine, _queue, transport) = make_engine();
    let monitor = ConnectivityMonitor::new(true);

    let outcome = check_and_sync(&monitor, &engine).await.unwrap();

    assert_eq!(outcome, CheckOutcome::Idle);
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn test_check_and_sync_runs_cycle() {
    let (engine, queue, _transport) = make_engine();
    enqueue_update(&queue, "tx-1", 1.0);
    let monitor = ConnectivityMonitor::new(true);

    let outcome = check_and_sync(&monitor, &engine).await.unwrap();

    match outcome {
        CheckOutcome::Completed(summary) => {
            assert_eq!(summary.synced, 1);
            assert_eq!(summary.total, 1);
        }
        other => panic!("expected a completed cycle, got {other:?}"),
    }
    assert!(outcome.is_success());
    assert!(!queue.has_pending().unwrap());
}

#[tokio::test]
async fn test_check_and_sync_busy_during_cycle() {
    let (engine, queue, transport) = make_engine();
    enqueue_update(&queue, "tx-1", 1.0);
    let gate = Arc::new(Notify::new());
    transport.queue_reply(MockReply::AcceptAfter(gate.clone()));
    let monitor = ConnectivityMonitor::new(true);

    let first = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.sync_pending().await })
    };
    while !engine.is_syncing() {
        tokio::task::yield_now().await;
    }
    // Something new arrives while the first cycle is in flight
    enqueue_update(&queue, "tx-2", 2.0);

    let outcome = check_and_sync(&monitor, &engine).await.unwrap();
    assert_eq!(outcome, CheckOutcome::Busy);

    gate.notify_one();
    first.await.unwrap().unwrap();
    assert_eq!(queue.pending_count().unwrap(), 1);
}

#[test]
fn test_outcome_success_reflects_failures() {
    let failed = CheckOutcome::Completed(SyncSummary {
        synced: 1,
        failed: 1,
        total: 2,
        conflicts: 0,
        attempts: 1,
    });
    assert!(!failed.is_success());
    assert!(CheckOutcome::Busy.is_success());
}

#[test]
fn test_sync_status_snapshot() {
    let (_engine, queue, _transport) = make_engine();
    let monitor = ConnectivityMonitor::new(false);
    enqueue_update(&queue, "tx-1", 1.0);
    enqueue_update(&queue, "tx-2", 2.0);
    monitor.set_online(true);

    let status = sync_status(&queue, &monitor).unwrap();

    assert_eq!(
        status,
        SyncStatus {
            has_pending: true,
            pending_count: 2,
            failed_count: 0,
            is_online: true,
        }
    );
    // Reading status does not consume the back-online flag
    assert!(monitor.current_status().was_offline);
}

#[tokio::test]
async fn test_auto_sync_fires_on_reconnect() {
    let (engine, queue, transport) = make_engine();
    let monitor = ConnectivityMonitor::new(false);
    let (auto, mut events) = AutoSync::spawn(engine.clone(), monitor.clone(), None);

    enqueue_update(&queue, "tx-1", 1.0);
    enqueue_update(&queue, "tx-2", 2.0);
    assert_eq!(transport.request_count(), 0);

    monitor.set_online(true);

    match next_event(&mut events).await {
        SyncEvent::Checked(CheckOutcome::Completed(summary)) => assert_eq!(summary.synced, 2),
        other => panic!("unexpected event {other:?}"),
    }
    assert!(queue.all_items().unwrap().is_empty());
    assert_eq!(transport.request_count(), 1);

    auto.shutdown().await;
    assert_eq!(monitor.subscriber_count(), 0);
}

#[tokio::test]
async fn test_auto_sync_manual_trigger() {
    let (engine, queue, _transport) = make_engine();
    let monitor = ConnectivityMonitor::new(true);
    let (auto, mut events) = AutoSync::spawn(engine, monitor, None);

    enqueue_update(&queue, "tx-1", 1.0);
    auto.trigger();

    assert!(matches!(
        next_event(&mut events).await,
        SyncEvent::Checked(CheckOutcome::Completed(_))
    ));
    auto.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_auto_sync_periodic_sweep() {
    let (engine, queue, _transport) = make_engine();
    let monitor = ConnectivityMonitor::new(true);
    let (auto, mut events) = AutoSync::spawn(engine, monitor, Some(Duration::from_secs(5)));

    enqueue_update(&queue, "tx-1", 1.0);

    assert!(matches!(
        next_event(&mut events).await,
        SyncEvent::Checked(CheckOutcome::Completed(_))
    ));
    assert!(!queue.has_pending().unwrap());
    auto.shutdown().await;
}
