// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the queue manager.

#![allow(clippy::unwrap_used)]

use super::queue::QueueManager;
use pk_core::{
    EntityType, ManualClock, MemoryQueueStore, Operation, Payload, QueueItem, QueueStatus,
    QueueStore, SqliteQueueStore,
};
use std::sync::Arc;
use serde_json::json;
use tempfile::tempdir;

fn payload(value: serde_json::Value) -> Option<Payload> {
    value.as_object().cloned()
}

fn manager() -> (QueueManager<MemoryQueueStore>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(1_700_000_000_000));
    let queue = QueueManager::with_clock(MemoryQueueStore::new(), clock.clone());
    (queue, clock)
}

fn ids(items: &[QueueItem]) -> Vec<String> {
    items.iter().map(|i| i.id.clone()).collect()
}

#[test]
fn enqueue_creates_pending_item() {
    let (queue, _) = manager();
    let id = queue
        .enqueue(
            Operation::Create,
            EntityType::Transaction,
            "tx-1",
            payload(json!({"amount": -42.5, "memo": "coffee"})),
        )
        .unwrap();

    let pending = queue.pending_items().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, id);
    assert_eq!(pending[0].status, QueueStatus::Pending);
    assert_eq!(pending[0].entity_id, "tx-1");
    assert_eq!(pending[0].payload.as_ref().unwrap()["memo"], "coffee");
}

#[test]
fn enqueue_generates_distinct_ids() {
    let (queue, _) = manager();
    let a = queue
        .enqueue(Operation::Delete, EntityType::Category, "c-1", None)
        .unwrap();
    let b = queue
        .enqueue(Operation::Delete, EntityType::Category, "c-1", None)
        .unwrap();
    assert_ne!(a, b);
    assert!(uuid::Uuid::parse_str(&a).is_ok());
}

#[test]
fn enqueue_rejects_invalid_payload() {
    let (queue, _) = manager();
    assert!(queue
        .enqueue(Operation::Update, EntityType::Transaction, "tx-1", None)
        .is_err());
    assert!(queue
        .enqueue(
            Operation::Delete,
            EntityType::Transaction,
            "tx-1",
            payload(json!({"x": 1}))
        )
        .is_err());
    assert!(queue
        .enqueue(
            Operation::Create,
            EntityType::Transaction,
            "",
            payload(json!({"x": 1}))
        )
        .is_err());
    assert_eq!(queue.all_items().unwrap().len(), 0);
}

#[test]
fn items_stay_in_enqueue_order_when_clock_goes_backwards() {
    let (queue, clock) = manager();
    let first = queue
        .enqueue(Operation::Delete, EntityType::Transaction, "tx-1", None)
        .unwrap();
    clock.set(1_000);
    let second = queue
        .enqueue(Operation::Delete, EntityType::Transaction, "tx-2", None)
        .unwrap();
    let third = queue
        .enqueue(Operation::Delete, EntityType::Transaction, "tx-3", None)
        .unwrap();

    let pending = queue.pending_items().unwrap();
    assert_eq!(ids(&pending), vec![first, second, third]);
    assert!(pending[0].created_at <= pending[1].created_at);
}

#[test]
fn mark_syncing_then_failed() {
    let (queue, _) = manager();
    let id = queue
        .enqueue(Operation::Delete, EntityType::Transaction, "tx-1", None)
        .unwrap();

    // Cannot fail an item that is not syncing
    assert_eq!(queue.mark_failed(&[id.clone()]).unwrap(), 0);

    assert_eq!(queue.mark_syncing(&[id.clone()]).unwrap(), 1);
    assert_eq!(queue.pending_count().unwrap(), 0);
    assert_eq!(queue.mark_failed(&[id.clone()]).unwrap(), 1);

    let failed = queue.failed_items().unwrap();
    assert_eq!(ids(&failed), vec![id]);
}

#[test]
fn mark_syncing_skips_unknown_ids() {
    let (queue, _) = manager();
    assert_eq!(queue.mark_syncing(&["ghost".to_string()]).unwrap(), 0);
}

#[test]
fn dequeue_is_idempotent() {
    let (queue, _) = manager();
    let id = queue
        .enqueue(Operation::Delete, EntityType::Transaction, "tx-1", None)
        .unwrap();
    queue.dequeue(&id).unwrap();
    queue.dequeue(&id).unwrap();
    assert!(queue.all_items().unwrap().is_empty());
}

#[test]
fn retry_failed_returns_items_to_pending() {
    let (queue, _) = manager();
    let a = queue
        .enqueue(Operation::Delete, EntityType::Transaction, "tx-1", None)
        .unwrap();
    let b = queue
        .enqueue(Operation::Delete, EntityType::Transaction, "tx-2", None)
        .unwrap();
    queue.claim_pending().unwrap();
    queue.mark_failed(&[a.clone(), b.clone()]).unwrap();
    assert_eq!(queue.failed_count().unwrap(), 2);

    assert_eq!(queue.retry_failed().unwrap(), 2);
    assert_eq!(queue.failed_count().unwrap(), 0);
    assert_eq!(ids(&queue.pending_items().unwrap()), vec![a, b]);

    assert_eq!(queue.retry_failed().unwrap(), 0);
}

#[test]
fn retry_failed_leaves_pending_and_syncing_alone() {
    let (queue, _) = manager();
    let syncing = queue
        .enqueue(Operation::Delete, EntityType::Transaction, "tx-1", None)
        .unwrap();
    let failed = queue
        .enqueue(Operation::Delete, EntityType::Transaction, "tx-2", None)
        .unwrap();
    queue.mark_syncing(&[syncing.clone(), failed.clone()]).unwrap();
    queue.mark_failed(&[failed.clone()]).unwrap();
    let pending = queue
        .enqueue(Operation::Delete, EntityType::Transaction, "tx-3", None)
        .unwrap();

    assert_eq!(queue.retry_failed().unwrap(), 1);

    let all = queue.all_items().unwrap();
    let status_of = |id: &str| all.iter().find(|i| i.id == id).unwrap().status;
    assert_eq!(status_of(&syncing), QueueStatus::Syncing);
    assert_eq!(status_of(&failed), QueueStatus::Pending);
    assert_eq!(status_of(&pending), QueueStatus::Pending);

    let pending_ids = ids(&queue.pending_items().unwrap());
    assert!(!pending_ids.contains(&syncing));
    assert_eq!(pending_ids.len(), 2);
}

#[test]
fn claim_pending_takes_a_snapshot() {
    let (queue, _) = manager();
    queue
        .enqueue(Operation::Delete, EntityType::Transaction, "tx-1", None)
        .unwrap();
    let batch = queue.claim_pending().unwrap();
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].status, QueueStatus::Syncing);

    queue
        .enqueue(Operation::Delete, EntityType::Transaction, "tx-2", None)
        .unwrap();
    assert_eq!(queue.pending_count().unwrap(), 1);
    assert!(queue.has_pending().unwrap());

    // A second claim only sees the item added afterwards
    let next = queue.claim_pending().unwrap();
    assert_eq!(next.len(), 1);
    assert_eq!(next[0].entity_id, "tx-2");
}

#[test]
fn settle_removes_and_fails() {
    let (queue, _) = manager();
    let ok = queue
        .enqueue(Operation::Delete, EntityType::Transaction, "tx-1", None)
        .unwrap();
    let bad = queue
        .enqueue(Operation::Delete, EntityType::Transaction, "tx-2", None)
        .unwrap();
    queue.claim_pending().unwrap();

    queue.settle(&[ok], &[bad.clone()]).unwrap();

    let all = queue.all_items().unwrap();
    assert_eq!(ids(&all), vec![bad]);
    assert_eq!(all[0].status, QueueStatus::Failed);
}

#[test]
fn recover_interrupted_fails_in_flight_items() {
    let (queue, _) = manager();
    queue
        .enqueue(Operation::Delete, EntityType::Transaction, "tx-1", None)
        .unwrap();
    queue.claim_pending().unwrap();
    queue
        .enqueue(Operation::Delete, EntityType::Transaction, "tx-2", None)
        .unwrap();

    assert_eq!(queue.recover_interrupted().unwrap(), 1);
    assert_eq!(queue.failed_count().unwrap(), 1);
    assert_eq!(queue.pending_count().unwrap(), 1);
    assert_eq!(queue.recover_interrupted().unwrap(), 0);
}

#[test]
fn clear_and_clear_synced() {
    let mut store = MemoryQueueStore::new();
    let done = QueueItem::new(
        "done".into(),
        Operation::Delete,
        EntityType::Transaction,
        "tx-0".into(),
        None,
        pk_core::clock::millis_to_datetime(1),
    )
    .unwrap();
    store.add(&done).unwrap();
    store.update("done", QueueStatus::Success).unwrap();

    let queue = QueueManager::new(store);
    queue
        .enqueue(Operation::Delete, EntityType::Transaction, "tx-1", None)
        .unwrap();

    assert_eq!(queue.clear_synced().unwrap(), 1);
    assert_eq!(queue.all_items().unwrap().len(), 1);

    queue.clear().unwrap();
    assert!(queue.all_items().unwrap().is_empty());
    assert!(!queue.has_pending().unwrap());
}

#[test]
fn queue_survives_restart() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("queue.db");

    let id = {
        let queue = QueueManager::new(SqliteQueueStore::open(&path).unwrap());
        queue
            .enqueue(
                Operation::Update,
                EntityType::Category,
                "cat-1",
                payload(json!({"name": "Rent"})),
            )
            .unwrap()
    };

    let queue = QueueManager::new(SqliteQueueStore::open(&path).unwrap());
    let pending = queue.pending_items().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, id);
    assert_eq!(pending[0].payload.as_ref().unwrap()["name"], "Rent");
}

#[test]
fn enqueue_order_holds_across_restart_when_clock_goes_backwards() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("queue.db");
    let clock = Arc::new(ManualClock::new(2_000_000));

    let create = {
        let queue = QueueManager::with_clock(SqliteQueueStore::open(&path).unwrap(), clock.clone());
        queue
            .enqueue(
                Operation::Create,
                EntityType::Transaction,
                "tx-1",
                payload(json!({"amount": 10})),
            )
            .unwrap()
    };

    // Wall clock stepped back between invocations
    clock.set(1_000_000);
    let queue = QueueManager::with_clock(SqliteQueueStore::open(&path).unwrap(), clock.clone());
    let update = queue
        .enqueue(
            Operation::Update,
            EntityType::Transaction,
            "tx-1",
            payload(json!({"amount": 12})),
        )
        .unwrap();

    let pending = queue.pending_items().unwrap();
    assert_eq!(ids(&pending), vec![create, update]);
    assert!(pending[0].created_at <= pending[1].created_at);
}
