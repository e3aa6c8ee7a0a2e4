// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for sync module tests.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use pk_core::{EntityType, ManualClock, MemoryQueueStore, Operation, SyncResponse, SyncResult};

use super::engine::{SyncConfig, SyncEngine};
use super::queue::QueueManager;
use super::transport_tests::MockTransport;

pub type TestQueue = Arc<QueueManager<MemoryQueueStore>>;
pub type TestEngine = SyncEngine<MemoryQueueStore, MockTransport>;

/// A queue backed by memory with a fixed clock.
pub fn make_queue() -> TestQueue {
    let clock = Arc::new(ManualClock::new(1_700_000_000_000));
    Arc::new(QueueManager::with_clock(MemoryQueueStore::new(), clock))
}

/// Config with short, deterministic delays.
pub fn fast_config() -> SyncConfig {
    SyncConfig {
        max_attempts: 3,
        base_delay: Duration::from_millis(100),
        request_timeout: Duration::from_secs(5),
    }
}

/// An engine over a fresh queue and a scriptable mock transport.
pub fn make_engine() -> (Arc<TestEngine>, TestQueue, MockTransport) {
    let queue = make_queue();
    let transport = MockTransport::new();
    let engine = SyncEngine::with_config(queue.clone(), transport.clone(), fast_config());
    (Arc::new(engine), queue, transport)
}

/// Queue an update of transaction `entity_id`, returning the operation id.
pub fn enqueue_update(queue: &TestQueue, entity_id: &str, amount: f64) -> String {
    let payload = serde_json::json!({ "amount": amount });
    queue
        .enqueue(
            Operation::Update,
            EntityType::Transaction,
            entity_id,
            payload.as_object().cloned(),
        )
        .unwrap()
}

/// Build a response from results, stamped now.
pub fn response(results: Vec<SyncResult>) -> SyncResponse {
    SyncResponse {
        results,
        server_timestamp: chrono::Utc::now(),
    }
}
