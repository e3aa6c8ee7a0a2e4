// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! pk-core: Shared library for the pocket ledger sync client and server
//!
//! This crate provides the queue item model, the batch sync wire protocol,
//! and the durable queue store used by both the `pocket` client and the
//! `pk-remote` reference server.

pub mod clock;
pub mod db;
pub mod error;
pub mod item;
pub mod protocol;
pub mod store;

pub use clock::{ClockSource, ManualClock, MonotonicClock, SystemClock};
pub use db::SqliteQueueStore;
pub use error::{Error, Result};
pub use item::{parse_payload, EntityType, Operation, Payload, QueueItem, QueueStatus};
pub use protocol::{ResultStatus, SyncOperation, SyncRequest, SyncResponse, SyncResult};
pub use store::{MemoryQueueStore, QueueStore};
