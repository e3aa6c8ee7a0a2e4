// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline queue and batch sync with the remote ledger.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Engine    │────►│  Transport  │────►│   Remote    │
//! │ (SyncEngine)│◄────│   (trait)   │◄────│   Ledger    │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │   Queue     │  (durable, FIFO)
//! │ (QueueMgr)  │
//! └─────────────┘
//! ```
//!
//! # Features
//!
//! - Durable FIFO queue of create/update/delete mutations
//! - One batch request per cycle, results matched by operation id
//! - Linear backoff retries with a per-request timeout
//! - Single-flight cycles
//! - Injectable transport trait for testing

mod engine;
mod queue;
mod transport;

pub use engine::{SyncConfig, SyncEngine, SyncError, SyncOutcome, SyncPhase, SyncSummary};
pub use queue::QueueManager;
pub use transport::{HttpTransport, Transport, TransportError, TransportResult, SYNC_PATH};

#[cfg(test)]
pub(crate) mod test_helpers;



#[cfg(test)]
mod queue_tests;
