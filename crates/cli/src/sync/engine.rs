// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync engine draining the offline queue into the remote ledger.
//!
//! One call to [`SyncEngine::sync_pending`] is one cycle:
//!
//! ```text
//! Idle -> Batching -> Submitting -> Reconciling -> Idle
//!                        |    ^
//!                        v    |
//!                      Retrying   (up to max_attempts, delay = base * attempt)
//! ```
//!
//! At most one cycle runs at a time per engine. A cycle claims every pending
//! item up front, so items enqueued while it runs wait for the next cycle.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pk_core::{QueueItem, QueueStore, ResultStatus, SyncRequest, SyncResponse, SyncResult};
use serde::Serialize;

use super::queue::QueueManager;
use super::transport::{Transport, TransportError, TransportResult};

/// Configuration for the sync engine.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Submission attempts per cycle before the batch is failed.
    pub max_attempts: u32,
    /// Delay before retry `n` is `base_delay * n`.
    pub base_delay: Duration,
    /// Upper bound on a single submission.
    pub request_timeout: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Error type for sync engine operations.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Queue store error.
    #[error("queue error: {0}")]
    Queue(#[from] pk_core::Error),

    /// Another cycle is already running on this engine.
    #[error("a sync cycle is already in progress")]
    CycleInProgress,
}

/// Result type for sync engine operations.
pub type SyncOutcome<T> = Result<T, SyncError>;

/// Where the engine is within a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "phase")]
pub enum SyncPhase {
    /// No cycle running.
    Idle,
    /// Claiming pending items.
    Batching,
    /// Waiting on the remote.
    Submitting { attempt: u32 },
    /// Backing off after a failed attempt.
    Retrying { attempt: u32 },
    /// Applying per-operation results.
    Reconciling,
}

/// Counts produced by one sync cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    /// Items removed from the queue.
    pub synced: usize,
    /// Items moved to failed.
    pub failed: usize,
    /// Items claimed by the cycle.
    pub total: usize,
    /// Synced items the remote resolved against its own copy.
    pub conflicts: usize,
    /// Submission attempts made.
    pub attempts: u32,
}

impl SyncSummary {
    /// True when every claimed item synced.
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// Drains the queue through a [`Transport`].
pub struct SyncEngine<S: QueueStore, T: Transport> {
    queue: Arc<QueueManager<S>>,
    transport: T,
    config: SyncConfig,
    cycle: tokio::sync::Mutex<()>,
    phase: Mutex<SyncPhase>,
}

impl<S: QueueStore, T: Transport> SyncEngine<S, T> {
    /// Create a new engine with default configuration.
    pub fn new(queue: Arc<QueueManager<S>>, transport: T) -> Self {
        Self::with_config(queue, transport, SyncConfig::default())
    }

    /// Create a new engine with custom configuration.
    pub fn with_config(queue: Arc<QueueManager<S>>, transport: T, config: SyncConfig) -> Self {
        SyncEngine {
            queue,
            transport,
            config,
            cycle: tokio::sync::Mutex::new(()),
            phase: Mutex::new(SyncPhase::Idle),
        }
    }

    /// The queue this engine drains.
    pub fn queue(&self) -> &Arc<QueueManager<S>> {
        &self.queue
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Current cycle phase.
    pub fn phase(&self) -> SyncPhase {
        *self.phase.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Whether a cycle is running right now.
    pub fn is_syncing(&self) -> bool {
        self.phase() != SyncPhase::Idle
    }

    fn set_phase(&self, phase: SyncPhase) {
        *self.phase.lock().unwrap_or_else(|e| e.into_inner()) = phase;
    }

    /// Run one sync cycle over every pending item.
    ///
    /// Returns [`SyncError::CycleInProgress`] without touching the queue if
    /// a cycle is already running. Items left syncing by an earlier cycle
    /// are marked failed before the new batch is claimed, so engines sharing
    /// one store across processes must serialize their cycles. Transport failures never surface here:
    /// they are retried and, once attempts run out, the whole batch is
    /// marked failed and reported in the summary.
    pub async fn sync_pending(&self) -> SyncOutcome<SyncSummary> {
        let _cycle = self
            .cycle
            .try_lock()
            .map_err(|_| SyncError::CycleInProgress)?;

        let result = self.run_cycle().await;
        self.set_phase(SyncPhase::Idle);
        result
    }

    async fn run_cycle(&self) -> SyncOutcome<SyncSummary> {
        self.set_phase(SyncPhase::Batching);
        // With the cycle lock held, anything still syncing was stranded by an
        // earlier cycle whose settle failed
        self.queue.recover_interrupted()?;
        let batch = self.queue.claim_pending()?;
        if batch.is_empty() {
            tracing::debug!("nothing to sync");
            return Ok(SyncSummary::default());
        }

        let request = SyncRequest::from_items(&batch);
        let max_attempts = self.config.max_attempts.max(1);
        tracing::info!(count = batch.len(), "sync cycle started");

        let mut attempt = 0;
        loop {
            attempt += 1;
            self.set_phase(SyncPhase::Submitting { attempt });

            match self.submit(&request).await {
                Ok(response) => {
                    self.set_phase(SyncPhase::Reconciling);
                    let mut summary = self.reconcile(&batch, &response)?;
                    summary.attempts = attempt;
                    tracing::info!(
                        synced = summary.synced,
                        failed = summary.failed,
                        conflicts = summary.conflicts,
                        "sync cycle finished"
                    );
                    return Ok(summary);
                }
                Err(e) if attempt >= max_attempts => {
                    tracing::error!(attempt, error = %e, "sync attempts exhausted, batch failed");
                    let ids: Vec<String> = batch.iter().map(|i| i.id.clone()).collect();
                    self.queue.settle(&[], &ids)?;
                    return Ok(SyncSummary {
                        synced: 0,
                        failed: batch.len(),
                        total: batch.len(),
                        conflicts: 0,
                        attempts: attempt,
                    });
                }
                Err(e) => {
                    let delay = self.config.base_delay * attempt;
                    tracing::warn!(attempt, error = %e, ?delay, "sync attempt failed, retrying");
                    self.set_phase(SyncPhase::Retrying { attempt });
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    async fn submit(&self, request: &SyncRequest) -> TransportResult<SyncResponse> {
        match tokio::time::timeout(self.config.request_timeout, self.transport.submit(request))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout(self.config.request_timeout)),
        }
    }

    /// Match results to the batch by operation id and settle the queue.
    fn reconcile(&self, batch: &[QueueItem], response: &SyncResponse) -> SyncOutcome<SyncSummary> {
        let submitted: HashSet<&str> = batch.iter().map(|i| i.id.as_str()).collect();
        let mut outcomes: HashMap<&str, &SyncResult> = HashMap::new();

        for result in &response.results {
            let id = result.operation_id.as_str();
            if !submitted.contains(id) {
                tracing::warn!(operation_id = id, "result for unknown operation ignored");
                continue;
            }
            if outcomes.contains_key(id) {
                tracing::warn!(operation_id = id, "duplicate result ignored");
                continue;
            }
            outcomes.insert(id, result);
        }

        let mut summary = SyncSummary {
            total: batch.len(),
            ..SyncSummary::default()
        };
        let mut synced = Vec::new();
        let mut failed = Vec::new();

        for item in batch {
            match outcomes.get(item.id.as_str()) {
                Some(result) if result.status.is_settled() => {
                    if result.status == ResultStatus::ConflictResolved {
                        tracing::info!(
                            operation_id = %item.id,
                            entity_id = %item.entity_id,
                            "remote resolved conflict"
                        );
                        summary.conflicts += 1;
                    }
                    synced.push(item.id.clone());
                }
                Some(result) => {
                    tracing::error!(
                        operation_id = %item.id,
                        entity_id = %item.entity_id,
                        error = result.error.as_deref().unwrap_or("unknown error"),
                        "remote rejected operation"
                    );
                    failed.push(item.id.clone());
                }
                None => {
                    tracing::warn!(operation_id = %item.id, "no result for operation, marked failed");
                    failed.push(item.id.clone());
                }
            }
        }

        self.queue.settle(&synced, &failed)?;
        summary.synced = synced.len();
        summary.failed = failed.len();
        Ok(summary)
    }
}
