// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline queue of deferred ledger mutations.
//!
//! [`QueueManager`] sits between callers and a [`QueueStore`]. It stamps new
//! items with a fresh id and a monotonic creation time, and it is the only
//! place that moves items between statuses:
//!
//! ```text
//! PENDING --claim--> SYNCING --settle--> (removed) | FAILED
//!    ^                                                 |
//!    +--------------------- retry ---------------------+
//! ```
//!
//! Every method takes `&self`; the store sits behind a mutex so a manager can
//! be shared between the sync engine and command handlers.

use std::sync::{Arc, Mutex, MutexGuard};

use pk_core::{
    ClockSource, EntityType, MonotonicClock, Operation, Payload, QueueItem, QueueStatus,
    QueueStore, Result, SystemClock,
};

/// Coordinates queue items over a durable store.
pub struct QueueManager<S: QueueStore> {
    store: Mutex<S>,
    clock: MonotonicClock<Arc<dyn ClockSource>>,
}

impl<S: QueueStore> QueueManager<S> {
    /// Creates a manager stamping items with the system clock.
    pub fn new(store: S) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    /// Creates a manager with a custom clock source.
    pub fn with_clock(store: S, clock: Arc<dyn ClockSource>) -> Self {
        QueueManager {
            store: Mutex::new(store),
            clock: MonotonicClock::with_clock(clock),
        }
    }

    fn store(&self) -> MutexGuard<'_, S> {
        // A panic mid-call leaves the store itself consistent
        self.store.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Queues a mutation and returns its generated id.
    ///
    /// The payload is validated against the operation before anything is
    /// written: create and update need one, delete must not carry one.
    pub fn enqueue(
        &self,
        operation: Operation,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        payload: Option<Payload>,
    ) -> Result<String> {
        let mut store = self.store();
        // Other processes may have stamped items ahead of this clock
        if let Some(latest) = store.latest_created_at()? {
            self.clock
                .observe(u64::try_from(latest.timestamp_millis()).unwrap_or(0));
        }
        let item = QueueItem::new(
            uuid::Uuid::new_v4().to_string(),
            operation,
            entity_type,
            entity_id.into(),
            payload,
            self.clock.now(),
        )?;
        store.add(&item)?;
        drop(store);
        tracing::debug!(
            id = %item.id,
            operation = %item.operation,
            entity = %item.entity_type,
            entity_id = %item.entity_id,
            "queued"
        );
        Ok(item.id)
    }

    /// Returns pending items, oldest first.
    pub fn pending_items(&self) -> Result<Vec<QueueItem>> {
        self.store().get_by_status(QueueStatus::Pending)
    }

    /// Returns failed items, oldest first.
    pub fn failed_items(&self) -> Result<Vec<QueueItem>> {
        self.store().get_by_status(QueueStatus::Failed)
    }

    /// Returns every item regardless of status.
    pub fn all_items(&self) -> Result<Vec<QueueItem>> {
        self.store().get_all()
    }

    /// Marks the given pending items as syncing.
    ///
    /// Ids that are not currently pending are skipped. Returns how many
    /// items moved.
    pub fn mark_syncing(&self, ids: &[String]) -> Result<usize> {
        self.move_each(ids, QueueStatus::Pending, QueueStatus::Syncing)
    }

    /// Marks the given syncing items as failed.
    ///
    /// Ids that are not currently syncing are skipped. Returns how many
    /// items moved.
    pub fn mark_failed(&self, ids: &[String]) -> Result<usize> {
        self.move_each(ids, QueueStatus::Syncing, QueueStatus::Failed)
    }

    fn move_each(&self, ids: &[String], from: QueueStatus, to: QueueStatus) -> Result<usize> {
        let mut store = self.store();
        let mut moved = 0;
        for id in ids {
            if store.update_if(id, from, to)? {
                moved += 1;
            }
        }
        Ok(moved)
    }

    /// Removes an item after the remote accepted it. Missing ids are a no-op.
    pub fn dequeue(&self, id: &str) -> Result<()> {
        self.store().remove(id)
    }

    /// Moves every failed item back to pending, returning how many moved.
    pub fn retry_failed(&self) -> Result<usize> {
        let moved = self
            .store()
            .transition(QueueStatus::Failed, QueueStatus::Pending)?;
        if !moved.is_empty() {
            tracing::info!(count = moved.len(), "failed operations requeued");
        }
        Ok(moved.len())
    }

    pub fn pending_count(&self) -> Result<usize> {
        self.store().count_by_status(QueueStatus::Pending)
    }

    pub fn failed_count(&self) -> Result<usize> {
        self.store().count_by_status(QueueStatus::Failed)
    }

    pub fn has_pending(&self) -> Result<bool> {
        Ok(self.pending_count()? > 0)
    }

    /// Atomically claims every pending item for a sync cycle.
    ///
    /// The returned batch is in queue order and already marked syncing.
    /// Items enqueued after the claim stay pending for the next cycle.
    pub fn claim_pending(&self) -> Result<Vec<QueueItem>> {
        self.store()
            .transition(QueueStatus::Pending, QueueStatus::Syncing)
    }

    /// Applies the outcome of a sync cycle in one step.
    ///
    /// `synced` ids are removed; `failed` ids that are still syncing become
    /// failed.
    pub fn settle(&self, synced: &[String], failed: &[String]) -> Result<()> {
        self.store().apply_outcomes(synced, failed)
    }

    /// Fails items a previous process or cycle left mid-sync.
    ///
    /// Only safe while no cycle is in flight; the sync engine calls it at
    /// the start of every cycle under its cycle lock. The remote
    /// deduplicates by operation id, so a later retry is safe even when the
    /// interrupted batch did reach it.
    pub fn recover_interrupted(&self) -> Result<usize> {
        let moved = self
            .store()
            .transition(QueueStatus::Syncing, QueueStatus::Failed)?;
        if !moved.is_empty() {
            tracing::warn!(
                count = moved.len(),
                "interrupted sync left operations in flight, marked failed"
            );
        }
        Ok(moved.len())
    }

    /// Removes every item.
    pub fn clear(&self) -> Result<()> {
        self.store().clear()
    }

    /// Removes items recorded as synced, returning how many.
    pub fn clear_synced(&self) -> Result<usize> {
        self.store().remove_by_status(QueueStatus::Success)
    }
}
