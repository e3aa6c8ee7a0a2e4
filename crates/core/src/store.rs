// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Durable queue store abstraction.
//!
//! [`QueueStore`] is the persistence seam for queued mutations. The SQLite
//! implementation lives in [`crate::db`]; [`MemoryQueueStore`] keeps
//! everything in process and is used by tests and ephemeral sessions.
//!
//! Every listing is ordered by `(created_at, insertion sequence)` so items
//! stamped in the same millisecond still come back in enqueue order.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::item::{QueueItem, QueueStatus};

/// Persistent storage of queue items keyed by id.
pub trait QueueStore: Send {
    /// Inserts a new item.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateId`] if an item with the same id exists.
    fn add(&mut self, item: &QueueItem) -> Result<()>;

    /// Returns items with the given status, oldest first.
    fn get_by_status(&self, status: QueueStatus) -> Result<Vec<QueueItem>>;

    /// Returns every item. Diagnostic use only.
    fn get_all(&self) -> Result<Vec<QueueItem>>;

    /// Sets the status of an item.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no item has this id.
    fn update(&mut self, id: &str, status: QueueStatus) -> Result<()>;

    /// Sets the status only if the item is currently in `from`.
    ///
    /// Returns whether the item was changed. Missing ids are not an error.
    fn update_if(&mut self, id: &str, from: QueueStatus, to: QueueStatus) -> Result<bool>;

    /// Removes an item. Removing a missing id is a no-op.
    fn remove(&mut self, id: &str) -> Result<()>;

    /// Removes every item unconditionally.
    fn clear(&mut self) -> Result<()>;

    /// Counts items with the given status.
    fn count_by_status(&self, status: QueueStatus) -> Result<usize>;

    /// Atomically moves every item in `from` to `to`.
    ///
    /// Returns the moved items in queue order, already carrying `to`.
    fn transition(&mut self, from: QueueStatus, to: QueueStatus) -> Result<Vec<QueueItem>>;

    /// Atomically removes `remove_ids` and fails `fail_ids`.
    ///
    /// Only items currently in [`QueueStatus::Syncing`] are failed. Unknown
    /// ids are ignored.
    fn apply_outcomes(&mut self, remove_ids: &[String], fail_ids: &[String]) -> Result<()>;

    /// Removes every item with the given status, returning how many.
    fn remove_by_status(&mut self, status: QueueStatus) -> Result<usize>;

    /// Returns the newest `created_at` of any stored item.
    fn latest_created_at(&self) -> Result<Option<DateTime<Utc>>>;
}

impl<S: QueueStore + ?Sized> QueueStore for Box<S> {
    fn add(&mut self, item: &QueueItem) -> Result<()> {
        (**self).add(item)
    }

    fn get_by_status(&self, status: QueueStatus) -> Result<Vec<QueueItem>> {
        (**self).get_by_status(status)
    }

    fn get_all(&self) -> Result<Vec<QueueItem>> {
        (**self).get_all()
    }

    fn update(&mut self, id: &str, status: QueueStatus) -> Result<()> {
        (**self).update(id, status)
    }

    fn update_if(&mut self, id: &str, from: QueueStatus, to: QueueStatus) -> Result<bool> {
        (**self).update_if(id, from, to)
    }

    fn remove(&mut self, id: &str) -> Result<()> {
        (**self).remove(id)
    }

    fn clear(&mut self) -> Result<()> {
        (**self).clear()
    }

    fn count_by_status(&self, status: QueueStatus) -> Result<usize> {
        (**self).count_by_status(status)
    }

    fn transition(&mut self, from: QueueStatus, to: QueueStatus) -> Result<Vec<QueueItem>> {
        (**self).transition(from, to)
    }

    fn apply_outcomes(&mut self, remove_ids: &[String], fail_ids: &[String]) -> Result<()> {
        (**self).apply_outcomes(remove_ids, fail_ids)
    }

    fn remove_by_status(&mut self, status: QueueStatus) -> Result<usize> {
        (**self).remove_by_status(status)
    }

    fn latest_created_at(&self) -> Result<Option<DateTime<Utc>>> {
        (**self).latest_created_at()
    }
}

/// In-process queue store.
#[derive(Debug, Default)]
pub struct MemoryQueueStore {
    items: HashMap<String, (u64, QueueItem)>,
    next_seq: u64,
}

impl MemoryQueueStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted<'a>(&self, entries: impl Iterator<Item = &'a (u64, QueueItem)>) -> Vec<QueueItem> {
        let mut entries: Vec<_> = entries.collect();
        entries.sort_by(|(seq_a, a), (seq_b, b)| {
            a.created_at.cmp(&b.created_at).then(seq_a.cmp(seq_b))
        });
        entries.into_iter().map(|(_, item)| item.clone()).collect()
    }
}

impl QueueStore for MemoryQueueStore {
    fn add(&mut self, item: &QueueItem) -> Result<()> {
        if self.items.contains_key(&item.id) {
            return Err(Error::DuplicateId(item.id.clone()));
        }
        self.next_seq += 1;
        self.items
            .insert(item.id.clone(), (self.next_seq, item.clone()));
        Ok(())
    }

    fn get_by_status(&self, status: QueueStatus) -> Result<Vec<QueueItem>> {
        Ok(self.sorted(self.items.values().filter(|(_, i)| i.status == status)))
    }

    fn get_all(&self) -> Result<Vec<QueueItem>> {
        Ok(self.sorted(self.items.values()))
    }

    fn update(&mut self, id: &str, status: QueueStatus) -> Result<()> {
        match self.items.get_mut(id) {
            Some((_, item)) => {
                item.status = status;
                Ok(())
            }
            None => Err(Error::NotFound(id.to_string())),
        }
    }

    fn update_if(&mut self, id: &str, from: QueueStatus, to: QueueStatus) -> Result<bool> {
        match self.items.get_mut(id) {
            Some((_, item)) if item.status == from => {
                item.status = to;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn remove(&mut self, id: &str) -> Result<()> {
        self.items.remove(id);
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.items.clear();
        Ok(())
    }

    fn count_by_status(&self, status: QueueStatus) -> Result<usize> {
        Ok(self
            .items
            .values()
            .filter(|(_, i)| i.status == status)
            .count())
    }

    fn transition(&mut self, from: QueueStatus, to: QueueStatus) -> Result<Vec<QueueItem>> {
        let mut moved = Vec::new();
        for entry in self.items.values_mut() {
            if entry.1.status == from {
                entry.1.status = to;
                moved.push(entry.clone());
            }
        }
        Ok(self.sorted(moved.iter()))
    }

    fn apply_outcomes(&mut self, remove_ids: &[String], fail_ids: &[String]) -> Result<()> {
        for id in remove_ids {
            self.items.remove(id);
        }
        for id in fail_ids {
            self.update_if(id, QueueStatus::Syncing, QueueStatus::Failed)?;
        }
        Ok(())
    }

    fn remove_by_status(&mut self, status: QueueStatus) -> Result<usize> {
        let before = self.items.len();
        self.items.retain(|_, (_, item)| item.status != status);
        Ok(before - self.items.len())
    }

    fn latest_created_at(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self.items.values().map(|(_, item)| item.created_at).max())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
pub(crate) mod tests;
