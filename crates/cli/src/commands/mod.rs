// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod config;
pub mod queue;
pub mod sync;

use std::fs;
use std::future::Future;
use std::path::Path;

use pk_core::SqliteQueueStore;

use crate::config::{db_path, lock_path};
use crate::error::{Error, Result};
use crate::sync::QueueManager;

/// Helper to open the durable queue under the state directory.
pub fn open_queue(state_dir: &Path) -> Result<QueueManager<SqliteQueueStore>> {
    let store = SqliteQueueStore::open(&db_path(state_dir))?;
    Ok(QueueManager::new(store))
}

/// Take the per-state-dir sync lock.
///
/// Held for as long as the returned file lives. A second `sync` or `watch`
/// on the same queue fails fast instead of racing the first one.
pub fn acquire_sync_lock(state_dir: &Path) -> Result<fs::File> {
    use fs2::FileExt;

    fs::create_dir_all(state_dir)?;
    let file = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(lock_path(state_dir))?;
    file.try_lock_exclusive().map_err(|_| Error::SyncLocked)?;
    Ok(file)
}

/// Run a future to completion on a fresh multi-threaded runtime.
pub fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    Ok(runtime.block_on(future))
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
