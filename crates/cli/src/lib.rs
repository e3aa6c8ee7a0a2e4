// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! pocketrs - offline-first sync client for a personal finance ledger.
//!
//! This crate provides the core functionality for the `pocket` CLI tool.
//! Mutations to transactions and categories are recorded in a durable local
//! queue and pushed to the remote ledger in batches whenever it is reachable.
//!
//! # Main Components
//!
//! - [`sync::QueueManager`] - The offline queue and its status transitions
//! - [`sync::SyncEngine`] - Batched submission with retry and reconciliation
//! - [`connectivity`] - Reachability tracking and connectivity-driven sync
//! - [`Config`] - Client configuration stored next to the queue
//! - [`Error`] - Error types for all operations
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use pk_core::{EntityType, Operation, SqliteQueueStore};
//! use pocketrs::sync::{HttpTransport, QueueManager, SyncEngine};
//!
//! let queue = Arc::new(QueueManager::new(SqliteQueueStore::open(&path)?));
//! queue.enqueue(Operation::Delete, EntityType::Transaction, "tx-1", None)?;
//!
//! let engine = SyncEngine::new(queue, HttpTransport::new("http://localhost:3000")?);
//! let summary = engine.sync_pending().await?;
//! ```

mod cli;
mod commands;
mod env;

pub mod config;
pub mod connectivity;
pub mod error;
pub mod logging;
pub mod sync;

pub use cli::{Cli, Command, OutputFormat};
pub use config::Config;
pub use error::{Error, Result};

/// Execute a CLI command. This is the main entry point for library users
/// and provides a testable way to run commands without process execution.
pub fn run(cli: Cli) -> Result<()> {
    let state_dir = config::resolve_state_dir(cli.state_dir)?;
    tracing::debug!(state_dir = %state_dir.display(), "resolved state dir");

    match cli.command {
        Command::Add {
            operation,
            entity,
            entity_id,
            data,
            output,
        } => commands::queue::add(&state_dir, operation, entity, entity_id, data, output),
        Command::List { status, output } => commands::queue::list(&state_dir, status, output),
        Command::Failed { output } => commands::queue::failed(&state_dir, output),
        Command::Retry => commands::queue::retry(&state_dir),
        Command::Clear { synced } => commands::queue::clear(&state_dir, synced),
        Command::Sync {
            retry_failed,
            output,
        } => commands::sync::sync(&state_dir, retry_failed, output),
        Command::Status { output } => commands::sync::status(&state_dir, output),
        Command::Watch => commands::sync::watch(&state_dir),
        Command::Config => commands::config::show(&state_dir),
    }
}
