// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Server state management.
//!
//! Wraps the canonical ledger for thread-safe access. Every operation id the
//! server has answered is remembered together with its result, so a batch
//! that is resubmitted after a lost response is answered the same way
//! without being applied twice.

use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use tokio::sync::Mutex;

use pk_core::{
    EntityType, Operation, Payload, Result, SyncOperation, SyncRequest, SyncResponse, SyncResult,
};

/// SQL schema for the canonical ledger.
const SCHEMA: &str = r#"
-- Current copy of every live entity; updated_at is the client timestamp
-- (ms) of the last write that won
CREATE TABLE IF NOT EXISTS entities (
    entity_type TEXT NOT NULL,
    entity_id TEXT NOT NULL,
    data TEXT NOT NULL,
    updated_at INTEGER NOT NULL,
    PRIMARY KEY (entity_type, entity_id)
);

-- Answered operations, for replay
CREATE TABLE IF NOT EXISTS applied_ops (
    op_id TEXT PRIMARY KEY,
    result TEXT NOT NULL
);
"#;

/// The canonical ledger: entities plus the replay log.
pub struct Ledger {
    conn: Connection,
}

impl Ledger {
    /// Open the ledger at the given path, creating the schema if needed.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Ledger { conn })
    }

    /// Open an in-memory ledger (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Ledger { conn })
    }

    /// Apply one operation, or replay its earlier answer.
    ///
    /// The entity change and the recorded answer commit together.
    pub fn apply(&mut self, op: &SyncOperation) -> Result<SyncResult> {
        let tx = self.conn.transaction()?;

        let recorded: Option<String> = tx
            .query_row(
                "SELECT result FROM applied_ops WHERE op_id = ?1",
                params![op.id],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(json) = recorded {
            tracing::debug!(operation_id = %op.id, "replaying recorded result");
            return Ok(serde_json::from_str(&json)?);
        }

        let result = apply_operation(&tx, op)?;
        tx.execute(
            "INSERT INTO applied_ops (op_id, result) VALUES (?1, ?2)",
            params![op.id, serde_json::to_string(&result)?],
        )?;
        tx.commit()?;
        Ok(result)
    }

    /// The server copy of an entity, if it exists.
    pub fn entity(&self, entity_type: EntityType, entity_id: &str) -> Result<Option<Payload>> {
        load_entity(&self.conn, entity_type, entity_id).map(|found| found.map(|(data, _)| data))
    }

    /// Number of live entities of one type.
    pub fn count(&self, entity_type: EntityType) -> Result<usize> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM entities WHERE entity_type = ?1",
            params![entity_type.as_str()],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(n).unwrap_or(0))
    }
}

fn load_entity(
    conn: &Connection,
    entity_type: EntityType,
    entity_id: &str,
) -> Result<Option<(Payload, i64)>> {
    let row: Option<(String, i64)> = conn
        .query_row(
            "SELECT data, updated_at FROM entities WHERE entity_type = ?1 AND entity_id = ?2",
            params![entity_type.as_str(), entity_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;
    match row {
        Some((data, updated_at)) => Ok(Some((serde_json::from_str(&data)?, updated_at))),
        None => Ok(None),
    }
}

fn store_entity(tx: &Transaction<'_>, op: &SyncOperation, data: &Payload) -> Result<()> {
    tx.execute(
        "INSERT INTO entities (entity_type, entity_id, data, updated_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT (entity_type, entity_id)
         DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at",
        params![
            op.entity_type.as_str(),
            op.entity_id,
            serde_json::to_string(data)?,
            op.client_timestamp.timestamp_millis(),
        ],
    )?;
    Ok(())
}

/// Decide and apply one operation against the current ledger.
///
/// - create: conflicts with an existing entity, which is kept
/// - update: last writer wins by client timestamp; ties go to the incoming write
/// - delete: always succeeds, even if the entity is already gone
fn apply_operation(tx: &Transaction<'_>, op: &SyncOperation) -> Result<SyncResult> {
    if op.operation.requires_payload() && op.payload.is_none() {
        return Ok(SyncResult::error(
            &op.id,
            format!("{} requires a payload", op.operation),
        ));
    }

    let existing = load_entity(tx, op.entity_type, &op.entity_id)?;
    let incoming_ms = op.client_timestamp.timestamp_millis();

    let result = match (op.operation, existing) {
        (Operation::Create, Some((current, _))) => {
            tracing::info!(entity_id = %op.entity_id, "create conflicts with existing entity");
            SyncResult::conflict_resolved(&op.id, Some(current))
        }
        (Operation::Create, None) => {
            let mut data = op.payload.clone().unwrap_or_default();
            data.insert("id".into(), op.entity_id.clone().into());
            store_entity(tx, op, &data)?;
            SyncResult::success(&op.id, Some(data))
        }
        (Operation::Update, None) => SyncResult::error(&op.id, "entity not found"),
        (Operation::Update, Some((current, updated_at))) if incoming_ms < updated_at => {
            tracing::info!(entity_id = %op.entity_id, "stale update, server copy kept");
            SyncResult::conflict_resolved(&op.id, Some(current))
        }
        (Operation::Update, Some((mut current, _))) => {
            for (key, value) in op.payload.iter().flatten() {
                current.insert(key.clone(), value.clone());
            }
            store_entity(tx, op, &current)?;
            SyncResult::success(&op.id, Some(current))
        }
        (Operation::Delete, _) => {
            tx.execute(
                "DELETE FROM entities WHERE entity_type = ?1 AND entity_id = ?2",
                params![op.entity_type.as_str(), op.entity_id],
            )?;
            SyncResult::success(&op.id, None)
        }
    };
    Ok(result)
}

/// Shared server state containing the canonical ledger.
#[derive(Clone)]
pub struct ServerState {
    inner: Arc<ServerStateInner>,
}

struct ServerStateInner {
    ledger: Mutex<Ledger>,
    /// Sync requests still to be refused with 503, for exercising client retries.
    refuse_remaining: AtomicU32,
}

impl ServerState {
    pub fn new(ledger: Ledger) -> Self {
        ServerState {
            inner: Arc::new(ServerStateInner {
                ledger: Mutex::new(ledger),
                refuse_remaining: AtomicU32::new(0),
            }),
        }
    }

    /// Apply a batch in order. Each operation is answered independently.
    pub async fn apply_batch(&self, request: &SyncRequest) -> Result<SyncResponse> {
        let mut ledger = self.inner.ledger.lock().await;
        let mut results = Vec::with_capacity(request.operations.len());
        for op in &request.operations {
            results.push(ledger.apply(op)?);
        }
        Ok(SyncResponse {
            results,
            server_timestamp: Utc::now(),
        })
    }

    /// The server copy of an entity, if it exists.
    pub async fn entity(&self, entity_type: EntityType, entity_id: &str) -> Result<Option<Payload>> {
        self.inner.ledger.lock().await.entity(entity_type, entity_id)
    }

    pub async fn count(&self, entity_type: EntityType) -> Result<usize> {
        self.inner.ledger.lock().await.count(entity_type)
    }

    /// Refuse the next `n` sync requests with 503.
    pub fn refuse_next(&self, n: u32) {
        self.inner.refuse_remaining.store(n, Ordering::SeqCst);
    }

    /// Consume one refusal, if any are left.
    pub(crate) fn take_refusal(&self) -> bool {
        self.inner
            .refuse_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
