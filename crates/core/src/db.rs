// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed durable queue store.
//!
//! [`SqliteQueueStore`] persists queue items across restarts. Multi-row
//! changes (claiming a batch, settling a batch) run in a single transaction so
//! a crash never leaves half of a batch moved.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, ErrorCode, Row};
use std::path::Path;

use crate::error::{Error, Result};
use crate::item::{Payload, QueueItem, QueueStatus};
use crate::store::QueueStore;

/// SQL schema for the offline queue.
pub const SCHEMA: &str = r#"
-- Deferred mutations; seq breaks created_at ties in enqueue order
CREATE TABLE IF NOT EXISTS queue (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    operation TEXT NOT NULL,
    entity_type TEXT NOT NULL,
    entity_id TEXT NOT NULL,
    payload TEXT,
    created_at TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'PENDING'
);

CREATE INDEX IF NOT EXISTS idx_queue_status ON queue(status);
CREATE INDEX IF NOT EXISTS idx_queue_entity ON queue(entity_type, entity_id);
"#;

const SELECT_COLUMNS: &str =
    "SELECT id, operation, entity_type, entity_id, payload, created_at, status FROM queue";

/// Parse a string value from the database, returning a rusqlite error on parse failure.
fn parse_db<T: std::str::FromStr>(
    value: &str,
    column: &str,
) -> std::result::Result<T, rusqlite::Error> {
    value.parse().map_err(|_| corrupted(format!("invalid value '{value}' in column '{column}'")))
}

/// Parse an RFC3339 timestamp from the database.
fn parse_timestamp(
    value: &str,
    column: &str,
) -> std::result::Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| corrupted(format!("invalid timestamp '{value}' in column '{column}'")))
}

/// Parse an optional JSON payload from the database.
fn parse_payload_opt(value: Option<String>) -> std::result::Result<Option<Payload>, rusqlite::Error> {
    match value {
        None => Ok(None),
        Some(s) => serde_json::from_str(&s)
            .map(Some)
            .map_err(|_| corrupted(format!("invalid payload '{s}'"))),
    }
}

fn corrupted(message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        rusqlite::types::Type::Text,
        Box::new(Error::CorruptedData(message)),
    )
}

/// Map a row selected with [`SELECT_COLUMNS`] to a queue item.
fn row_to_item(row: &Row<'_>) -> std::result::Result<QueueItem, rusqlite::Error> {
    let op_str: String = row.get(1)?;
    let entity_str: String = row.get(2)?;
    let payload: Option<String> = row.get(4)?;
    let created_str: String = row.get(5)?;
    let status_str: String = row.get(6)?;

    Ok(QueueItem {
        id: row.get(0)?,
        operation: parse_db(&op_str, "operation")?,
        entity_type: parse_db(&entity_str, "entity_type")?,
        entity_id: row.get(3)?,
        payload: parse_payload_opt(payload)?,
        created_at: parse_timestamp(&created_str, "created_at")?,
        status: parse_db(&status_str, "status")?,
    })
}

/// Unwrap a conversion failure back into the pk-core error it carries.
fn map_row_error(err: rusqlite::Error) -> Error {
    match err {
        rusqlite::Error::FromSqlConversionFailure(_, _, inner) => match inner.downcast::<Error>() {
            Ok(core) => *core,
            Err(other) => Error::CorruptedData(other.to_string()),
        },
        other => Error::Database(other),
    }
}

fn query_items(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<QueueItem>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, row_to_item)?;
    rows.collect::<std::result::Result<Vec<_>, _>>()
        .map_err(map_row_error)
}

/// SQLite connection holding the offline queue.
pub struct SqliteQueueStore {
    conn: Connection,
}

impl SqliteQueueStore {
    /// Open the queue at the given path, creating the file and schema if needed.
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        // WAL keeps readers unblocked while a batch is being settled
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = FULL;
             PRAGMA busy_timeout = 5000;",
        )?;
        conn.execute_batch(SCHEMA)?;
        Ok(SqliteQueueStore { conn })
    }

    /// Open an in-memory queue (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(SqliteQueueStore { conn })
    }
}

impl QueueStore for SqliteQueueStore {
    fn add(&mut self, item: &QueueItem) -> Result<()> {
        let payload = item
            .payload
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let result = self.conn.execute(
            "INSERT INTO queue (id, operation, entity_type, entity_id, payload, created_at, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                item.id,
                item.operation.as_str(),
                item.entity_type.as_str(),
                item.entity_id,
                payload,
                item.created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
                item.status.as_str(),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                Err(Error::DuplicateId(item.id.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn get_by_status(&self, status: QueueStatus) -> Result<Vec<QueueItem>> {
        query_items(
            &self.conn,
            &format!("{SELECT_COLUMNS} WHERE status = ?1 ORDER BY created_at, seq"),
            params![status.as_str()],
        )
    }

    fn get_all(&self) -> Result<Vec<QueueItem>> {
        query_items(
            &self.conn,
            &format!("{SELECT_COLUMNS} ORDER BY created_at, seq"),
            [],
        )
    }

    fn update(&mut self, id: &str, status: QueueStatus) -> Result<()> {
        let affected = self.conn.execute(
            "UPDATE queue SET status = ?1 WHERE id = ?2",
            params![status.as_str(), id],
        )?;

        if affected == 0 {
            return Err(Error::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn update_if(&mut self, id: &str, from: QueueStatus, to: QueueStatus) -> Result<bool> {
        let affected = self.conn.execute(
            "UPDATE queue SET status = ?1 WHERE id = ?2 AND status = ?3",
            params![to.as_str(), id, from.as_str()],
        )?;
        Ok(affected > 0)
    }

    fn remove(&mut self, id: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM queue WHERE id = ?1", params![id])?;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.conn.execute("DELETE FROM queue", [])?;
        Ok(())
    }

    fn count_by_status(&self, status: QueueStatus) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM queue WHERE status = ?1",
            params![status.as_str()],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    fn transition(&mut self, from: QueueStatus, to: QueueStatus) -> Result<Vec<QueueItem>> {
        let tx = self.conn.transaction()?;
        let mut items = query_items(
            &tx,
            &format!("{SELECT_COLUMNS} WHERE status = ?1 ORDER BY created_at, seq"),
            params![from.as_str()],
        )?;
        tx.execute(
            "UPDATE queue SET status = ?1 WHERE status = ?2",
            params![to.as_str(), from.as_str()],
        )?;
        tx.commit()?;

        for item in &mut items {
            item.status = to;
        }
        Ok(items)
    }

    fn apply_outcomes(&mut self, remove_ids: &[String], fail_ids: &[String]) -> Result<()> {
        let tx = self.conn.transaction()?;
        {
            let mut delete = tx.prepare("DELETE FROM queue WHERE id = ?1")?;
            for id in remove_ids {
                delete.execute(params![id])?;
            }

            let mut fail = tx.prepare("UPDATE queue SET status = ?1 WHERE id = ?2 AND status = ?3")?;
            for id in fail_ids {
                fail.execute(params![
                    QueueStatus::Failed.as_str(),
                    id,
                    QueueStatus::Syncing.as_str()
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn remove_by_status(&mut self, status: QueueStatus) -> Result<usize> {
        let affected = self.conn.execute(
            "DELETE FROM queue WHERE status = ?1",
            params![status.as_str()],
        )?;
        Ok(affected)
    }

    fn latest_created_at(&self) -> Result<Option<DateTime<Utc>>> {
        // Fixed-width RFC3339 with a `Z` suffix sorts lexically
        let latest: Option<String> =
            self.conn
                .query_row("SELECT MAX(created_at) FROM queue", [], |row| row.get(0))?;
        latest
            .map(|value| parse_timestamp(&value, "created_at"))
            .transpose()
            .map_err(map_row_error)
    }
}

#[cfg(test)]
#[path = "db_tests.rs"]
mod tests;
