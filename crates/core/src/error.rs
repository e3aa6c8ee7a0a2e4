// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for pk-core operations.

use thiserror::Error;

/// All possible errors that can occur in pk-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("duplicate queue item id: {0}")]
    DuplicateId(String),

    #[error("queue item not found: {0}")]
    NotFound(String),

    #[error("invalid operation: '{0}'\n  hint: valid operations are: create, update, delete")]
    InvalidOperation(String),

    #[error("invalid entity type: '{0}'\n  hint: valid entity types are: transaction, category")]
    InvalidEntityType(String),

    #[error(
        "invalid status: '{0}'\n  hint: valid statuses are: pending, syncing, success, failed"
    )]
    InvalidStatus(String),

    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

/// A specialized Result type for pk-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
