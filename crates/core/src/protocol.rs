// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Wire messages for the batch sync endpoint.
//!
//! The protocol is a single request/response exchange:
//! - Client posts every pending operation in one [`SyncRequest`]
//! - Server answers with one [`SyncResult`] per operation, matched by id

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::item::{EntityType, Operation, Payload, QueueItem};

/// One queued mutation as submitted to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOperation {
    /// The queue item id. The server echoes it back as `operationId`.
    pub id: String,
    pub operation: Operation,
    pub entity_type: EntityType,
    pub entity_id: String,
    pub payload: Option<Payload>,
    /// When the mutation was recorded on the client.
    pub client_timestamp: DateTime<Utc>,
}

impl From<&QueueItem> for SyncOperation {
    fn from(item: &QueueItem) -> Self {
        SyncOperation {
            id: item.id.clone(),
            operation: item.operation,
            entity_type: item.entity_type,
            entity_id: item.entity_id.clone(),
            payload: item.payload.clone(),
            client_timestamp: item.created_at,
        }
    }
}

/// Body of `POST /api/transactions/sync`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncRequest {
    /// Operations in the order the server must apply them.
    pub operations: Vec<SyncOperation>,
}

impl SyncRequest {
    /// Builds a request from queue items, preserving their order.
    pub fn from_items(items: &[QueueItem]) -> Self {
        SyncRequest {
            operations: items.iter().map(SyncOperation::from).collect(),
        }
    }

    /// Serializes the request to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Server verdict for a single operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultStatus {
    /// Applied as submitted.
    Success,
    /// The server applied its own deterministic resolution. The local copy
    /// is superseded and nothing needs to be reapplied.
    ConflictResolved,
    /// Rejected. Does not affect other operations in the batch.
    Error,
}

impl ResultStatus {
    /// Returns true if the operation can leave the queue.
    pub fn is_settled(&self) -> bool {
        matches!(self, ResultStatus::Success | ResultStatus::ConflictResolved)
    }
}

/// Outcome of one submitted operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    pub operation_id: String,
    pub status: ResultStatus,
    /// Server copy of the entity after the operation, when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<Payload>,
    /// Human-readable rejection reason for [`ResultStatus::Error`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SyncResult {
    /// Creates a SUCCESS result.
    pub fn success(operation_id: impl Into<String>, entity: Option<Payload>) -> Self {
        SyncResult {
            operation_id: operation_id.into(),
            status: ResultStatus::Success,
            entity,
            error: None,
        }
    }

    /// Creates a CONFLICT_RESOLVED result carrying the server's copy.
    pub fn conflict_resolved(operation_id: impl Into<String>, entity: Option<Payload>) -> Self {
        SyncResult {
            operation_id: operation_id.into(),
            status: ResultStatus::ConflictResolved,
            entity,
            error: None,
        }
    }

    /// Creates an ERROR result.
    pub fn error(operation_id: impl Into<String>, message: impl Into<String>) -> Self {
        SyncResult {
            operation_id: operation_id.into(),
            status: ResultStatus::Error,
            entity: None,
            error: Some(message.into()),
        }
    }
}

/// Response body of the sync endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    pub results: Vec<SyncResult>,
    pub server_timestamp: DateTime<Utc>,
}

impl SyncResponse {
    /// Deserializes a response from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
