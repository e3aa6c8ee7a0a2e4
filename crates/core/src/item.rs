// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Queue item types for deferred ledger mutations.
//!
//! A [`QueueItem`] records one create/update/delete against a transaction or
//! category that could not be confirmed by the remote ledger yet. Only the
//! `status` field ever changes after the item is written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Field changes carried by a create or update.
pub type Payload = serde_json::Map<String, serde_json::Value>;

/// Kind of mutation recorded in the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl Operation {
    /// Returns the string representation used in storage and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "CREATE",
            Operation::Update => "UPDATE",
            Operation::Delete => "DELETE",
        }
    }

    /// Returns true if this operation must carry a payload.
    pub fn requires_payload(&self) -> bool {
        !matches!(self, Operation::Delete)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Operation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "create" => Ok(Operation::Create),
            "update" => Ok(Operation::Update),
            "delete" => Ok(Operation::Delete),
            _ => Err(Error::InvalidOperation(s.to_string())),
        }
    }
}

/// Ledger entity targeted by a queued mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    /// An income or expense entry.
    Transaction,
    /// A user-defined spending category.
    Category,
}

impl EntityType {
    /// Returns the string representation used in storage and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Transaction => "transaction",
            EntityType::Category => "category",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "transaction" => Ok(EntityType::Transaction),
            "category" => Ok(EntityType::Category),
            _ => Err(Error::InvalidEntityType(s.to_string())),
        }
    }
}

/// Sync lifecycle status of a queue item.
///
/// Valid transitions are `Pending -> Syncing -> (removed | Failed)` and
/// `Failed -> Pending` through an explicit retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QueueStatus {
    /// Waiting for the next sync cycle.
    Pending,
    /// Claimed by an in-flight sync cycle.
    Syncing,
    /// Confirmed by the server. Transient: confirmed items are removed.
    Success,
    /// Rejected by the server or retries exhausted. Needs an explicit retry.
    Failed,
}

impl QueueStatus {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueStatus::Pending => "PENDING",
            QueueStatus::Syncing => "SYNCING",
            QueueStatus::Success => "SUCCESS",
            QueueStatus::Failed => "FAILED",
        }
    }

    /// Check if a transition from this status to target is valid.
    pub fn can_transition_to(&self, target: QueueStatus) -> bool {
        matches!(
            (self, target),
            (QueueStatus::Pending, QueueStatus::Syncing)
                | (QueueStatus::Syncing, QueueStatus::Success)
                | (QueueStatus::Syncing, QueueStatus::Failed)
                | (QueueStatus::Failed, QueueStatus::Pending)
        )
    }
}

impl fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for QueueStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(QueueStatus::Pending),
            "syncing" => Ok(QueueStatus::Syncing),
            "success" => Ok(QueueStatus::Success),
            "failed" => Ok(QueueStatus::Failed),
            _ => Err(Error::InvalidStatus(s.to_string())),
        }
    }
}

/// A single deferred mutation awaiting confirmation by the remote ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueItem {
    /// Client-generated unique id. Primary key.
    pub id: String,
    pub operation: Operation,
    pub entity_type: EntityType,
    /// Target entity. For creates this may be a client-generated id.
    pub entity_id: String,
    /// Field changes. Always `None` for deletes.
    pub payload: Option<Payload>,
    /// Enqueue time, used for FIFO ordering.
    pub created_at: DateTime<Utc>,
    pub status: QueueStatus,
}

impl QueueItem {
    /// Creates a new pending item after validating the payload shape.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPayload`] if a delete carries a payload, a
    /// create/update lacks one, or the entity id is empty.
    pub fn new(
        id: String,
        operation: Operation,
        entity_type: EntityType,
        entity_id: String,
        payload: Option<Payload>,
        created_at: DateTime<Utc>,
    ) -> Result<Self> {
        validate_payload(operation, &entity_id, payload.as_ref())?;
        Ok(QueueItem {
            id,
            operation,
            entity_type,
            entity_id,
            payload,
            created_at,
            status: QueueStatus::Pending,
        })
    }
}

/// Check that the payload matches what the operation expects.
pub fn validate_payload(
    operation: Operation,
    entity_id: &str,
    payload: Option<&Payload>,
) -> Result<()> {
    if entity_id.trim().is_empty() {
        return Err(Error::InvalidPayload("entity id must not be empty".into()));
    }
    match (operation.requires_payload(), payload) {
        (true, None) => Err(Error::InvalidPayload(format!(
            "{} requires a payload object",
            operation
        ))),
        (false, Some(_)) => Err(Error::InvalidPayload(format!(
            "{} must not carry a payload",
            operation
        ))),
        _ => Ok(()),
    }
}

/// Parse a JSON string into a payload object.
///
/// Scalars and arrays are rejected: a payload is always a field map.
pub fn parse_payload(json: &str) -> Result<Payload> {
    match serde_json::from_str::<serde_json::Value>(json)? {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(Error::InvalidPayload(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
#[path = "item_tests.rs"]
mod tests;
