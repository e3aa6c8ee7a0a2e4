// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Queue inspection and editing: `add`, `list`, `failed`, `retry`, `clear`.

use std::path::Path;

use pk_core::{parse_payload, EntityType, Operation, QueueItem, QueueStatus, QueueStore};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::Result;
use crate::sync::QueueManager;

use super::open_queue;

/// JSON output structure for listing commands.
#[derive(Serialize)]
struct ItemsJson<'a> {
    items: &'a [QueueItem],
}

/// JSON output for `add`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddedJson<'a> {
    id: &'a str,
    status: QueueStatus,
}

pub fn add(
    state_dir: &Path,
    operation: Operation,
    entity: EntityType,
    entity_id: String,
    data: Option<String>,
    output: OutputFormat,
) -> Result<()> {
    let queue = open_queue(state_dir)?;
    let id = add_impl(&queue, operation, entity, entity_id, data.as_deref())?;
    match output {
        OutputFormat::Text => println!("Queued {operation} {entity} ({id})"),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string(&AddedJson {
                id: &id,
                status: QueueStatus::Pending,
            })?
        ),
    }
    Ok(())
}

pub(crate) fn add_impl<S: QueueStore>(
    queue: &QueueManager<S>,
    operation: Operation,
    entity: EntityType,
    entity_id: String,
    data: Option<&str>,
) -> Result<String> {
    let payload = data.map(parse_payload).transpose()?;
    Ok(queue.enqueue(operation, entity, entity_id, payload)?)
}

pub fn list(state_dir: &Path, status: Option<QueueStatus>, output: OutputFormat) -> Result<()> {
    let queue = open_queue(state_dir)?;
    let items = list_impl(&queue, status)?;
    print_items(&items, output, "Queue is empty.")
}

pub(crate) fn list_impl<S: QueueStore>(
    queue: &QueueManager<S>,
    status: Option<QueueStatus>,
) -> Result<Vec<QueueItem>> {
    let items = match status {
        Some(QueueStatus::Pending) => queue.pending_items()?,
        Some(QueueStatus::Failed) => queue.failed_items()?,
        Some(other) => queue
            .all_items()?
            .into_iter()
            .filter(|i| i.status == other)
            .collect(),
        None => queue.all_items()?,
    };
    Ok(items)
}

pub fn failed(state_dir: &Path, output: OutputFormat) -> Result<()> {
    let queue = open_queue(state_dir)?;
    let items = queue.failed_items()?;
    print_items(&items, output, "No failed operations.")?;
    if !items.is_empty() && output == OutputFormat::Text {
        println!();
        println!("  hint: run 'pocket retry' to requeue them");
    }
    Ok(())
}

pub fn retry(state_dir: &Path) -> Result<()> {
    let queue = open_queue(state_dir)?;
    let moved = queue.retry_failed()?;
    if moved == 0 {
        println!("No failed operations.");
    } else {
        println!("Requeued {} operation(s).", moved);
    }
    Ok(())
}

pub fn clear(state_dir: &Path, synced: bool) -> Result<()> {
    let queue = open_queue(state_dir)?;
    let removed = clear_impl(&queue, synced)?;
    println!("Removed {} operation(s).", removed);
    Ok(())
}

pub(crate) fn clear_impl<S: QueueStore>(queue: &QueueManager<S>, synced: bool) -> Result<usize> {
    if synced {
        return Ok(queue.clear_synced()?);
    }
    let count = queue.all_items()?.len();
    queue.clear()?;
    Ok(count)
}

fn print_items(items: &[QueueItem], output: OutputFormat, empty: &str) -> Result<()> {
    match output {
        OutputFormat::Text => {
            if items.is_empty() {
                println!("{}", empty);
            }
            for item in items {
                println!("{}", format_item_line(item));
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&ItemsJson { items })?);
        }
    }
    Ok(())
}

/// One line per item: short id, status, operation, target, enqueue time.
pub(crate) fn format_item_line(item: &QueueItem) -> String {
    let short_id: String = item.id.chars().take(8).collect();
    format!(
        "{}  {:<7}  {:<6}  {}/{}  {}",
        short_id,
        item.status.as_str(),
        item.operation.as_str(),
        item.entity_type,
        item.entity_id,
        item.created_at.format("%Y-%m-%d %H:%M:%S")
    )
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
