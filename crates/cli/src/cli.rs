// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use pk_core::{EntityType, Operation, QueueStatus};

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

const QUICKSTART_HELP: &str = "\
Get started:
  pocket add create transaction tx-1 -d '{\"amount\": -4.5}'
  pocket list                 Show queued operations
  pocket sync                 Push pending operations now
  pocket watch                Sync whenever the remote is reachable";

#[derive(Parser)]
#[command(name = "pocket")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Offline-first sync client for a personal finance ledger")]
#[command(
    long_about = "Offline-first sync client for a personal finance ledger.\n\n\
    Mutations are queued locally and pushed to the remote ledger in batches \
    whenever it is reachable."
)]
#[command(after_help = QUICKSTART_HELP)]
pub struct Cli {
    /// Directory holding the queue database and config.toml
    #[arg(long, global = true, value_name = "dir")]
    pub state_dir: Option<PathBuf>,

    /// Log more detail to stderr (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Queue a mutation for the remote ledger
    #[command(arg_required_else_help = true)]
    Add {
        /// Mutation kind: create, update, delete
        operation: Operation,

        /// Entity kind: transaction, category
        entity: EntityType,

        /// Id of the entity being changed
        #[arg(value_parser = non_empty_string)]
        entity_id: String,

        /// Field changes as a JSON object (required for create and update)
        #[arg(long, short = 'd', value_name = "json")]
        data: Option<String>,

        /// Output format
        #[arg(long, short = 'o', value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// List queued operations, oldest first
    List {
        /// Only show operations with this status
        #[arg(long, short = 's')]
        status: Option<QueueStatus>,

        /// Output format
        #[arg(long, short = 'o', value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// List operations the remote rejected or that ran out of attempts
    Failed {
        /// Output format
        #[arg(long, short = 'o', value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Move failed operations back to pending
    Retry,

    /// Remove operations from the queue
    Clear {
        /// Only remove operations recorded as synced
        #[arg(long)]
        synced: bool,
    },

    /// Push pending operations to the remote now
    Sync {
        /// Requeue failed operations first
        #[arg(long)]
        retry_failed: bool,

        /// Output format
        #[arg(long, short = 'o', value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Show queue counts and whether the remote is reachable
    Status {
        /// Output format
        #[arg(long, short = 'o', value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Keep running and sync whenever the remote becomes reachable
    Watch,

    /// Show the effective configuration
    Config,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
