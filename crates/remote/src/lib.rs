// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! pk-remote: reference ledger server for the pocket sync client.
//!
//! Keeps the canonical copy of every transaction and category and answers
//! batched sync requests one result per operation. Resubmitted operations
//! are recognised by id and answered from the replay log.

pub mod server;
pub mod state;

pub use server::{router, run, TestServer, SYNC_PATH};
pub use state::{Ledger, ServerState};
