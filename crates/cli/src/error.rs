// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::sync::{SyncError, TransportError};

/// All possible errors that can occur in the pocketrs library.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] pk_core::Error),

    #[error("sync failed: {0}")]
    Sync(#[from] SyncError),

    #[error("remote error: {0}")]
    Transport(#[from] TransportError),

    #[error("sync already running in another process\n  hint: wait for it to finish or stop 'pocket watch'")]
    SyncLocked,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config write error: {0}")]
    TomlWrite(#[from] toml::ser::Error),
}

/// Result type alias for pocketrs operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
