// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.
//!
//! All runtime environment variables read by the client are defined here
//! with typed accessor functions. The variable name constants are generated
//! by `build.rs` and live in the [`vars`] submodule.

use std::path::PathBuf;

/// Generated environment variable name constants.
pub mod vars {
    include!(concat!(env!("OUT_DIR"), "/env_vars.rs"));
}

/// Returns the value of `POCKET_STATE_DIR` if set and non-empty.
pub fn state_dir() -> Option<PathBuf> {
    non_empty(vars::POCKET_STATE_DIR).map(PathBuf::from)
}

/// Returns the value of `POCKET_REMOTE_URL` if set and non-empty.
///
/// Overrides `[remote] url` from the config file.
pub fn remote_url() -> Option<String> {
    non_empty(vars::POCKET_REMOTE_URL)
}

/// Returns the log filter directive from `POCKET_LOG` if set.
pub fn log_filter() -> Option<String> {
    non_empty(vars::POCKET_LOG)
}

/// Returns the value of `XDG_STATE_HOME` if set and non-empty.
pub fn xdg_state_home() -> Option<PathBuf> {
    non_empty(vars::XDG_STATE_HOME).map(PathBuf::from)
}

fn non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
