// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use std::path::PathBuf;

#[test]
fn test_vars_constants() {
    assert_eq!(vars::POCKET_STATE_DIR, "POCKET_STATE_DIR");
    assert_eq!(vars::POCKET_REMOTE_URL, "POCKET_REMOTE_URL");
    assert_eq!(vars::POCKET_LOG, "POCKET_LOG");
    assert_eq!(vars::XDG_STATE_HOME, "XDG_STATE_HOME");
}

#[test]
fn test_state_dir() {
    std::env::remove_var("POCKET_STATE_DIR");
    assert_eq!(state_dir(), None);

    std::env::set_var("POCKET_STATE_DIR", "");
    assert_eq!(state_dir(), None);

    std::env::set_var("POCKET_STATE_DIR", "/tmp/pocket-state");
    assert_eq!(state_dir(), Some(PathBuf::from("/tmp/pocket-state")));
    std::env::remove_var("POCKET_STATE_DIR");
}

#[test]
fn test_remote_url() {
    std::env::set_var("POCKET_REMOTE_URL", "http://ledger.local:8080");
    assert_eq!(remote_url().as_deref(), Some("http://ledger.local:8080"));
    std::env::remove_var("POCKET_REMOTE_URL");
    assert_eq!(remote_url(), None);
}

#[test]
fn test_log_filter() {
    std::env::set_var("POCKET_LOG", "pocketrs=debug");
    assert_eq!(log_filter().as_deref(), Some("pocketrs=debug"));
    std::env::remove_var("POCKET_LOG");
    assert_eq!(log_filter(), None);
}
