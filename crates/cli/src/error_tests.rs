// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

#[test]
fn test_core_error_is_transparent() {
    let err: Error = pk_core::Error::NotFound("op-1".to_string()).into();
    assert_eq!(
        err.to_string(),
        pk_core::Error::NotFound("op-1".to_string()).to_string()
    );
}

#[test]
fn test_sync_error_display() {
    let err: Error = SyncError::CycleInProgress.into();
    let msg = err.to_string();
    assert!(msg.starts_with("sync failed:"));
    assert!(msg.contains("already in progress"));
}

#[test]
fn test_sync_locked_has_hint() {
    let msg = Error::SyncLocked.to_string();
    assert!(msg.contains("another process"));
    assert!(msg.contains("hint:"));
}

#[parameterized(
    config = { Error::Config("bad url".into()), "configuration error: bad url" },
    timeout = {
        Error::Transport(TransportError::Timeout(std::time::Duration::from_secs(3))),
        "remote error: request timed out after 3s"
    },
    status = {
        Error::Transport(TransportError::Status { code: 503, body: "busy".into() }),
        "remote error: remote returned HTTP 503: busy"
    },
)]
fn test_error_display(err: Error, expected: &str) {
    assert_eq!(err.to_string(), expected);
}

#[test]
fn test_from_io_error() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let err: Error = io.into();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn test_from_toml_error() {
    let parse = toml::from_str::<toml::Value>("= nope").unwrap_err();
    let err: Error = parse.into();
    assert!(err.to_string().starts_with("config parse error:"));
}
