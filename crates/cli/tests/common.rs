// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// A `pocket` command pointed at `state`, isolated from the environment.
pub fn pocket(state: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("pocket");
    cmd.arg("--state-dir")
        .arg(state.path())
        .env_remove("POCKET_STATE_DIR")
        .env_remove("POCKET_REMOTE_URL")
        .env_remove("POCKET_LOG")
        .env_remove("RUST_LOG");
    cmd
}

/// A `pocket` command that talks to `url`.
pub fn pocket_with_remote(state: &TempDir, url: &str) -> Command {
    let mut cmd = pocket(state);
    cmd.env("POCKET_REMOTE_URL", url);
    cmd
}

/// A URL nothing listens on.
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:9";

/// Queue an operation and return its id.
pub fn add(state: &TempDir, args: &[&str]) -> String {
    let output = pocket(state)
        .arg("add")
        .args(args)
        .args(["-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "add failed: {:?}", output);
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    json["id"].as_str().unwrap().to_string()
}

/// Parse `pocket list -o json` into its items.
pub fn list_json(state: &TempDir) -> Vec<serde_json::Value> {
    let output = pocket(state).args(["list", "-o", "json"]).output().unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    json["items"].as_array().unwrap().clone()
}
