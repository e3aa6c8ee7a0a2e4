// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connectivity tracking and connectivity-driven sync.
//!
//! - [`ConnectivityMonitor`] holds the online flag and back-online callbacks
//! - [`ConnectivityProbe`] implementations feed it, optionally on a poller
//! - [`AutoSync`] runs [`check_and_sync`] whenever connectivity returns

mod auto;
mod monitor;
mod probe;

pub use auto::{check_and_sync, sync_status, AutoSync, CheckOutcome, SyncEvent, SyncStatus};
pub use monitor::{ConnectivityMonitor, ConnectivityStatus, Subscription};
pub use probe::{probe_once, spawn_poller, ConnectivityProbe, HttpProbe, HEALTH_PATH};

#[cfg(test)]
mod auto_tests;
