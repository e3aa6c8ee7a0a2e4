// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Online/offline state and back-online notification.
//!
//! The monitor is fed by whatever knows about the network (a poller, an OS
//! hook, a test) through [`ConnectivityMonitor::set_online`]. Callbacks run
//! once per offline-to-online edge, never for repeated online reports.

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use serde::Serialize;

type Callback = Arc<dyn Fn() + Send + Sync>;

/// Snapshot returned by [`ConnectivityMonitor::current_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectivityStatus {
    pub is_online: bool,
    /// True if the last transition was offline to online and nobody has
    /// observed it yet.
    pub was_offline: bool,
}

struct MonitorState {
    is_online: bool,
    was_offline: bool,
    next_id: u64,
    callbacks: Vec<(u64, Callback)>,
}

/// Tracks connectivity and notifies subscribers when it is restored.
///
/// Cloning is cheap; clones share state.
#[derive(Clone)]
pub struct ConnectivityMonitor {
    shared: Arc<Mutex<MonitorState>>,
}

impl ConnectivityMonitor {
    /// Create a monitor starting in the given state.
    pub fn new(initially_online: bool) -> Self {
        ConnectivityMonitor {
            shared: Arc::new(Mutex::new(MonitorState {
                is_online: initially_online,
                was_offline: false,
                next_id: 0,
                callbacks: Vec::new(),
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, MonitorState> {
        self.shared.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Whether the device is currently online. Does not consume the
    /// offline-to-online flag.
    pub fn is_online(&self) -> bool {
        self.state().is_online
    }

    /// Returns the current state and clears `was_offline`.
    pub fn current_status(&self) -> ConnectivityStatus {
        let mut state = self.state();
        let status = ConnectivityStatus {
            is_online: state.is_online,
            was_offline: state.was_offline,
        };
        state.was_offline = false;
        status
    }

    /// Records a connectivity change.
    ///
    /// An offline-to-online edge sets `was_offline` and runs every
    /// registered callback, outside the internal lock. Returns whether the
    /// state changed.
    pub fn set_online(&self, online: bool) -> bool {
        let callbacks: Vec<Callback> = {
            let mut state = self.state();
            if state.is_online == online {
                return false;
            }
            state.is_online = online;
            if online {
                state.was_offline = true;
                state.callbacks.iter().map(|(_, cb)| cb.clone()).collect()
            } else {
                state.was_offline = false;
                Vec::new()
            }
        };

        if online {
            tracing::info!(subscribers = callbacks.len(), "connectivity restored");
        } else {
            tracing::info!("connectivity lost");
        }
        for callback in callbacks {
            callback();
        }
        true
    }

    /// Registers a callback for offline-to-online transitions.
    ///
    /// The callback stays registered until [`Subscription::cancel`] is
    /// called. Dropping the subscription leaves it registered.
    #[must_use = "keep the subscription to be able to cancel the callback"]
    pub fn on_back_online(&self, callback: impl Fn() + Send + Sync + 'static) -> Subscription {
        let mut state = self.state();
        state.next_id += 1;
        let id = state.next_id;
        state.callbacks.push((id, Arc::new(callback)));
        Subscription {
            id,
            monitor: Arc::downgrade(&self.shared),
        }
    }

    /// Number of registered callbacks.
    pub fn subscriber_count(&self) -> usize {
        self.state().callbacks.len()
    }
}

/// Handle for a callback registered with [`ConnectivityMonitor::on_back_online`].
pub struct Subscription {
    id: u64,
    monitor: Weak<Mutex<MonitorState>>,
}

impl Subscription {
    /// Removes the callback. Later transitions no longer invoke it.
    pub fn cancel(self) {
        if let Some(shared) = self.monitor.upgrade() {
            let mut state = shared.lock().unwrap_or_else(|e| e.into_inner());
            state.callbacks.retain(|(id, _)| *id != self.id);
        }
    }
}
