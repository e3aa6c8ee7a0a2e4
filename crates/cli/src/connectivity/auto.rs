// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connectivity-driven sync.
//!
//! [`check_and_sync`] is the single entry point used by every trigger: the
//! back-online callback, the periodic sweep, and the `sync` command.
//! [`AutoSync`] wires the monitor to a background task that runs it.

use std::sync::Arc;
use std::time::Duration;

use pk_core::QueueStore;
use serde::Serialize;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::monitor::{ConnectivityMonitor, Subscription};
use crate::sync::{QueueManager, SyncEngine, SyncError, SyncOutcome, SyncSummary, Transport};

/// What a [`check_and_sync`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum CheckOutcome {
    /// Offline; the queue was left alone.
    Offline,
    /// Online with nothing pending.
    Idle,
    /// A cycle ran.
    Completed(SyncSummary),
    /// A cycle was already running.
    Busy,
}

impl CheckOutcome {
    /// False only when a cycle ran and some items failed.
    pub fn is_success(&self) -> bool {
        match self {
            CheckOutcome::Completed(summary) => summary.is_clean(),
            _ => true,
        }
    }
}

/// Runs a sync cycle if online and there is anything pending.
pub async fn check_and_sync<S: QueueStore, T: Transport>(
    monitor: &ConnectivityMonitor,
    engine: &SyncEngine<S, T>,
) -> SyncOutcome<CheckOutcome> {
    if !monitor.is_online() {
        tracing::debug!("offline, sync skipped");
        return Ok(CheckOutcome::Offline);
    }
    if !engine.queue().has_pending()? {
        return Ok(CheckOutcome::Idle);
    }
    match engine.sync_pending().await {
        Ok(summary) => Ok(CheckOutcome::Completed(summary)),
        Err(SyncError::CycleInProgress) => {
            tracing::debug!("sync already running, trigger dropped");
            Ok(CheckOutcome::Busy)
        }
        Err(e) => Err(e),
    }
}

/// Queue and connectivity snapshot for status displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub has_pending: bool,
    pub pending_count: usize,
    pub failed_count: usize,
    pub is_online: bool,
}

/// Reads the current sync status without changing anything.
pub fn sync_status<S: QueueStore>(
    queue: &QueueManager<S>,
    monitor: &ConnectivityMonitor,
) -> pk_core::Result<SyncStatus> {
    let pending_count = queue.pending_count()?;
    Ok(SyncStatus {
        has_pending: pending_count > 0,
        pending_count,
        failed_count: queue.failed_count()?,
        is_online: monitor.is_online(),
    })
}

/// Events sent from the auto-sync task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// A check ran.
    Checked(CheckOutcome),
    /// A check hit a queue error.
    Failed { error: String },
}

/// Background task syncing whenever connectivity returns.
pub struct AutoSync {
    trigger: Arc<Notify>,
    subscription: Subscription,
    cancel_token: CancellationToken,
    handle: JoinHandle<()>,
}

impl AutoSync {
    /// Starts the task.
    ///
    /// A check runs on every offline-to-online edge, on [`AutoSync::trigger`],
    /// and every `sweep` if given. Returns the handle and a receiver for
    /// check events; the receiver may be dropped.
    pub fn spawn<S, T>(
        engine: Arc<SyncEngine<S, T>>,
        monitor: ConnectivityMonitor,
        sweep: Option<Duration>,
    ) -> (Self, mpsc::Receiver<SyncEvent>)
    where
        S: QueueStore + 'static,
        T: Transport + 'static,
    {
        let (event_tx, event_rx) = mpsc::channel(16);
        let trigger = Arc::new(Notify::new());
        let cancel_token = CancellationToken::new();

        let subscription = {
            let trigger = Arc::clone(&trigger);
            monitor.on_back_online(move || trigger.notify_one())
        };

        let handle = {
            let trigger = Arc::clone(&trigger);
            let cancel_token = cancel_token.clone();
            tokio::spawn(async move {
                run_auto_sync(engine, monitor, trigger, sweep, event_tx, cancel_token).await;
            })
        };

        let auto = AutoSync {
            trigger,
            subscription,
            cancel_token,
            handle,
        };
        (auto, event_rx)
    }

    /// Requests a check without waiting for a connectivity change.
    pub fn trigger(&self) {
        self.trigger.notify_one();
    }

    /// Stops the task, letting an in-flight cycle finish first.
    pub async fn shutdown(self) {
        self.subscription.cancel();
        self.cancel_token.cancel();
        if let Err(e) = self.handle.await {
            tracing::error!(error = %e, "auto-sync task ended abnormally");
        }
    }
}

async fn run_auto_sync<S, T>(
    engine: Arc<SyncEngine<S, T>>,
    monitor: ConnectivityMonitor,
    trigger: Arc<Notify>,
    sweep: Option<Duration>,
    event_tx: mpsc::Sender<SyncEvent>,
    cancel_token: CancellationToken,
) where
    S: QueueStore,
    T: Transport,
{
    loop {
        tokio::select! {
            _ = cancel_token.cancelled() => break,
            _ = trigger.notified() => {}
            _ = sweep_tick(sweep) => {}
        }

        let event = match check_and_sync(&monitor, &engine).await {
            Ok(outcome) => {
                if let CheckOutcome::Completed(summary) = outcome {
                    tracing::info!(
                        synced = summary.synced,
                        failed = summary.failed,
                        "auto-sync cycle done"
                    );
                }
                SyncEvent::Checked(outcome)
            }
            Err(e) => {
                tracing::error!(error = %e, "auto-sync check failed");
                SyncEvent::Failed {
                    error: e.to_string(),
                }
            }
        };
        // Nobody listening is fine
        let _ = event_tx.try_send(event);
    }
    tracing::debug!("auto-sync stopped");
}

async fn sweep_tick(sweep: Option<Duration>) {
    match sweep {
        Some(period) => tokio::time::sleep(period).await,
        None => std::future::pending().await,
    }
}
