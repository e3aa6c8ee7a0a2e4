// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Talking to the remote: `sync`, `status`, `watch`.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use pk_core::QueueStore;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::connectivity::{
    check_and_sync, probe_once, spawn_poller, sync_status, AutoSync, CheckOutcome,
    ConnectivityMonitor, ConnectivityProbe, HttpProbe, SyncEvent, SyncStatus,
};
use crate::error::{Error, Result};
use crate::sync::{HttpTransport, QueueManager, SyncEngine, Transport, TransportError};

use super::{acquire_sync_lock, block_on, open_queue};

/// Health probes give up quickly; a slow remote counts as offline.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// JSON output for `sync`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SyncJson {
    outcome: CheckOutcome,
    pending_count: usize,
    failed_count: usize,
}

/// JSON output for `status`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusJson<'a> {
    remote: &'a str,
    #[serde(flatten)]
    status: SyncStatus,
}

fn http_probe(config: &Config) -> Result<HttpProbe> {
    HttpProbe::new(&config.remote.url, PROBE_TIMEOUT)
        .map_err(|e| Error::Transport(TransportError::Network(e.to_string())))
}

pub fn sync(state_dir: &Path, retry_failed: bool, output: OutputFormat) -> Result<()> {
    let config = Config::load(state_dir)?;
    let _lock = acquire_sync_lock(state_dir)?;
    let queue = Arc::new(open_queue(state_dir)?);
    queue.recover_interrupted()?;

    let probe = http_probe(&config)?;
    let transport = HttpTransport::new(&config.remote.url)?;
    let engine = SyncEngine::with_config(Arc::clone(&queue), transport, config.sync_config());

    let outcome = block_on(sync_impl(&engine, &probe, retry_failed))??;

    let pending = queue.pending_count()?;
    let failed = queue.failed_count()?;
    match output {
        OutputFormat::Text => println!("{}", format_outcome(&outcome, pending, failed)),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&SyncJson {
                outcome,
                pending_count: pending,
                failed_count: failed,
            })?
        ),
    }
    Ok(())
}

/// Probe the remote, then run one check against it.
pub(crate) async fn sync_impl<S: QueueStore, T: Transport>(
    engine: &SyncEngine<S, T>,
    probe: &dyn ConnectivityProbe,
    retry_failed: bool,
) -> Result<CheckOutcome> {
    if retry_failed {
        engine.queue().retry_failed()?;
    }
    let monitor = ConnectivityMonitor::new(false);
    probe_once(probe, &monitor).await;
    Ok(check_and_sync(&monitor, engine).await?)
}

/// Human-readable summary of a check.
/// Report line for a finished cycle under `watch`.
///
/// Returns `None` when the queue counts cannot be read; the error is logged
/// instead of printing counts that would look authoritative.
pub(crate) fn watch_line<S: QueueStore>(
    queue: &QueueManager<S>,
    outcome: &CheckOutcome,
) -> Option<String> {
    let counts = queue
        .pending_count()
        .and_then(|pending| Ok((pending, queue.failed_count()?)));
    match counts {
        Ok((pending, failed)) => Some(format_outcome(outcome, pending, failed)),
        Err(e) => {
            tracing::warn!(error = %e, "could not read queue counts");
            None
        }
    }
}

pub(crate) fn format_outcome(outcome: &CheckOutcome, pending: usize, failed: usize) -> String {
    let mut out = match outcome {
        CheckOutcome::Offline => format!(
            "Remote unreachable: {} operation(s) kept for later.",
            pending
        ),
        CheckOutcome::Idle => "Nothing to sync.".to_string(),
        CheckOutcome::Busy => "Sync already in progress.".to_string(),
        CheckOutcome::Completed(summary) => {
            let mut line = format!(
                "Synced {}/{} operation(s)",
                summary.synced, summary.total
            );
            if summary.conflicts > 0 {
                line.push_str(&format!(", {} resolved by remote", summary.conflicts));
            }
            if summary.attempts > 1 {
                line.push_str(&format!(" after {} attempts", summary.attempts));
            }
            line.push('.');
            line
        }
    };
    if failed > 0 {
        out.push_str(&format!(
            "\nFailed: {}\n  hint: run 'pocket failed' to inspect, 'pocket retry' to requeue",
            failed
        ));
    }
    out
}

pub fn status(state_dir: &Path, output: OutputFormat) -> Result<()> {
    let config = Config::load(state_dir)?;
    let queue = open_queue(state_dir)?;
    let probe = http_probe(&config)?;

    let status = block_on(status_impl(&queue, &probe))??;

    match output {
        OutputFormat::Text => {
            let reachability = if status.is_online { "online" } else { "offline" };
            println!("Remote: {} ({})", config.remote.url, reachability);
            println!("Pending: {}", status.pending_count);
            println!("Failed: {}", status.failed_count);
        }
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&StatusJson {
                remote: &config.remote.url,
                status,
            })?
        ),
    }
    Ok(())
}

pub(crate) async fn status_impl<S: QueueStore>(
    queue: &QueueManager<S>,
    probe: &dyn ConnectivityProbe,
) -> Result<SyncStatus> {
    let monitor = ConnectivityMonitor::new(false);
    probe_once(probe, &monitor).await;
    Ok(sync_status(queue, &monitor)?)
}

pub fn watch(state_dir: &Path) -> Result<()> {
    let config = Config::load(state_dir)?;
    let _lock = acquire_sync_lock(state_dir)?;
    let queue = Arc::new(open_queue(state_dir)?);
    queue.recover_interrupted()?;

    let probe: Arc<dyn ConnectivityProbe> = Arc::new(http_probe(&config)?);
    let transport = HttpTransport::new(&config.remote.url)?;
    let engine = Arc::new(SyncEngine::with_config(
        Arc::clone(&queue),
        transport,
        config.sync_config(),
    ));

    block_on(async move {
        let monitor = ConnectivityMonitor::new(false);
        let cancel_token = CancellationToken::new();
        let poller = spawn_poller(
            probe,
            monitor.clone(),
            config.poll_interval(),
            cancel_token.clone(),
        );
        let (auto, mut events) = AutoSync::spawn(engine, monitor, config.sweep_interval());
        println!("Watching {} (Ctrl-C to stop)", config.remote.url);

        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                event = events.recv() => match event {
                    Some(SyncEvent::Checked(outcome @ CheckOutcome::Completed(_))) => {
                        if let Some(line) = watch_line(&*queue, &outcome) {
                            println!("{}", line);
                        }
                    }
                    Some(SyncEvent::Checked(_)) => {}
                    Some(SyncEvent::Failed { error }) => eprintln!("warning: {}", error),
                    None => break,
                },
            }
        }

        cancel_token.cancel();
        auto.shutdown().await;
        if let Err(e) = poller.await {
            tracing::error!(error = %e, "connectivity poller ended abnormally");
        }
        println!("Stopped.");
    })?;
    Ok(())
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
