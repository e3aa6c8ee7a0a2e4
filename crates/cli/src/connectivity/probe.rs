// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Active reachability checks feeding a [`ConnectivityMonitor`].

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::monitor::ConnectivityMonitor;

/// Path of the remote health endpoint, relative to the base URL.
pub const HEALTH_PATH: &str = "/health";

/// Answers "can the remote be reached right now".
pub trait ConnectivityProbe: Send + Sync {
    fn probe(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>>;
}

/// Probes the remote's health endpoint over HTTP.
pub struct HttpProbe {
    client: reqwest::Client,
    url: String,
}

impl HttpProbe {
    /// Creates a probe for the remote at `base_url`.
    ///
    /// A probe that cannot get an answer within `timeout` reports offline.
    pub fn new(base_url: &str, timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(HttpProbe {
            client,
            url: format!("{}{}", base_url.trim_end_matches('/'), HEALTH_PATH),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ConnectivityProbe for HttpProbe {
    fn probe(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>> {
        Box::pin(async move {
            match self.client.get(&self.url).send().await {
                Ok(response) => response.status().is_success(),
                Err(e) => {
                    tracing::debug!(url = %self.url, error = %e, "health probe failed");
                    false
                }
            }
        })
    }
}

/// Probes once and records the result on the monitor.
pub async fn probe_once(probe: &dyn ConnectivityProbe, monitor: &ConnectivityMonitor) -> bool {
    let online = probe.probe().await;
    monitor.set_online(online);
    online
}

/// Spawns a background task probing every `interval` until cancelled.
///
/// The first probe runs immediately.
pub fn spawn_poller(
    probe: Arc<dyn ConnectivityProbe>,
    monitor: ConnectivityMonitor,
    interval: Duration,
    cancel_token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        // interval() rejects a zero period
        let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let online = tokio::select! {
                _ = cancel_token.cancelled() => break,
                online = probe.probe() => online,
            };
            monitor.set_online(online);
        }
        tracing::debug!("connectivity poller stopped");
    })
}
