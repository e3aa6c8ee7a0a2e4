// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client configuration management.
//!
//! Configuration is stored in `<state dir>/config.toml` next to the queue
//! database. Every field has a default, so a missing file or a missing
//! section is not an error:
//!
//! ```toml
//! [remote]
//! url = "http://localhost:3000"
//! request_timeout_secs = 30
//!
//! [sync]
//! max_attempts = 3
//! base_delay_ms = 1000
//! interval_secs = 0
//!
//! [connectivity]
//! poll_interval_ms = 5000
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::env;
use crate::error::{Error, Result};
use crate::sync::SyncConfig;

const APP_DIR_NAME: &str = "pocket";
const CONFIG_FILE_NAME: &str = "config.toml";
const DB_FILE_NAME: &str = "queue.db";
const LOCK_FILE_NAME: &str = "sync.lock";

/// Client configuration stored in `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub sync: SyncSettings,
    #[serde(default)]
    pub connectivity: ConnectivityConfig,
}

/// Where the remote ledger lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the remote (default: "http://localhost:3000").
    #[serde(default = "default_url")]
    pub url: String,
    /// Max time for one sync request in seconds (default: 30).
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Retry and scheduling knobs for the sync engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Submission attempts per cycle (default: 3).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Base retry delay in milliseconds; retry n waits n times this (default: 1000).
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Periodic sweep for `pocket watch` in seconds. 0 = only on reconnect.
    #[serde(default)]
    pub interval_secs: u64,
}

/// How `pocket watch` checks reachability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectivityConfig {
    /// Health probe interval in milliseconds (default: 5000).
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_poll_interval_ms() -> u64 {
    5000
}

impl Default for RemoteConfig {
    fn default() -> Self {
        RemoteConfig {
            url: default_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        SyncSettings {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            interval_secs: 0,
        }
    }
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        ConnectivityConfig {
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl RemoteConfig {
    /// Validates that the URL is an HTTP(S) base URL.
    ///
    /// Returns an error message if the URL is invalid.
    pub fn validate_url(&self) -> Option<String> {
        let url = &self.url;
        let rest = url
            .strip_prefix("http://")
            .or_else(|| url.strip_prefix("https://"));
        match rest {
            Some(host) if !host.trim_matches('/').is_empty() => None,
            Some(_) => Some(format!("invalid remote URL '{url}': missing host")),
            None => Some(format!(
                "invalid remote URL '{url}': must start with http:// or https://"
            )),
        }
    }
}

impl Config {
    /// Load configuration from `<state_dir>/config.toml`.
    ///
    /// A missing file yields the defaults. `POCKET_REMOTE_URL` overrides
    /// the configured remote URL.
    pub fn load(state_dir: &Path) -> Result<Self> {
        let mut config = Self::read_file(state_dir)?;
        if let Some(url) = env::remote_url() {
            config.remote.url = url;
        }
        config.validate()?;
        Ok(config)
    }

    /// Parse the config file as written, without overrides or validation.
    pub(crate) fn read_file(state_dir: &Path) -> Result<Self> {
        match fs::read_to_string(config_path(state_dir)) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Config::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Save configuration to `<state_dir>/config.toml`.
    pub fn save(&self, state_dir: &Path) -> Result<()> {
        fs::create_dir_all(state_dir)?;
        let content = toml::to_string_pretty(self)?;
        fs::write(config_path(state_dir), content)?;
        Ok(())
    }

    /// Check values that would make the client misbehave.
    pub fn validate(&self) -> Result<()> {
        if let Some(msg) = self.remote.validate_url() {
            return Err(Error::Config(msg));
        }
        if self.sync.max_attempts == 0 {
            return Err(Error::Config("sync.max_attempts must be at least 1".into()));
        }
        if self.remote.request_timeout_secs == 0 {
            return Err(Error::Config(
                "remote.request_timeout_secs must be at least 1".into(),
            ));
        }
        if self.connectivity.poll_interval_ms == 0 {
            return Err(Error::Config(
                "connectivity.poll_interval_ms must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Engine settings derived from this configuration.
    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            max_attempts: self.sync.max_attempts,
            base_delay: Duration::from_millis(self.sync.base_delay_ms),
            request_timeout: self.request_timeout(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.remote.request_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.connectivity.poll_interval_ms)
    }

    /// Periodic sweep interval, if enabled.
    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.sync.interval_secs > 0).then(|| Duration::from_secs(self.sync.interval_secs))
    }
}

/// Resolve the state directory.
///
/// Precedence: explicit flag, `POCKET_STATE_DIR`, `$XDG_STATE_HOME/pocket`,
/// the platform state dir, then `~/.local/state/pocket`.
pub fn resolve_state_dir(flag: Option<PathBuf>) -> Result<PathBuf> {
    state_dir_from(
        flag,
        env::state_dir(),
        env::xdg_state_home(),
        dirs::state_dir(),
        dirs::home_dir(),
    )
}

fn state_dir_from(
    flag: Option<PathBuf>,
    pocket_state_dir: Option<PathBuf>,
    xdg_state_home: Option<PathBuf>,
    platform_state_dir: Option<PathBuf>,
    home: Option<PathBuf>,
) -> Result<PathBuf> {
    if let Some(dir) = flag.or(pocket_state_dir) {
        return Ok(dir);
    }
    if let Some(base) = xdg_state_home.or(platform_state_dir) {
        return Ok(base.join(APP_DIR_NAME));
    }
    home.map(|h| h.join(".local").join("state").join(APP_DIR_NAME))
        .ok_or_else(|| {
            Error::Config(
                "cannot determine state directory\n  hint: pass --state-dir or set POCKET_STATE_DIR"
                    .into(),
            )
        })
}

pub fn config_path(state_dir: &Path) -> PathBuf {
    state_dir.join(CONFIG_FILE_NAME)
}

pub fn db_path(state_dir: &Path) -> PathBuf {
    state_dir.join(DB_FILE_NAME)
}

pub fn lock_path(state_dir: &Path) -> PathBuf {
    state_dir.join(LOCK_FILE_NAME)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
