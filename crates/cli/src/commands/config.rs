// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use crate::config::{config_path, db_path, Config};
use crate::error::Result;

/// Print where state lives and the configuration in effect.
pub fn show(state_dir: &Path) -> Result<()> {
    let config = Config::load(state_dir)?;
    print!("{}", render(state_dir, &config)?);
    Ok(())
}

pub(crate) fn render(state_dir: &Path, config: &Config) -> Result<String> {
    let source = if config_path(state_dir).exists() {
        config_path(state_dir).display().to_string()
    } else {
        "defaults (no config.toml)".to_string()
    };
    Ok(format!(
        "# state dir: {}\n# queue: {}\n# config: {}\n\n{}",
        state_dir.display(),
        db_path(state_dir).display(),
        source,
        toml::to_string_pretty(config)?
    ))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
