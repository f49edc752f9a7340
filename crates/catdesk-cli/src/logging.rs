// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use std::env;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub const LOG_ENV: &str = "CATDESK_LOG";

pub fn default_log_path() -> Result<PathBuf> {
    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set [log].path to a writable log file")
    })?;
    Ok(data_root.join(catdesk_db::APP_NAME).join("catdesk.log"))
}

/// `CATDESK_LOG` wins over the configured level when it is set and non-blank.
fn filter_directives<'a>(level: &'a str, env_override: Option<&'a str>) -> &'a str {
    env_override
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(level)
}

pub fn build_filter(level: &str, env_override: Option<&str>) -> Result<EnvFilter> {
    let directives = filter_directives(level, env_override);
    EnvFilter::try_new(directives).with_context(|| {
        format!("invalid log filter {directives:?}; use a level such as info or debug")
    })
}

/// Sends tracing output to `path`. The terminal belongs to the TUI.
pub fn init(level: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {} -- set [log].path to fix", path.display()))?;

    let env_override = env::var(LOG_ENV).ok();
    let filter = build_filter(level, env_override.as_deref())?;
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .map_err(|error| anyhow!("install log subscriber: {error}"))
}
