//! File logging: the terminal belongs to the TUI, so events go to
//! `<data dir>/buttonctl.log` through a non-blocking appender.

use std::path::Path;

use anyhow::anyhow;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "BUTTONCTL_LOG";
const LOG_FILE: &str = "buttonctl.log";
const DEFAULT_DIRECTIVE: &str = "info";

/// Filter from a `BUTTONCTL_LOG` value, `info` when unset or unparsable.
pub fn env_filter(directives: Option<String>) -> EnvFilter {
    directives
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .and_then(|value| EnvFilter::try_new(value).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Install the global subscriber. Dropping the guard flushes pending lines,
/// so keep it alive for the whole run.
pub fn init(log_dir: &Path, directives: Option<String>) -> anyhow::Result<WorkerGuard> {
    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(directives))
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|err| anyhow!("install logger: {err}"))?;
    Ok(guard)
}
