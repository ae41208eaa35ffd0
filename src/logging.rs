//! Tracing configuration and log routing.
//!
//! Every event goes to stdout (compact, no targets) and to a log file written by a
//! non-blocking worker. `INVENTORY_LOG_FILE` picks the file; without it logs land in
//! `logs/inventory.log`. Filtering follows `RUST_LOG` and falls back to `info`.
use std::path::PathBuf;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const LOG_FILE_ENV: &str = "INVENTORY_LOG_FILE";
const DEFAULT_LOG_DIR: &str = "logs";
const DEFAULT_LOG_FILE: &str = "inventory.log";

#[derive(Debug, PartialEq, Eq)]
enum LogTarget {
    /// Append to a file chosen by the operator.
    Explicit(PathBuf),
    /// `logs/inventory.log` relative to the working directory.
    Default,
}

impl LogTarget {
    fn from_env_value(value: Option<String>) -> Self {
        match value.filter(|path| !path.trim().is_empty()) {
            Some(path) => Self::Explicit(PathBuf::from(path)),
            None => Self::Default,
        }
    }
}

/// Install the global tracing subscriber. Call once, before anything logs.
///
/// The returned guard owns the file writer's worker; keep it alive for the life of the
/// process. Dropping it flushes buffered lines, so it must outlive the last event.
#[must_use = "dropping the guard stops file logging"]
pub fn init_tracing() -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer().with_target(false).compact();
    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer);

    let target = LogTarget::from_env_value(std::env::var(LOG_FILE_ENV).ok());
    match file_writer(&target) {
        Some((writer, guard)) => {
            let file_layer = fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_ansi(false)
                .compact();
            registry.with(file_layer).init();
            Some(guard)
        }
        None => {
            registry.init();
            None
        }
    }
}

/// Open the file sink, or `None` when it cannot be created; stdout logging still works then.
fn file_writer(target: &LogTarget) -> Option<(NonBlocking, WorkerGuard)> {
    let writer = match target {
        LogTarget::Explicit(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|err| eprintln!("Failed to open log file {}: {err}", path.display()))
                .ok()?;
            tracing_appender::non_blocking(file)
        }
        LogTarget::Default => {
            if let Err(err) = std::fs::create_dir_all(DEFAULT_LOG_DIR) {
                eprintln!("Failed to create {DEFAULT_LOG_DIR} directory: {err}");
                return None;
            }
            tracing_appender::non_blocking(tracing_appender::rolling::never(
                DEFAULT_LOG_DIR,
                DEFAULT_LOG_FILE,
            ))
        }
    };
    Some(writer)
}
