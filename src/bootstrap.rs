//! One-shot startup steps: directory preparation and listener binding.

use crate::config::{Config, ConfigError};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::net::TcpListener;

/// Fatal failures that abort process start.
#[derive(Debug, Error)]
pub enum StartupError {
    /// Configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The cache directory could not be created.
    #[error("Failed to create cache directory '{path}': {source}")]
    CacheDirectory {
        /// Directory we attempted to create.
        path: PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: io::Error,
    },
    /// The uploads directory could not be created.
    #[error("Failed to create uploads directory '{path}': {source}")]
    UploadsDirectory {
        /// Directory we attempted to create.
        path: PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: io::Error,
    },
    /// The HTTP listener could not be bound.
    #[error("Failed to bind {host}:{port}: {source}")]
    Bind {
        /// Requested host.
        host: String,
        /// Requested port.
        port: u16,
        /// Underlying socket error.
        #[source]
        source: io::Error,
    },
}

/// Create the cache and uploads directories (recursively) when they are missing.
pub fn prepare_directories(config: &Config) -> Result<(), StartupError> {
    ensure_dir(&config.cache_dir).map_err(|source| StartupError::CacheDirectory {
        path: config.cache_dir.clone(),
        source,
    })?;
    ensure_dir(&config.uploads_dir).map_err(|source| StartupError::UploadsDirectory {
        path: config.uploads_dir.clone(),
        source,
    })?;
    Ok(())
}

fn ensure_dir(path: &Path) -> io::Result<()> {
    if path.is_dir() {
        tracing::debug!(path = %path.display(), "Directory already present");
        return Ok(());
    }
    std::fs::create_dir_all(path)?;
    tracing::info!(path = %path.display(), "Created directory");
    Ok(())
}

/// Bind the HTTP listener on the configured host and port.
pub async fn bind_listener(config: &Config) -> Result<TcpListener, StartupError> {
    TcpListener::bind((config.host.as_str(), config.port))
        .await
        .map_err(|source| StartupError::Bind {
            host: config.host.clone(),
            port: config.port,
            source,
        })
}
