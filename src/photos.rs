//! Filesystem-backed photo storage.
//!
//! Every upload lands in the uploads directory under a freshly generated name. Items keep the
//! returned path and hand it back for reads and removal.
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

/// Route prefix stored photos are served under.
pub const UPLOADS_ROUTE: &str = "/uploads";

/// Errors raised while touching photo files.
#[derive(Debug, Error)]
pub enum PhotoStorageError {
    /// Underlying filesystem call failed.
    #[error("{action} '{path}': {source}")]
    Io {
        /// Short description of the attempted operation.
        action: &'static str,
        /// File or directory involved.
        path: PathBuf,
        /// Original I/O error.
        #[source]
        source: io::Error,
    },
}

impl PhotoStorageError {
    fn io(action: &'static str, path: &Path, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }

    /// Whether the failure means the file does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Io { source, .. } => source.kind() == io::ErrorKind::NotFound,
        }
    }
}

/// Stores photo blobs as files below a root directory.
#[derive(Debug, Clone)]
pub struct PhotoStorage {
    root: PathBuf,
}

impl PhotoStorage {
    /// Use `root` as the upload directory. The directory is created lazily on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory photos are written to.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `bytes` to a new file and return its path.
    pub async fn save(&self, bytes: &[u8]) -> Result<PathBuf, PhotoStorageError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|err| PhotoStorageError::io("failed to create upload directory", &self.root, err))?;
        let path = self.root.join(Uuid::new_v4().simple().to_string());
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|err| PhotoStorageError::io("failed to write photo", &path, err))?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "Stored photo");
        Ok(path)
    }

    /// Read a previously stored photo.
    pub async fn read(&self, path: &Path) -> Result<Vec<u8>, PhotoStorageError> {
        tokio::fs::read(path)
            .await
            .map_err(|err| PhotoStorageError::io("failed to read photo", path, err))
    }

    /// Delete a stored photo.
    pub async fn remove(&self, path: &Path) -> Result<(), PhotoStorageError> {
        tokio::fs::remove_file(path)
            .await
            .map_err(|err| PhotoStorageError::io("failed to remove photo", path, err))?;
        tracing::debug!(path = %path.display(), "Removed photo");
        Ok(())
    }
}
