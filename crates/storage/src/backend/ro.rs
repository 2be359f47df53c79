//! Read-only storage backend.
//!
//! Wraps another backend, passing reads through and discarding writes while
//! reporting success. Used for dry runs: the organize pipeline runs exactly
//! as it would, but nothing lands on disk.

use super::{BoxSyncRead, BoxSyncWrite, FileInfoStream};
use crate::{BackendHandle, StorageBackend, error::Result, file::FileInfo, path::validate as validate_path};
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};

/// Read-only storage backend.
///
/// Writes are dropped after validating the path, logging an
/// [`info event`](tracing::Event) each time.
#[derive(Clone)]
pub struct ReadOnlyBackend {
    inner: BackendHandle,
}
impl ReadOnlyBackend {
    pub fn new(inner: BackendHandle) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl StorageBackend for ReadOnlyBackend {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn list_stream<'a>(&'a self, prefix: Option<&'a Path>) -> FileInfoStream<'a> {
        self.inner.list_stream(prefix)
    }

    async fn directories(&self, prefix: Option<&Path>) -> Result<Vec<PathBuf>> {
        self.inner.directories(prefix).await
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        self.inner.exists(path).await
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.inner.read(path).await
    }

    async fn reader(&self, path: &Path) -> Result<BoxSyncRead> {
        self.inner.reader(path).await
    }

    async fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        validate_path(path)?;
        tracing::info!(path = %path.display(), bytes = data.len(), "Skipping write during read-only mode");
        Ok(())
    }

    async fn writer(&self, path: &Path) -> Result<BoxSyncWrite> {
        validate_path(path)?;
        tracing::info!(path = %path.display(), "Skipping write during read-only mode");
        Ok(Box::new(io::sink()))
    }

    async fn stat(&self, path: &Path) -> Result<FileInfo> {
        self.inner.stat(path).await
    }
}
