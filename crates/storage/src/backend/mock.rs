//! In-memory storage backend for testing.

use super::{BoxSyncRead, BoxSyncWrite, FileInfoStream};
use crate::StorageBackend;
use crate::error::{ErrorKind, Result};
use crate::file::FileInfo;
use crate::path::validate as validate_path;
use async_stream::stream;
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::io::{self, Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

type Files = Arc<RwLock<HashMap<PathBuf, Vec<u8>>>>;

/// In-memory storage backend for testing.
///
/// Files are stored in a `HashMap` behind a synchronous [`RwLock`] so that
/// the streaming [`writer`](StorageBackend::writer) can commit from a
/// blocking thread. Directories only exist implicitly, as prefixes of file
/// paths.
///
/// # Examples
///
/// ```
/// use bidsify_storage::backend::{MockBackend, StorageBackend};
/// use std::path::Path;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = MockBackend::with_files([
///     ("A123/BOLD_run1.json", b"{}"),
/// ]);
/// assert!(backend.exists(Path::new("A123/BOLD_run1.json")).await?);
/// # Ok(())
/// # }
/// ```
pub struct MockBackend {
    name: String,
    files: Files,
}

impl MockBackend {
    /// Create a mock backend pre-populated with files.
    ///
    /// Panics if any path fails validation (e.g. path traversal). If test
    /// setup is wrong, then test should not pass.
    pub fn with_files(files: impl IntoIterator<Item = (impl Into<PathBuf>, impl Into<Vec<u8>>)>) -> Self {
        let mut map = HashMap::new();
        for (path, data) in files {
            let path = path.into();
            let Ok(validated) = validate_path(&path) else {
                panic!("MockBackend::with_files: invalid path {}", path.display());
            };
            map.insert(validated, data.into());
        }
        Self {
            name: "mock".to_string(),
            files: Arc::new(RwLock::new(map)),
        }
    }

    /// Sorted snapshot of every stored path; handy for assertions.
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<_> = self.files().keys().cloned().collect();
        paths.sort();
        paths
    }

    fn files(&self) -> RwLockReadGuard<'_, HashMap<PathBuf, Vec<u8>>> {
        self.files.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn files_mut(&self) -> RwLockWriteGuard<'_, HashMap<PathBuf, Vec<u8>>> {
        self.files.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn get(&self, path: &Path) -> Result<Vec<u8>> {
        let path = validate_path(path)?;
        self.files().get(&path).cloned().ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(path)))
    }
}
impl Default for MockBackend {
    fn default() -> Self {
        let files: [(&str, &str); 0] = [];
        Self::with_files(files)
    }
}

/// Buffers writes and commits them to the map on flush and on drop.
struct MockWriter {
    path: PathBuf,
    buffer: Vec<u8>,
    files: Files,
}
impl MockWriter {
    fn commit(&self) {
        let mut files = self.files.write().unwrap_or_else(PoisonError::into_inner);
        files.insert(self.path.clone(), self.buffer.clone());
    }
}
impl Write for MockWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.commit();
        Ok(())
    }
}
impl Drop for MockWriter {
    fn drop(&mut self) {
        self.commit();
    }
}

#[async_trait]
impl StorageBackend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn list_stream<'a>(&'a self, prefix: Option<&'a Path>) -> FileInfoStream<'a> {
        let validated_prefix = match prefix.map(validate_path).transpose() {
            Ok(pfx) => pfx,
            Err(e) => return Box::pin(futures::stream::once(async { Err(e) })),
        };
        // Snapshot under the lock, then release it before yielding.
        let entries: Vec<FileInfo> = self
            .files()
            .iter()
            .filter(|(path, _)| validated_prefix.as_ref().is_none_or(|pfx| path.starts_with(pfx)))
            .map(|(path, data)| FileInfo::new(path.clone(), data.len() as u64))
            .collect();
        Box::pin(stream! {
            for entry in entries {
                yield Ok(entry);
            }
        })
    }

    async fn directories(&self, prefix: Option<&Path>) -> Result<Vec<PathBuf>> {
        let base = prefix.map(validate_path).transpose()?.unwrap_or_default();
        let directories: BTreeSet<PathBuf> = self
            .files()
            .keys()
            .filter_map(|path| path.strip_prefix(&base).ok())
            .filter_map(|rest| {
                let mut components = rest.components();
                let first = components.next()?;
                // Only an implicit directory if something lives below it.
                components.next().map(|_| base.join(first))
            })
            .collect();
        Ok(directories.into_iter().collect())
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        let path = validate_path(path)?;
        Ok(self.files().contains_key(&path))
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.get(path)
    }

    async fn reader(&self, path: &Path) -> Result<BoxSyncRead> {
        Ok(Box::new(Cursor::new(self.get(path)?)))
    }

    async fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        let path = validate_path(path)?;
        self.files_mut().insert(path, data.to_vec());
        Ok(())
    }

    async fn writer(&self, path: &Path) -> Result<BoxSyncWrite> {
        let path = validate_path(path)?;
        Ok(Box::new(MockWriter {
            path,
            buffer: Vec::new(),
            files: Arc::clone(&self.files),
        }))
    }

    async fn stat(&self, path: &Path) -> Result<FileInfo> {
        let path = validate_path(path)?;
        let size = self
            .files()
            .get(&path)
            .map(|data| data.len() as u64)
            .ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(path.clone())))?;
        Ok(FileInfo::new(path, size))
    }
}
