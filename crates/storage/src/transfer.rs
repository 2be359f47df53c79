//! Cross-backend copying and content comparison.
//!
//! Images run to hundreds of megabytes, so both operations stream through
//! [`reader`](StorageBackend::reader)/[`writer`](StorageBackend::writer)
//! handles on a blocking thread instead of buffering whole files.

use crate::StorageBackend;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::io::{self, Write};
use std::path::Path;
use tokio::task::spawn_blocking;
use tracing::instrument;

/// Copies `from` on the `source` backend to `to` on the `destination`
/// backend, overwriting anything already there. Returns the bytes copied.
#[instrument(level = "debug", skip(source, destination), fields(from = %from.display(), to = %to.display()))]
pub async fn copy(
    source: &dyn StorageBackend,
    from: &Path,
    destination: &dyn StorageBackend,
    to: &Path,
) -> Result<u64> {
    let mut reader = source.reader(from).await?;
    let mut writer = destination.writer(to).await?;
    let copied = spawn_blocking(move || -> io::Result<u64> {
        let copied = io::copy(&mut reader, &mut writer)?;
        writer.flush()?;
        Ok(copied)
    })
    .await
    .or_raise(|| ErrorKind::BackendError("copy task did not complete".to_string()))?
    .map_err(ErrorKind::Io)?;
    Ok(copied)
}

/// BLAKE3 digest of a file's contents.
pub async fn digest(backend: &dyn StorageBackend, path: &Path) -> Result<blake3::Hash> {
    let mut reader = backend.reader(path).await?;
    let hash = spawn_blocking(move || -> io::Result<blake3::Hash> {
        let mut hasher = blake3::Hasher::new();
        io::copy(&mut reader, &mut hasher)?;
        Ok(hasher.finalize())
    })
    .await
    .or_raise(|| ErrorKind::BackendError("hash task did not complete".to_string()))?
    .map_err(ErrorKind::Io)?;
    Ok(hash)
}

/// Returns `true` if `to` already exists on `destination` with exactly the
/// contents of `from` on `source`.
///
/// Sizes are compared first so differing files are rejected without being
/// read.
pub async fn same_content(
    source: &dyn StorageBackend,
    from: &Path,
    destination: &dyn StorageBackend,
    to: &Path,
) -> Result<bool> {
    if !destination.exists(to).await? {
        return Ok(false);
    }
    let (incoming, existing) = (source.stat(from).await?, destination.stat(to).await?);
    if incoming.size != existing.size {
        return Ok(false);
    }
    Ok(digest(source, from).await? == digest(destination, to).await?)
}
