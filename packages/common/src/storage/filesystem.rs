use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::TempPath;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};
use uuid::Uuid;

use super::error::StorageError;
use super::name::BlobName;
use super::traits::{BlobStore, BoxReader};

/// Filesystem-backed blob store.
///
/// Blobs are stored one directory per event:
/// `{base_path}/{event_id}/{name}`. Writes go to `{base_path}/.tmp` first
/// and are renamed into place once complete. A temp file is removed when
/// its write fails or is dropped before finishing.
pub struct FilesystemBlobStore {
    base_path: PathBuf,
}

impl FilesystemBlobStore {
    /// Create a new filesystem blob store, clearing temp files left by a
    /// previous process.
    pub async fn new(base_path: PathBuf) -> Result<Self, StorageError> {
        fs::create_dir_all(&base_path).await?;
        let temp_dir = base_path.join(".tmp");
        fs::create_dir_all(&temp_dir).await?;

        let removed = Self::sweep_temp_dir(&temp_dir).await?;
        if removed > 0 {
            info!(removed, path = %temp_dir.display(), "Removed stale partial uploads");
        }

        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn event_dir(&self, event_id: Uuid) -> PathBuf {
        self.base_path.join(event_id.to_string())
    }

    fn blob_path(&self, event_id: Uuid, name: &BlobName) -> PathBuf {
        self.event_dir(event_id).join(name.as_str())
    }

    fn temp_dir(&self) -> PathBuf {
        self.base_path.join(".tmp")
    }

    async fn sweep_temp_dir(dir: &Path) -> Result<usize, StorageError> {
        let mut entries = fs::read_dir(dir).await?;
        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            match fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to remove stale temp file")
                }
            }
        }
        Ok(removed)
    }

    async fn copy_limited(
        reader: &mut (dyn AsyncRead + Unpin + Send),
        temp_file: &mut fs::File,
        limit: u64,
    ) -> Result<u64, StorageError> {
        let mut total_bytes: u64 = 0;
        let mut buf = vec![0u8; 64 * 1024]; // 64KB read buffer

        loop {
            let n = reader
                .read(&mut buf)
                .await
                .map_err(StorageError::Interrupted)?;
            if n == 0 {
                break;
            }

            total_bytes += n as u64;
            if total_bytes > limit {
                return Err(StorageError::SizeLimitExceeded {
                    actual: total_bytes,
                    limit,
                });
            }

            temp_file.write_all(&buf[..n]).await?;
        }

        temp_file.flush().await?;
        Ok(total_bytes)
    }
}

#[async_trait]
impl BlobStore for FilesystemBlobStore {
    async fn ensure_event_dir(&self, event_id: Uuid) -> Result<(), StorageError> {
        fs::create_dir_all(self.event_dir(event_id)).await?;
        Ok(())
    }

    async fn put_stream(
        &self,
        event_id: Uuid,
        name: &BlobName,
        reader: &mut (dyn AsyncRead + Unpin + Send),
        limit: u64,
    ) -> Result<u64, StorageError> {
        // Deleted on drop, so every early return and a cancelled write both
        // leave `.tmp` clean.
        let temp_path: TempPath = tempfile::Builder::new()
            .prefix("upload-")
            .tempfile_in(self.temp_dir())?
            .into_temp_path();
        let mut temp_file = fs::OpenOptions::new()
            .write(true)
            .open(&temp_path)
            .await?;

        let total_bytes = Self::copy_limited(reader, &mut temp_file, limit).await?;
        drop(temp_file);

        let blob_path = self.blob_path(event_id, name);
        if let Some(parent) = blob_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        temp_path.persist(&blob_path).map_err(|e| {
            warn!(path = %blob_path.display(), error = %e.error, "Failed to move upload into place");
            StorageError::from(e.error)
        })?;

        Ok(total_bytes)
    }

    async fn get_stream(
        &self,
        event_id: Uuid,
        name: &BlobName,
    ) -> Result<BoxReader, StorageError> {
        let blob_path = self.blob_path(event_id, name);
        match fs::File::open(&blob_path).await {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, event_id: Uuid, name: &BlobName) -> Result<bool, StorageError> {
        let blob_path = self.blob_path(event_id, name);
        match fs::remove_file(&blob_path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn size(&self, event_id: Uuid, name: &BlobName) -> Result<u64, StorageError> {
        let blob_path = self.blob_path(event_id, name);
        match fs::metadata(&blob_path).await {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_event(&self, event_id: Uuid) -> Result<(), StorageError> {
        match fs::remove_dir_all(self.event_dir(event_id)).await {
            Ok(()) => {
                info!(%event_id, "Removed event directory");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn local_path(&self, event_id: Uuid, name: &BlobName) -> PathBuf {
        self.blob_path(event_id, name)
    }
}
