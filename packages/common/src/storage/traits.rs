use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncRead;
use uuid::Uuid;

use super::error::StorageError;
use super::name::BlobName;

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Per-event blob storage. Every blob lives at `(event_id, name)`.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Make sure the event's directory exists. Idempotent.
    async fn ensure_event_dir(&self, event_id: Uuid) -> Result<(), StorageError>;

    /// Stream `reader` into `(event_id, name)` and return the byte count.
    ///
    /// Aborts with [`StorageError::SizeLimitExceeded`] as soon as more than
    /// `limit` bytes have been read. On any failure nothing is left at the
    /// target location.
    async fn put_stream(
        &self,
        event_id: Uuid,
        name: &BlobName,
        reader: &mut (dyn AsyncRead + Unpin + Send),
        limit: u64,
    ) -> Result<u64, StorageError>;

    /// Open a blob for streaming reads.
    async fn get_stream(&self, event_id: Uuid, name: &BlobName)
    -> Result<BoxReader, StorageError>;

    /// Delete a blob.
    ///
    /// Returns `true` if the blob was deleted, `false` if it did not exist.
    async fn delete(&self, event_id: Uuid, name: &BlobName) -> Result<bool, StorageError>;

    /// Get the size of a blob in bytes.
    async fn size(&self, event_id: Uuid, name: &BlobName) -> Result<u64, StorageError>;

    /// Remove the event's directory with everything in it. A missing
    /// directory is not an error.
    async fn delete_event(&self, event_id: Uuid) -> Result<(), StorageError>;

    /// Local filesystem path of a blob, for tools that need a real file
    /// (the transcoder, archive builder).
    fn local_path(&self, event_id: Uuid, name: &BlobName) -> PathBuf;
}
