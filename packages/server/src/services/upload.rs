//! Guest upload pipeline: classify, store under a fresh opaque name, and
//! transcode large videos. The media record is written last by [`record`],
//! so a failure at any earlier step leaves no row behind. Files written
//! along the way are removed when the [`StoredUpload`] holding them is
//! dropped without [`StoredUpload::keep`], which also covers a request
//! cancelled mid-upload.

use std::io;
use std::path::PathBuf;

use chrono::Utc;
use common::MediaKind;
use common::storage::{BlobName, BlobStore, StorageError, sanitized_extension};
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, Set};
use tokio::io::AsyncRead;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::entity::media;
use crate::services::transcoder::Transcoder;
use crate::state::AppState;

/// Uploader shown when the guest leaves the name blank.
pub const DEFAULT_UPLOADER: &str = "Guest";

const MAX_UPLOADER_CHARS: usize = 100;

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("unsupported content type: {0}")]
    UnsupportedType(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// A file that made it to the blob store but has no media record yet.
#[derive(Debug)]
pub struct StoredUpload {
    pub name: BlobName,
    pub kind: MediaKind,
    pub size: u64,
    pub original_name: String,
    pub transcoded: bool,
    guard: FileGuard,
}

impl StoredUpload {
    /// Keep the file on disk. Call once its media record is committed.
    pub fn keep(mut self) {
        self.guard.disarm();
    }
}

/// Removes a file on drop unless disarmed.
#[derive(Debug)]
struct FileGuard {
    path: Option<PathBuf>,
}

impl FileGuard {
    fn new(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    fn disarm(&mut self) {
        self.path = None;
    }
}

impl Drop for FileGuard {
    fn drop(&mut self) {
        let Some(path) = self.path.take() else {
            return;
        };
        match std::fs::remove_file(&path) {
            Ok(()) => debug!(path = %path.display(), "Removed unrecorded upload"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove unrecorded upload"),
        }
    }
}

pub struct UploadPipeline<'a> {
    pub blob_store: &'a dyn BlobStore,
    pub transcoder: &'a dyn Transcoder,
    pub max_size: u64,
    pub transcode_threshold: u64,
}

impl<'a> UploadPipeline<'a> {
    pub fn from_state(state: &'a AppState) -> Self {
        Self {
            blob_store: &*state.blob_store,
            transcoder: &*state.transcoder,
            max_size: state.config.storage.max_upload_size,
            transcode_threshold: state.config.storage.transcode_threshold,
        }
    }

    pub fn classify(content_type: Option<&str>) -> Result<MediaKind, UploadError> {
        MediaKind::from_content_type(content_type).ok_or_else(|| {
            UploadError::UnsupportedType(content_type.unwrap_or("<none>").to_string())
        })
    }

    /// Stream `reader` into the event's directory and transcode if needed.
    pub async fn store(
        &self,
        event_id: Uuid,
        kind: MediaKind,
        original_name: String,
        reader: &mut (dyn AsyncRead + Unpin + Send),
    ) -> Result<StoredUpload, UploadError> {
        let ext = sanitized_extension(&original_name)
            .unwrap_or_else(|| kind.default_extension().to_string());
        let name = BlobName::generate(&ext);

        self.blob_store.ensure_event_dir(event_id).await?;
        let guard = FileGuard::new(self.blob_store.local_path(event_id, &name));
        let size = self
            .blob_store
            .put_stream(event_id, &name, reader, self.max_size)
            .await?;

        info!(%event_id, filename = %name, size, %kind, "Stored upload");

        let mut stored = StoredUpload {
            name,
            kind,
            size,
            original_name,
            transcoded: false,
            guard,
        };

        if kind == MediaKind::Video && size > self.transcode_threshold {
            self.compress(event_id, &mut stored).await;
        }

        Ok(stored)
    }

    /// Replace the stored video with a compressed copy. Any failure keeps
    /// the original untouched; the partial output goes with `output_guard`.
    async fn compress(&self, event_id: Uuid, stored: &mut StoredUpload) {
        let compressed = stored.name.compressed();
        let input = self.blob_store.local_path(event_id, &stored.name);
        let output = self.blob_store.local_path(event_id, &compressed);
        let output_guard = FileGuard::new(output.clone());

        if let Err(e) = self.transcoder.transcode(&input, &output).await {
            warn!(%event_id, filename = %stored.name, error = %e, "Transcoding failed, keeping original");
            return;
        }

        let new_size = match self.blob_store.size(event_id, &compressed).await {
            Ok(size) => size,
            Err(e) => {
                warn!(%event_id, filename = %compressed, error = %e, "Compressed output unreadable, keeping original");
                return;
            }
        };

        self.discard_name(event_id, &stored.name).await;
        stored.guard.disarm();
        stored.guard = output_guard;
        info!(
            %event_id,
            filename = %compressed,
            original_size = stored.size,
            size = new_size,
            "Transcoded video"
        );
        stored.name = compressed;
        stored.size = new_size;
        stored.transcoded = true;
    }

    async fn discard_name(&self, event_id: Uuid, name: &BlobName) {
        if let Err(e) = self.blob_store.delete(event_id, name).await {
            warn!(%event_id, filename = %name, error = %e, "Failed to remove file");
        }
    }
}

/// Normalize the free-text uploader name.
pub fn uploader_display_name(raw: Option<&str>) -> String {
    let name: String = raw
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_control())
        .take(MAX_UPLOADER_CHARS)
        .collect();
    let name = name.trim();
    if name.is_empty() {
        DEFAULT_UPLOADER.to_string()
    } else {
        name.to_string()
    }
}

/// Persist the media row for a stored upload. Always the final step.
pub async fn record<C: ConnectionTrait>(
    conn: &C,
    event_id: Uuid,
    stored: &StoredUpload,
    uploader_name: String,
) -> Result<media::Model, DbErr> {
    media::ActiveModel {
        id: Set(Uuid::now_v7()),
        event_id: Set(event_id),
        filename: Set(stored.name.to_string()),
        original_name: Set(stored.original_name.clone()),
        kind: Set(stored.kind),
        size: Set(i64::try_from(stored.size).unwrap_or(i64::MAX)),
        uploader_name: Set(uploader_name),
        created_at: Set(Utc::now()),
    }
    .insert(conn)
    .await
}
