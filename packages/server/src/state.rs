use std::sync::Arc;
use std::time::Duration;

use common::storage::BlobStore;
use common::storage::filesystem::FilesystemBlobStore;
use sea_orm::DatabaseConnection;

use crate::card::CardRenderer;
use crate::config::AppConfig;
use crate::services::transcoder::{FfmpegTranscoder, Transcoder};

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    pub blob_store: Arc<dyn BlobStore>,
    pub transcoder: Arc<dyn Transcoder>,
    pub cards: Arc<CardRenderer>,
}

impl AppState {
    /// Build the runtime components described by `config`.
    pub async fn new(db: DatabaseConnection, config: AppConfig) -> anyhow::Result<Self> {
        let blob_store = FilesystemBlobStore::new(config.storage.upload_dir.clone()).await?;
        let transcoder = FfmpegTranscoder::new(
            config.transcoder.ffmpeg_bin.clone(),
            Duration::from_secs(config.transcoder.timeout_secs),
        );
        let cards = CardRenderer::new(config.card.font_path.as_deref())?;

        Ok(Self {
            db,
            config,
            blob_store: Arc::new(blob_store),
            transcoder: Arc::new(transcoder),
            cards: Arc::new(cards),
        })
    }
}
