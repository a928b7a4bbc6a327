use chrono::{DateTime, Utc};
use common::MediaKind;
use serde::Serialize;
use uuid::Uuid;

use crate::entity::media;

/// Path prefix under which stored files are served.
pub const FILES_PATH: &str = "/api/v1/files";

pub fn file_url(event_id: Uuid, filename: &str) -> String {
    format!("{FILES_PATH}/{event_id}/{filename}")
}

/// Response to a successful guest upload.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UploadResponse {
    /// ID of the new media record.
    pub id: Uuid,
    /// Classified media kind.
    pub file_type: MediaKind,
    #[schema(example = "Upload successful")]
    pub message: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct MediaResponse {
    pub id: Uuid,
    pub event_id: Uuid,
    /// Opaque stored name.
    pub filename: String,
    pub original_name: String,
    pub file_type: MediaKind,
    /// Size in bytes of the stored (possibly transcoded) file.
    pub file_size: i64,
    pub uploader_name: String,
    pub created_at: DateTime<Utc>,
    /// Relative URL serving the file.
    #[schema(example = "/api/v1/files/0190c7a2-.../5d1e....jpg")]
    pub url: String,
}

impl From<media::Model> for MediaResponse {
    fn from(m: media::Model) -> Self {
        let url = file_url(m.event_id, &m.filename);
        Self {
            id: m.id,
            event_id: m.event_id,
            filename: m.filename,
            original_name: m.original_name,
            file_type: m.kind,
            file_size: m.size,
            uploader_name: m.uploader_name,
            created_at: m.created_at,
            url,
        }
    }
}
