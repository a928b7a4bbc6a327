use std::io;

use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use futures::TryStreamExt;
use sea_orm::*;
use tokio_util::io::StreamReader;
use tracing::{info, instrument};

use crate::entity::event;
use crate::error::{AppError, ErrorBody};
use crate::models::event::GuestEventResponse;
use crate::models::media::UploadResponse;
use crate::services::upload::{self, StoredUpload, UploadPipeline, uploader_display_name};
use crate::state::AppState;
use crate::utils::filename::clean_original_name;
use crate::utils::slug::is_valid_slug;

/// Multipart framing and the small text fields on top of the file itself.
const MULTIPART_OVERHEAD: u64 = 1024 * 1024;

/// Route body limit for uploads. The pipeline enforces the exact file ceiling.
pub fn upload_body_limit(max_upload_size: u64) -> DefaultBodyLimit {
    let limit = max_upload_size.saturating_add(MULTIPART_OVERHEAD);
    DefaultBodyLimit::max(usize::try_from(limit).unwrap_or(usize::MAX))
}

async fn find_event_by_slug<C: ConnectionTrait>(db: &C, slug: &str) -> Result<event::Model, AppError> {
    if !is_valid_slug(slug) {
        return Err(AppError::NotFound("Event not found".into()));
    }
    event::Entity::find()
        .filter(event::Column::Slug.eq(slug))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".into()))
}

#[utoipa::path(
    get,
    path = "/events/{slug}",
    tag = "Guest",
    operation_id = "getGuestEvent",
    summary = "Public event page data",
    params(("slug" = String, Path, description = "Public event slug")),
    responses(
        (status = 200, description = "Event", body = GuestEventResponse),
        (status = 404, description = "Unknown slug (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_guest_event(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<GuestEventResponse>, AppError> {
    let event = find_event_by_slug(&state.db, &slug).await?;
    Ok(Json(GuestEventResponse::from(event)))
}

#[utoipa::path(
    post,
    path = "/events/{slug}/upload",
    tag = "Guest",
    operation_id = "uploadMedia",
    summary = "Upload a photo, video, or audio file",
    description = "Multipart upload. The `file` field is required and its content type must be \
        image/*, video/*, or audio/*. `uploader_name` is optional and defaults to `Guest`. \
        Large videos are compressed before the response is sent.",
    params(("slug" = String, Path, description = "Public event slug")),
    request_body(content_type = "multipart/form-data", description = "`file` plus optional `uploader_name`"),
    responses(
        (status = 201, description = "Stored", body = UploadResponse),
        (status = 400, description = "Bad type, missing file, or interrupted body (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Unknown slug (NOT_FOUND)", body = ErrorBody),
        (status = 413, description = "File over the size ceiling (PAYLOAD_TOO_LARGE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart), fields(event_id))]
pub async fn upload_media(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let event = find_event_by_slug(&state.db, &slug).await?;
    tracing::Span::current().record("event_id", tracing::field::display(event.id));

    let pipeline = UploadPipeline::from_state(&state);
    // A stored file is removed again if anything below fails or the
    // request is dropped before its record is written.
    let Receive { stored, uploader } = receive(&pipeline, event.id, multipart).await?;
    let Some(stored) = stored else {
        return Err(AppError::Validation("Missing 'file' field".into()));
    };

    let uploader = uploader_display_name(uploader.as_deref());
    let record = upload::record(&state.db, event.id, &stored, uploader).await?;
    let transcoded = stored.transcoded;
    stored.keep();

    info!(
        media_id = %record.id,
        filename = %record.filename,
        size = record.size,
        transcoded,
        "Recorded upload"
    );

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            id: record.id,
            file_type: record.kind,
            message: "Upload successful".into(),
        }),
    ))
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("Request body too large: {e}"))
    } else {
        AppError::Validation(format!("Multipart error: {e}"))
    }
}

struct Receive {
    stored: Option<StoredUpload>,
    uploader: Option<String>,
}

/// Walk the multipart body. The file is streamed to storage as soon as its
/// field arrives; returning early drops it again.
async fn receive(
    pipeline: &UploadPipeline<'_>,
    event_id: uuid::Uuid,
    mut multipart: Multipart,
) -> Result<Receive, AppError> {
    let mut out = Receive {
        stored: None,
        uploader: None,
    };

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Ok(out),
            Err(e) => return Err(multipart_error(e)),
        };

        match field.name() {
            Some("file") => {
                if out.stored.is_some() {
                    return Err(AppError::Validation(
                        "Only one 'file' field is allowed".into(),
                    ));
                }
                let kind = UploadPipeline::classify(field.content_type())?;
                let original_name = clean_original_name(field.file_name());
                let mut reader = StreamReader::new(Box::pin(field.map_err(io::Error::other)));
                out.stored = Some(
                    pipeline
                        .store(event_id, kind, original_name, &mut reader)
                        .await?,
                );
            }
            Some("uploader_name") => {
                out.uploader = Some(field.text().await.map_err(multipart_error)?);
            }
            _ => {} // Ignore unknown fields.
        }
    }
}
