use axum::Json;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use common::storage::BlobName;
use sea_orm::*;
use tokio_util::io::ReaderStream;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::event::find_owned_event;
use crate::entity::{event, media};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::media::MediaResponse;
use crate::models::shared::MessageResponse;
use crate::services::archive::{ArchiveEntry, archive_filename, build_archive};
use crate::state::AppState;
use crate::utils::filename::content_disposition_value;

#[utoipa::path(
    get,
    path = "/{id}/media",
    tag = "Media",
    operation_id = "listEventMedia",
    summary = "List an event's media",
    description = "Newest first. Each item carries a relative `url` serving the stored file.",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Media list", body = Vec<MediaResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found or not owned (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn list_event_media(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<MediaResponse>>, AppError> {
    find_owned_event(&state.db, id, auth_user.user_id).await?;

    let items = media::Entity::find()
        .filter(media::Column::EventId.eq(id))
        .order_by_desc(media::Column::CreatedAt)
        .order_by_desc(media::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(items.into_iter().map(MediaResponse::from).collect()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Media",
    operation_id = "deleteMedia",
    summary = "Delete one media item",
    description = "Removes the stored file, then the record. Only the owner of the event may delete.",
    params(("id" = Uuid, Path, description = "Media ID")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Event belongs to someone else (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Media not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn delete_media(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    let item = media::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Media not found".into()))?;

    let owned = event::Entity::find_by_id(item.event_id)
        .filter(event::Column::OrganizerId.eq(auth_user.user_id))
        .one(&state.db)
        .await?
        .is_some();
    if !owned {
        return Err(AppError::PermissionDenied);
    }

    match BlobName::parse(&item.filename) {
        Ok(name) => {
            if !state.blob_store.delete(item.event_id, &name).await? {
                warn!(media_id = %id, filename = %item.filename, "Stored file already missing");
            }
        }
        Err(e) => warn!(media_id = %id, error = %e, "Media row has an invalid filename"),
    }

    media::Entity::delete_by_id(id).exec(&state.db).await?;
    info!(media_id = %id, event_id = %item.event_id, "Deleted media");

    Ok(Json(MessageResponse::new("Deleted")))
}

#[utoipa::path(
    get,
    path = "/{id}/download",
    tag = "Media",
    operation_id = "downloadEventMedia",
    summary = "Download all media as a zip",
    description = "Streams a zip of every stored file under its original name. Duplicate names \
        get a ` (n)` suffix before the extension.",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Zip archive", content_type = "application/zip"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found, not owned, or no media (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn download_event_media(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let event = find_owned_event(&state.db, id, auth_user.user_id).await?;

    let items = media::Entity::find()
        .filter(media::Column::EventId.eq(id))
        .order_by_asc(media::Column::CreatedAt)
        .order_by_asc(media::Column::Id)
        .all(&state.db)
        .await?;
    if items.is_empty() {
        return Err(AppError::NotFound("No media to download".into()));
    }

    let entries = items
        .into_iter()
        .filter_map(|m| match BlobName::parse(&m.filename) {
            Ok(name) => Some(ArchiveEntry {
                path: state.blob_store.local_path(id, &name),
                original_name: m.original_name,
            }),
            Err(_) => None,
        })
        .collect();

    let archive = build_archive(entries)
        .await
        .map_err(|e| AppError::Internal(format!("Zip build failed: {e:#}")))?;
    info!(event_id = %id, entries = archive.entries, size = archive.len, "Built media archive");

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/zip")
        .header(header::CONTENT_LENGTH, archive.len.to_string())
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_value("attachment", &archive_filename(&event.title)),
        )
        .body(Body::from_stream(ReaderStream::new(archive.file)))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))
}
