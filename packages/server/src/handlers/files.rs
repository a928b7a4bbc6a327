use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use common::storage::BlobName;
use tokio_util::io::ReaderStream;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{AppError, ErrorBody};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/{event_id}/{filename}",
    tag = "Files",
    operation_id = "serveFile",
    summary = "Serve a stored media file",
    description = "No authentication: stored names are random and unguessable.",
    params(
        ("event_id" = Uuid, Path, description = "Event ID"),
        ("filename" = String, Path, description = "Opaque stored filename"),
    ),
    responses(
        (status = 200, description = "File content"),
        (status = 404, description = "No such file (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn serve_file(
    State(state): State<AppState>,
    Path((event_id, filename)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let event_id =
        Uuid::parse_str(&event_id).map_err(|_| AppError::NotFound("File not found".into()))?;
    let name = BlobName::parse(&filename)?;
    let size = state.blob_store.size(event_id, &name).await?;
    let reader = state.blob_store.get_stream(event_id, &name).await?;

    let content_type = mime_guess::from_path(name.as_str())
        .first_or_octet_stream()
        .to_string();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, size.to_string())
        .header(header::CACHE_CONTROL, "public, max-age=31536000, immutable")
        .body(Body::from_stream(ReaderStream::new(reader)))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))
}
