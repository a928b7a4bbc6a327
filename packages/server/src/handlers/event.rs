use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use common::PaymentStatus;
use sea_orm::*;
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::card::{CardJob, templates};
use crate::entity::{event, media};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::event::{
    CardPreviewQuery, CreateEventRequest, EventResponse, UpdateEventRequest,
    validate_create_event, validate_template_key, validate_update_event,
};
use crate::models::shared::{MessageResponse, non_blank};
use crate::state::AppState;
use crate::utils::slug::generate_slug;

const SLUG_ATTEMPTS: usize = 5;

/// Load an event owned by `organizer_id`. Other organizers' events are
/// indistinguishable from missing ones.
pub(crate) async fn find_owned_event<C: ConnectionTrait>(
    db: &C,
    event_id: Uuid,
    organizer_id: i32,
) -> Result<event::Model, AppError> {
    event::Entity::find_by_id(event_id)
        .filter(event::Column::OrganizerId.eq(organizer_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".into()))
}

/// Media count per event, for the given events only.
pub(crate) async fn media_counts<C: ConnectionTrait>(
    db: &C,
    event_ids: Vec<Uuid>,
) -> Result<HashMap<Uuid, u64>, DbErr> {
    if event_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<(Uuid, i64)> = media::Entity::find()
        .select_only()
        .column(media::Column::EventId)
        .column_as(media::Column::Id.count(), "media_count")
        .filter(media::Column::EventId.is_in(event_ids))
        .group_by(media::Column::EventId)
        .into_tuple()
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|(id, n)| (id, u64::try_from(n).unwrap_or(0)))
        .collect())
}

async fn media_count<C: ConnectionTrait>(db: &C, event_id: Uuid) -> Result<u64, DbErr> {
    media::Entity::find()
        .filter(media::Column::EventId.eq(event_id))
        .count(db)
        .await
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Events",
    operation_id = "listEvents",
    summary = "List the caller's events",
    description = "Returns the caller's events, newest first, each with its media count.",
    responses(
        (status = 200, description = "Event list", body = Vec<EventResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn list_events(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<EventResponse>>, AppError> {
    let events = event::Entity::find()
        .filter(event::Column::OrganizerId.eq(auth_user.user_id))
        .order_by_desc(event::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let counts = media_counts(&state.db, events.iter().map(|e| e.id).collect()).await?;

    Ok(Json(
        events
            .into_iter()
            .map(|e| {
                let n = counts.get(&e.id).copied().unwrap_or(0);
                EventResponse::from_model(e, n)
            })
            .collect(),
    ))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Events",
    operation_id = "createEvent",
    summary = "Create an event",
    description = "Creates an unpaid event with a fresh public slug and its upload directory.",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created", body = EventResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn create_event(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateEventRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_event(&payload)?;

    let template = payload
        .template
        .clone()
        .unwrap_or_else(|| templates::default_for(payload.event_type).key.to_string());
    let now = Utc::now();

    let mut attempt = 0;
    let created = loop {
        attempt += 1;
        let model = event::ActiveModel {
            id: Set(Uuid::now_v7()),
            organizer_id: Set(auth_user.user_id),
            title: Set(payload.title.trim().to_string()),
            subtitle: Set(non_blank(payload.subtitle.clone())),
            welcome_message: Set(non_blank(payload.welcome_message.clone())),
            event_date: Set(payload.event_date),
            event_type: Set(payload.event_type),
            template: Set(template.clone()),
            slug: Set(generate_slug()),
            is_paid: Set(false),
            payment_status: Set(PaymentStatus::Unpaid),
            qr_template: Set(None),
            qr_size: Set(None),
            guest_url: Set(None),
            payment_submitted_at: Set(None),
            payment_approved_at: Set(None),
            approved_by: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        match model.insert(&state.db).await {
            Ok(m) => break m,
            Err(e)
                if attempt < SLUG_ATTEMPTS
                    && matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) =>
            {
                warn!(attempt, "Slug collision, retrying");
            }
            Err(e) => return Err(e.into()),
        }
    };

    state.blob_store.ensure_event_dir(created.id).await?;

    Ok((
        StatusCode::CREATED,
        Json(EventResponse::from_model(created, 0)),
    ))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Events",
    operation_id = "getEvent",
    summary = "Get one of the caller's events",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event", body = EventResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found or not owned (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn get_event(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<EventResponse>, AppError> {
    let event = find_owned_event(&state.db, id, auth_user.user_id).await?;
    let n = media_count(&state.db, id).await?;
    Ok(Json(EventResponse::from_model(event, n)))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Events",
    operation_id = "updateEvent",
    summary = "Edit event details",
    description = "Partial update. `null` clears subtitle, welcome message, or date. \
        Payment fields are not editable here.",
    params(("id" = Uuid, Path, description = "Event ID")),
    request_body = UpdateEventRequest,
    responses(
        (status = 200, description = "Updated event", body = EventResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found or not owned (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn update_event(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateEventRequest>,
) -> Result<Json<EventResponse>, AppError> {
    validate_update_event(&payload)?;

    let existing = find_owned_event(&state.db, id, auth_user.user_id).await?;
    if let Some(key) = payload.template.as_deref() {
        validate_template_key(existing.event_type, key)?;
    }
    let mut model: event::ActiveModel = existing.into();

    if let Some(title) = payload.title {
        model.title = Set(title.trim().to_string());
    }
    if let Some(subtitle) = payload.subtitle {
        model.subtitle = Set(non_blank(subtitle));
    }
    if let Some(welcome) = payload.welcome_message {
        model.welcome_message = Set(non_blank(welcome));
    }
    if let Some(date) = payload.event_date {
        model.event_date = Set(date);
    }
    if let Some(template) = payload.template {
        model.template = Set(template);
    }
    model.updated_at = Set(Utc::now());

    let updated = model.update(&state.db).await?;
    let n = media_count(&state.db, id).await?;
    Ok(Json(EventResponse::from_model(updated, n)))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Events",
    operation_id = "deleteEvent",
    summary = "Delete an event and all of its media",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found or not owned (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn delete_event(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    let txn = state.db.begin().await?;
    find_owned_event(&txn, id, auth_user.user_id).await?;

    let removed = media::Entity::delete_many()
        .filter(media::Column::EventId.eq(id))
        .exec(&txn)
        .await?
        .rows_affected;
    event::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    // Rows are gone; a leftover directory is only wasted disk.
    if let Err(e) = state.blob_store.delete_event(id).await {
        warn!(event_id = %id, error = %e, "Failed to remove event directory");
    }
    tracing::info!(event_id = %id, media = removed, "Deleted event");

    Ok(Json(MessageResponse::new("Event deleted")))
}

#[utoipa::path(
    get,
    path = "/{id}/card",
    tag = "Events",
    operation_id = "previewCard",
    summary = "Render the QR card as PNG",
    description = "Renders the printable card for the caller's event. Query parameters override \
        the submitted template and size; unknown values fall back to the defaults.",
    params(("id" = Uuid, Path, description = "Event ID"), CardPreviewQuery),
    responses(
        (status = 200, description = "PNG image", content_type = "image/png"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found or not owned (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = auth_user.user_id))]
pub async fn preview_card(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<CardPreviewQuery>,
) -> Result<Response, AppError> {
    let event = find_owned_event(&state.db, id, auth_user.user_id).await?;
    let fallback_url = state.config.guest_url(&event.slug);
    let job = CardJob::for_event(&event, query.template, query.size, fallback_url);

    let png = state
        .cards
        .clone()
        .render_png_blocking(job)
        .await
        .map_err(|e| AppError::Internal(format!("Card render failed: {e:#}")))?;

    Ok((
        [
            (header::CONTENT_TYPE, "image/png"),
            (header::CACHE_CONTROL, "no-store"),
        ],
        png,
    )
        .into_response())
}
