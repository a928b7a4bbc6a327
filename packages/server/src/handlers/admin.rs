use std::collections::HashMap;

use axum::Json;
use axum::extract::State;
use chrono::Utc;
use common::PaymentStatus;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::*;
use tracing::{info, instrument};

use super::event::media_counts;
use crate::entity::{event, mail_settings, media, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::admin::{
    AdminEventItem, AdminUserItem, SmtpSettingsResponse, StatsResponse,
    UpdateSmtpSettingsRequest, validate_smtp_settings,
};
use crate::models::shared::{MessageResponse, non_blank};
use crate::services::notifier::{self, MailSettings};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/events",
    tag = "Admin",
    operation_id = "adminListEvents",
    summary = "All events with organizer and payment details",
    responses(
        (status = 200, description = "Events, newest first", body = Vec<AdminEventItem>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not an admin (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn list_events(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<AdminEventItem>>, AppError> {
    auth_user.require_admin()?;

    let rows = event::Entity::find()
        .find_also_related(user::Entity)
        .order_by_desc(event::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let counts = media_counts(&state.db, rows.iter().map(|(e, _)| e.id).collect()).await?;

    let items = rows
        .into_iter()
        .map(|(e, organizer)| AdminEventItem {
            media_count: counts.get(&e.id).copied().unwrap_or(0),
            id: e.id,
            title: e.title,
            slug: e.slug,
            event_type: e.event_type,
            organizer_id: e.organizer_id,
            organizer_email: organizer.as_ref().map(|u| u.email.clone()),
            organizer_name: organizer.map(|u| u.name),
            is_paid: e.is_paid,
            payment_status: e.payment_status,
            qr_template: e.qr_template,
            qr_size: e.qr_size,
            guest_url: e.guest_url,
            payment_submitted_at: e.payment_submitted_at,
            payment_approved_at: e.payment_approved_at,
            created_at: e.created_at,
        })
        .collect();

    Ok(Json(items))
}

#[utoipa::path(
    get,
    path = "/users",
    tag = "Admin",
    operation_id = "adminListUsers",
    summary = "All users with their role and event count",
    responses(
        (status = 200, description = "Users, newest first", body = Vec<AdminUserItem>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not an admin (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn list_users(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<AdminUserItem>>, AppError> {
    auth_user.require_admin()?;

    let users = user::Entity::find()
        .order_by_desc(user::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let event_counts: HashMap<i32, u64> = event::Entity::find()
        .select_only()
        .column(event::Column::OrganizerId)
        .column_as(event::Column::Id.count(), "event_count")
        .group_by(event::Column::OrganizerId)
        .into_tuple::<(i32, i64)>()
        .all(&state.db)
        .await?
        .into_iter()
        .map(|(id, n)| (id, u64::try_from(n).unwrap_or(0)))
        .collect();

    let auth = &state.config.auth;
    Ok(Json(
        users
            .into_iter()
            .map(|u| AdminUserItem {
                event_count: event_counts.get(&u.id).copied().unwrap_or(0),
                role: if auth.is_admin(&u.email, u.is_admin) {
                    "admin"
                } else {
                    "organizer"
                }
                .to_string(),
                id: u.id,
                email: u.email,
                name: u.name,
                created_at: u.created_at,
            })
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/stats",
    tag = "Admin",
    operation_id = "adminStats",
    summary = "Platform totals",
    responses(
        (status = 200, description = "Totals", body = StatsResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not an admin (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn stats(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<StatsResponse>, AppError> {
    auth_user.require_admin()?;

    let total_users = user::Entity::find().count(&state.db).await?;
    let total_events = event::Entity::find().count(&state.db).await?;
    let paid_events = event::Entity::find()
        .filter(event::Column::IsPaid.eq(true))
        .count(&state.db)
        .await?;
    let awaiting_approval = event::Entity::find()
        .filter(event::Column::PaymentStatus.eq(PaymentStatus::AwaitingApproval))
        .count(&state.db)
        .await?;
    let total_media = media::Entity::find().count(&state.db).await?;

    // SUM(bigint) is numeric in PostgreSQL; cast back so it decodes as i64.
    let storage_used: i64 = media::Entity::find()
        .select_only()
        .column_as(Expr::cust("COALESCE(SUM(\"size\"), 0)::BIGINT"), "storage_used")
        .into_tuple()
        .one(&state.db)
        .await?
        .unwrap_or(0);

    Ok(Json(StatsResponse {
        total_users,
        total_events,
        paid_events,
        awaiting_approval,
        total_media,
        storage_used,
    }))
}

async fn load_mail_settings<C: ConnectionTrait>(db: &C) -> Result<mail_settings::Model, AppError> {
    mail_settings::Entity::find_by_id(mail_settings::SINGLETON_ID)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Mail settings not initialized".into()))
}

#[utoipa::path(
    get,
    path = "/settings/smtp",
    tag = "Admin",
    operation_id = "getSmtpSettings",
    summary = "Outbound mail settings (password masked)",
    responses(
        (status = 200, description = "Settings", body = SmtpSettingsResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not an admin (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn get_smtp_settings(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<SmtpSettingsResponse>, AppError> {
    auth_user.require_admin()?;
    Ok(Json(load_mail_settings(&state.db).await?.into()))
}

#[utoipa::path(
    put,
    path = "/settings/smtp",
    tag = "Admin",
    operation_id = "updateSmtpSettings",
    summary = "Replace outbound mail settings",
    description = "Omitting `smtp_password`, or sending it empty or masked, keeps the stored one.",
    request_body = UpdateSmtpSettingsRequest,
    responses(
        (status = 200, description = "Saved settings", body = SmtpSettingsResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not an admin (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn update_smtp_settings(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<UpdateSmtpSettingsRequest>,
) -> Result<Json<SmtpSettingsResponse>, AppError> {
    auth_user.require_admin()?;
    validate_smtp_settings(&payload)?;

    let txn = state.db.begin().await?;
    let existing = mail_settings::Entity::find_by_id(mail_settings::SINGLETON_ID)
        .one(&txn)
        .await?;
    let password = payload
        .new_password()
        .map(str::to_string)
        .or_else(|| existing.and_then(|m| m.smtp_password));

    let model = mail_settings::ActiveModel {
        id: Set(mail_settings::SINGLETON_ID),
        smtp_host: Set(payload.smtp_host.trim().to_string()),
        smtp_port: Set(i32::from(payload.smtp_port)),
        smtp_user: Set(payload.smtp_user.trim().to_string()),
        smtp_password: Set(password),
        from_email: Set(non_blank(payload.from_email)),
        updated_at: Set(Utc::now()),
    };
    mail_settings::Entity::insert(model)
        .on_conflict(
            OnConflict::column(mail_settings::Column::Id)
                .update_columns([
                    mail_settings::Column::SmtpHost,
                    mail_settings::Column::SmtpPort,
                    mail_settings::Column::SmtpUser,
                    mail_settings::Column::SmtpPassword,
                    mail_settings::Column::FromEmail,
                    mail_settings::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(&txn)
        .await?;

    let saved = load_mail_settings(&txn).await?;
    txn.commit().await?;
    info!("SMTP settings saved");

    Ok(Json(saved.into()))
}

#[utoipa::path(
    post,
    path = "/settings/smtp/test",
    tag = "Admin",
    operation_id = "testSmtpSettings",
    summary = "Send a test email to the calling admin",
    responses(
        (status = 200, description = "Test email sent", body = MessageResponse),
        (status = 400, description = "Sending failed (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not an admin (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn test_smtp_settings(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, AppError> {
    auth_user.require_admin()?;

    let settings = MailSettings::from(load_mail_settings(&state.db).await?);
    if !settings.is_complete() {
        return Err(AppError::Validation(
            "SMTP settings are incomplete: host, user and password are required".into(),
        ));
    }

    if notifier::send_test_email(&settings, &auth_user.email).await {
        Ok(Json(MessageResponse::new(format!(
            "Test email sent to {}",
            auth_user.email
        ))))
    } else {
        Err(AppError::Validation(
            "Failed to send test email. Check the SMTP settings".into(),
        ))
    }
}
