use axum::Json;
use axum::extract::{Path, State};
use common::PaymentStatus;
use sea_orm::*;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::card::CardJob;
use crate::entity::{event, mail_settings, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::payment::{
    ApprovePaymentResponse, SubmitPaymentRequest, SubmitPaymentResponse, validate_submit_payment,
};
use crate::services::notifier::{self, CardEmail, MailSettings};
use crate::services::payment::{PaymentService, TransitionOutcome};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/{id}/submit-payment",
    tag = "Payments",
    operation_id = "submitPayment",
    summary = "Submit payment for admin approval",
    description = "Records the chosen card template, size and guest URL and moves the event to \
        `awaiting_approval`. May be repeated until an admin approves; never marks the event paid.",
    params(("id" = Uuid, Path, description = "Event ID")),
    request_body = SubmitPaymentRequest,
    responses(
        (status = 200, description = "Awaiting approval", body = SubmitPaymentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found or not owned (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already paid (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn submit_payment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<SubmitPaymentRequest>,
) -> Result<Json<SubmitPaymentResponse>, AppError> {
    validate_submit_payment(&payload)?;

    let outcome = PaymentService::new(&state.db)
        .submit(id, auth_user.user_id, payload.into())
        .await?;

    match outcome {
        TransitionOutcome::Applied => {
            info!(event_id = %id, "Payment submitted");
            Ok(Json(SubmitPaymentResponse {
                payment_status: PaymentStatus::AwaitingApproval,
                message: "Payment submitted for approval".into(),
            }))
        }
        TransitionOutcome::AlreadyPaid => {
            Err(AppError::Conflict("Payment already confirmed".into()))
        }
        TransitionOutcome::NotFound => Err(AppError::NotFound("Event not found".into())),
    }
}

#[utoipa::path(
    post,
    path = "/events/{id}/approve-payment",
    tag = "Admin",
    operation_id = "approvePayment",
    summary = "Approve an event's payment",
    description = "Marks the event paid, then renders the QR card and emails it to the organizer. \
        Email failure does not undo the approval; it is reported as `email_sent: false`.",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Approved", body = ApprovePaymentResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not an admin (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Event not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already paid (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn approve_payment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApprovePaymentResponse>, AppError> {
    auth_user.require_admin()?;

    match PaymentService::new(&state.db)
        .approve(id, auth_user.user_id)
        .await?
    {
        TransitionOutcome::Applied => {}
        TransitionOutcome::AlreadyPaid => {
            return Err(AppError::Conflict("Payment already confirmed".into()));
        }
        TransitionOutcome::NotFound => return Err(AppError::NotFound("Event not found".into())),
    }
    info!(event_id = %id, admin_id = auth_user.user_id, "Payment approved");

    let email_sent = deliver_card(&state, id).await;

    Ok(Json(ApprovePaymentResponse {
        is_paid: true,
        payment_status: PaymentStatus::Approved,
        email_sent,
        message: "Payment confirmed".into(),
    }))
}

/// Render the card and email it to the organizer. Every failure is logged
/// and reported as `false`; the approval itself is already committed.
async fn deliver_card(state: &AppState, event_id: Uuid) -> bool {
    let loaded = event::Entity::find_by_id(event_id)
        .find_also_related(user::Entity)
        .one(&state.db)
        .await;
    let (event, organizer) = match loaded {
        Ok(Some((event, Some(organizer)))) => (event, organizer),
        Ok(_) => {
            warn!(%event_id, "Approved event or its organizer vanished, card not sent");
            return false;
        }
        Err(e) => {
            warn!(%event_id, error = %e, "Failed to reload approved event");
            return false;
        }
    };

    let settings = match mail_settings::Entity::find_by_id(mail_settings::SINGLETON_ID)
        .one(&state.db)
        .await
    {
        Ok(row) => row.map(MailSettings::from),
        Err(e) => {
            warn!(%event_id, error = %e, "Failed to load mail settings");
            return false;
        }
    };
    let Some(settings) = settings.filter(MailSettings::is_complete) else {
        warn!(%event_id, "Mail settings incomplete, card email skipped");
        return false;
    };

    let fallback_url = state.config.guest_url(&event.slug);
    let job = CardJob::for_event(&event, None, None, fallback_url);
    let guest_url = job.guest_url.clone();
    let png = match state.cards.clone().render_png_blocking(job).await {
        Ok(png) => png,
        Err(e) => {
            warn!(%event_id, error = %format!("{e:#}"), "Card render failed");
            return false;
        }
    };
    info!(%event_id, size = png.len(), "Rendered card");

    notifier::send_card_email(
        Some(&settings),
        &organizer.email,
        CardEmail {
            event_title: &event.title,
            guest_url: &guest_url,
            png,
        },
    )
    .await
}
