use chrono::{DateTime, NaiveDate, Utc};
use common::{EventType, PaymentStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::shared::{double_option, validate_optional_text, validate_title};
use crate::card::templates;
use crate::entity::event;
use crate::error::AppError;

const MAX_SUBTITLE_CHARS: usize = 200;
const MAX_WELCOME_CHARS: usize = 2000;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateEventRequest {
    #[schema(example = "Anna & Ben")]
    pub title: String,
    pub event_type: EventType,
    /// Template key; defaults to the event type's first template.
    #[schema(example = "elegant_frame")]
    pub template: Option<String>,
    #[schema(example = "June 1st, 2026")]
    pub subtitle: Option<String>,
    pub welcome_message: Option<String>,
    pub event_date: Option<NaiveDate>,
}

pub fn validate_create_event(payload: &CreateEventRequest) -> Result<(), AppError> {
    validate_title(&payload.title)?;
    validate_optional_text(payload.subtitle.as_deref(), "Subtitle", MAX_SUBTITLE_CHARS)?;
    validate_optional_text(
        payload.welcome_message.as_deref(),
        "Welcome message",
        MAX_WELCOME_CHARS,
    )?;
    if let Some(key) = payload.template.as_deref() {
        validate_template_key(payload.event_type, key)?;
    }
    Ok(())
}

#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub subtitle: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub welcome_message: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<NaiveDate>)]
    pub event_date: Option<Option<NaiveDate>>,
    pub template: Option<String>,
}

pub fn validate_update_event(payload: &UpdateEventRequest) -> Result<(), AppError> {
    if let Some(title) = payload.title.as_deref() {
        validate_title(title)?;
    }
    validate_optional_text(
        payload.subtitle.as_ref().and_then(|s| s.as_deref()),
        "Subtitle",
        MAX_SUBTITLE_CHARS,
    )?;
    validate_optional_text(
        payload.welcome_message.as_ref().and_then(|s| s.as_deref()),
        "Welcome message",
        MAX_WELCOME_CHARS,
    )?;
    Ok(())
}

/// Template keys are only valid for the event type that offers them.
pub fn validate_template_key(event_type: EventType, key: &str) -> Result<(), AppError> {
    if templates::is_known_template(event_type, key) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "Unknown template '{key}' for {} events",
            event_type.as_str()
        )))
    }
}

/// Organizer view of an event.
#[derive(Serialize, utoipa::ToSchema)]
pub struct EventResponse {
    pub id: Uuid,
    pub organizer_id: i32,
    pub title: String,
    pub subtitle: Option<String>,
    pub welcome_message: Option<String>,
    pub event_date: Option<NaiveDate>,
    pub event_type: EventType,
    pub template: String,
    /// Public token used in the guest URL.
    #[schema(example = "3f9a1c0b7d2e")]
    pub slug: String,
    pub media_count: u64,
    pub is_paid: bool,
    pub payment_status: PaymentStatus,
    pub qr_template: Option<String>,
    pub qr_size: Option<String>,
    pub guest_url: Option<String>,
    pub payment_submitted_at: Option<DateTime<Utc>>,
    pub payment_approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EventResponse {
    pub fn from_model(m: event::Model, media_count: u64) -> Self {
        Self {
            id: m.id,
            organizer_id: m.organizer_id,
            title: m.title,
            subtitle: m.subtitle,
            welcome_message: m.welcome_message,
            event_date: m.event_date,
            event_type: m.event_type,
            template: m.template,
            slug: m.slug,
            media_count,
            is_paid: m.is_paid,
            payment_status: m.payment_status,
            qr_template: m.qr_template,
            qr_size: m.qr_size,
            guest_url: m.guest_url,
            payment_submitted_at: m.payment_submitted_at,
            payment_approved_at: m.payment_approved_at,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// What a guest sees before uploading. No payment or owner fields.
#[derive(Serialize, utoipa::ToSchema)]
pub struct GuestEventResponse {
    pub id: Uuid,
    pub title: String,
    pub subtitle: Option<String>,
    pub welcome_message: Option<String>,
    pub event_date: Option<NaiveDate>,
    pub event_type: EventType,
    pub template: String,
}

impl From<event::Model> for GuestEventResponse {
    fn from(m: event::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            subtitle: m.subtitle,
            welcome_message: m.welcome_message,
            event_date: m.event_date,
            event_type: m.event_type,
            template: m.template,
        }
    }
}

/// Query for the card preview; both fall back like the renderer does.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct CardPreviewQuery {
    /// Template key (defaults to the event's template).
    pub template: Option<String>,
    /// `10x8` or `8x6`.
    pub size: Option<String>,
}
