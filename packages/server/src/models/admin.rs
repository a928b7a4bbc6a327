use chrono::{DateTime, Utc};
use common::{EventType, PaymentStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::mail_settings;
use crate::error::AppError;

/// Placeholder returned instead of the stored SMTP password.
pub const PASSWORD_MASK: &str = "********";

/// One row of the admin event overview.
#[derive(Serialize, utoipa::ToSchema)]
pub struct AdminEventItem {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub event_type: EventType,
    pub organizer_id: i32,
    /// `None` only if the organizer row is gone.
    pub organizer_email: Option<String>,
    pub organizer_name: Option<String>,
    pub is_paid: bool,
    pub payment_status: PaymentStatus,
    pub qr_template: Option<String>,
    pub qr_size: Option<String>,
    pub guest_url: Option<String>,
    pub payment_submitted_at: Option<DateTime<Utc>>,
    pub payment_approved_at: Option<DateTime<Utc>>,
    pub media_count: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AdminUserItem {
    pub id: i32,
    pub email: String,
    pub name: String,
    /// `admin` or `organizer`.
    pub role: String,
    pub event_count: u64,
    pub created_at: DateTime<Utc>,
}

/// Platform totals.
#[derive(Serialize, utoipa::ToSchema)]
pub struct StatsResponse {
    pub total_users: u64,
    pub total_events: u64,
    pub paid_events: u64,
    pub awaiting_approval: u64,
    pub total_media: u64,
    /// Bytes across all stored media.
    #[schema(example = 734003200)]
    pub storage_used: i64,
}

/// SMTP settings with the password masked.
#[derive(Serialize, utoipa::ToSchema)]
pub struct SmtpSettingsResponse {
    #[schema(example = "smtp.hostinger.com")]
    pub smtp_host: String,
    #[schema(example = 465)]
    pub smtp_port: i32,
    pub smtp_user: String,
    /// `********` when a password is stored, empty otherwise.
    pub smtp_password: String,
    pub from_email: Option<String>,
}

impl From<mail_settings::Model> for SmtpSettingsResponse {
    fn from(m: mail_settings::Model) -> Self {
        let masked = match m.smtp_password.as_deref() {
            Some(p) if !p.is_empty() => PASSWORD_MASK.to_string(),
            _ => String::new(),
        };
        Self {
            smtp_host: m.smtp_host,
            smtp_port: m.smtp_port,
            smtp_user: m.smtp_user,
            smtp_password: masked,
            from_email: m.from_email,
        }
    }
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateSmtpSettingsRequest {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_user: String,
    /// Omitted, empty, or the mask keeps the stored password.
    pub smtp_password: Option<String>,
    pub from_email: Option<String>,
}

impl UpdateSmtpSettingsRequest {
    /// The new password to store, if the request actually carries one.
    pub fn new_password(&self) -> Option<&str> {
        self.smtp_password
            .as_deref()
            .filter(|p| !p.is_empty() && *p != PASSWORD_MASK)
    }
}

pub fn validate_smtp_settings(payload: &UpdateSmtpSettingsRequest) -> Result<(), AppError> {
    let host = payload.smtp_host.trim();
    if host.is_empty() || host.len() > 253 || host.contains(char::is_whitespace) {
        return Err(AppError::Validation("smtp_host must be a host name".into()));
    }
    if payload.smtp_port == 0 {
        return Err(AppError::Validation("smtp_port must be 1-65535".into()));
    }
    if payload.smtp_user.trim().is_empty() {
        return Err(AppError::Validation("smtp_user must not be empty".into()));
    }
    if let Some(from) = payload.from_email.as_deref()
        && !from.trim().is_empty()
        && !from.contains('@')
    {
        return Err(AppError::Validation("from_email must be an email address".into()));
    }
    Ok(())
}
