use common::PaymentStatus;
use serde::{Deserialize, Serialize};

use crate::card::templates::CardSize;
use crate::error::AppError;
use crate::services::payment::PaymentSubmission;

const MAX_TEMPLATE_KEY_CHARS: usize = 50;
const MAX_GUEST_URL_CHARS: usize = 2048;

/// Organizer's claim that the event has been paid for.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct SubmitPaymentRequest {
    /// Card template key. Unknown keys fall back to the event type's default.
    #[schema(example = "golden_elegance")]
    pub qr_template: String,
    /// Card size preset: `10x8` or `8x6`.
    #[schema(example = "10x8")]
    pub qr_size: String,
    /// URL encoded in the card's QR code.
    #[schema(example = "https://snapvault.example/event/3f9a1c0b7d2e")]
    pub guest_url: String,
}

pub fn validate_submit_payment(payload: &SubmitPaymentRequest) -> Result<(), AppError> {
    let template = payload.qr_template.trim();
    if template.is_empty() || template.chars().count() > MAX_TEMPLATE_KEY_CHARS {
        return Err(AppError::Validation(format!(
            "qr_template must be 1-{MAX_TEMPLATE_KEY_CHARS} characters"
        )));
    }
    if CardSize::from_key(payload.qr_size.trim()).is_none() {
        return Err(AppError::Validation(
            "qr_size must be one of: 10x8, 8x6".into(),
        ));
    }
    let url = payload.guest_url.trim();
    if !(url.starts_with("https://") || url.starts_with("http://"))
        || url.chars().count() > MAX_GUEST_URL_CHARS
    {
        return Err(AppError::Validation(
            "guest_url must be an http(s) URL".into(),
        ));
    }
    Ok(())
}

impl From<SubmitPaymentRequest> for PaymentSubmission {
    fn from(req: SubmitPaymentRequest) -> Self {
        Self {
            qr_template: req.qr_template.trim().to_string(),
            qr_size: req.qr_size.trim().to_string(),
            guest_url: req.guest_url.trim().to_string(),
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SubmitPaymentResponse {
    pub payment_status: PaymentStatus,
    #[schema(example = "Payment submitted for approval")]
    pub message: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ApprovePaymentResponse {
    pub is_paid: bool,
    pub payment_status: PaymentStatus,
    /// Whether the card email reached the SMTP server. Approval stands either way.
    pub email_sent: bool,
    #[schema(example = "Payment confirmed")]
    pub message: String,
}
