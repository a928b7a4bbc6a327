use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// `Json<T>` for request bodies, rejecting with the structured error envelope.
///
/// Bad or mistyped fields become `VALIDATION_ERROR` naming the offending
/// field; a missing JSON content type is `415` and an oversized body `413`.
pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(rejection_to_error)?;
        Ok(AppJson(value))
    }
}

fn rejection_to_error(rejection: JsonRejection) -> AppError {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => AppError::UnsupportedMediaType(
            "Expected request with `Content-Type: application/json`".into(),
        ),
        JsonRejection::JsonSyntaxError(_) => {
            AppError::Validation("Request body is not valid JSON".into())
        }
        JsonRejection::BytesRejection(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            AppError::PayloadTooLarge(e.body_text())
        }
        // Data errors carry the path of the field that failed, e.g.
        // "email: missing field `password`".
        other => AppError::Validation(other.body_text()),
    }
}
