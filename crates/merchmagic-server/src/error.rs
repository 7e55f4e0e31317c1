//! HTTP rendering of the error taxonomy.

use axum::Json;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use merchmagic_core::error::MerchError;
use merchmagic_mockup::error::MockupError;
use serde_json::json;
use tracing::error;

use crate::session::CLEAR_SESSION_COOKIE;

/// Handler error wrapper; renders as `{error, message, ...}`.
#[derive(Debug)]
pub struct ApiError(pub MerchError);

impl From<MerchError> for ApiError {
    fn from(err: MerchError) -> Self {
        Self(err)
    }
}

impl From<MockupError> for ApiError {
    fn from(err: MockupError) -> Self {
        Self(err.into())
    }
}

#[must_use]
pub fn status_for(err: &MerchError) -> StatusCode {
    match err {
        MerchError::Unauthenticated | MerchError::SessionExpired => StatusCode::UNAUTHORIZED,
        MerchError::LimitReached { .. } => StatusCode::FORBIDDEN,
        MerchError::ExternalCallFailed(_) => StatusCode::BAD_GATEWAY,
        MerchError::NotFound { .. } => StatusCode::NOT_FOUND,
        MerchError::Validation { .. } => StatusCode::BAD_REQUEST,
        MerchError::ConfigurationMissing(_) | MerchError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

pub fn limit_message(limit: u32) -> String {
    format!("You've reached your daily limit of {limit} generations. Upgrade to Pro for unlimited access!")
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = status_for(&err);
        let body = match &err {
            MerchError::Unauthenticated => json!({
                "error": err.code(),
                "message": "Please log in.",
            }),
            MerchError::SessionExpired => json!({
                "error": err.code(),
                "message": "Please log in again.",
            }),
            MerchError::LimitReached { limit } => json!({
                "error": err.code(),
                "message": limit_message(*limit),
                "limit": limit,
            }),
            MerchError::ExternalCallFailed(cause) => json!({
                "error": err.code(),
                "message": "Image generation failed. Please try again.",
                "cause": cause,
                "retryable": err.is_retryable(),
            }),
            MerchError::ConfigurationMissing(name) => {
                error!(missing = %name, "Request hit unconfigured provider");
                json!({
                    "error": err.code(),
                    "message": format!("{name} is not configured"),
                })
            }
            MerchError::Internal(msg) => {
                error!(error = %msg, "Internal error");
                json!({
                    "error": err.code(),
                    "message": "Internal server error",
                })
            }
            MerchError::NotFound { .. } | MerchError::Validation { .. } => json!({
                "error": err.code(),
                "message": err.to_string(),
            }),
        };

        let mut resp = (status, Json(body)).into_response();
        if matches!(err, MerchError::SessionExpired) {
            resp.headers_mut()
                .insert(SET_COOKIE, HeaderValue::from_static(CLEAR_SESSION_COOKIE));
        }
        resp
    }
}
