//! Upgrade checkout and payment notifications.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use merchmagic_billing::webhook::SIGNATURE_HEADER;
use serde_json::{Value, json};
use tracing::debug;

use super::require_account;
use crate::error::ApiError;
use crate::session::SessionToken;
use crate::state::AppState;

pub async fn create_checkout_session(
    State(state): State<AppState>,
    token: SessionToken,
) -> Result<Json<Value>, ApiError> {
    let account = require_account(&state, &token).await?;
    let checkout = state.entitlements.start_checkout(&account.id).await?;
    Ok(Json(json!({ "id": checkout.id, "url": checkout.url })))
}

/// Raw body is required: the signature covers the exact bytes.
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    let outcome = state.entitlements.handle_webhook(&body, signature).await?;
    debug!(?outcome, "Payment notification processed");
    Ok(Json(json!({ "received": true })))
}
