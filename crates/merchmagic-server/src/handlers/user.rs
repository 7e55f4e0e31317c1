//! Profile and account deletion.

use axum::Json;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::response::IntoResponse;
use serde_json::{Value, json};

use super::AccountView;
use crate::error::ApiError;
use crate::session::{CLEAR_SESSION_COOKIE, SessionToken};
use crate::state::AppState;

/// `{user: null}` for anonymous or stale callers; a stale binding is
/// cleared as part of the lookup.
pub async fn profile(
    State(state): State<AppState>,
    token: SessionToken,
) -> Result<Json<Value>, ApiError> {
    let user = state
        .sessions
        .current_account(token.as_deref())
        .await?
        .map(|account| AccountView::new(&account, state.clock.today()));
    Ok(Json(json!({ "user": user })))
}

pub async fn delete_account(
    State(state): State<AppState>,
    token: SessionToken,
) -> Result<impl IntoResponse, ApiError> {
    state.sessions.delete_account(token.as_deref()).await?;
    Ok((
        [(SET_COOKIE, CLEAR_SESSION_COOKIE)],
        Json(json!({
            "success": true,
            "message": "Account and data deleted successfully.",
        })),
    ))
}
