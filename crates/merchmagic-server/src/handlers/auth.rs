//! Sign-in, callback and logout.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::http::header::SET_COOKIE;
use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::error::ApiError;
use crate::session::{CLEAR_SESSION_COOKIE, SessionToken, session_cookie};
use crate::state::AppState;

const CALLBACK_PAGE: &str = r#"<html>
  <body>
    <script>
      if (window.opener) {
        window.opener.postMessage({ type: 'OAUTH_AUTH_SUCCESS' }, '*');
        window.close();
      } else {
        window.location.href = '/';
      }
    </script>
    <p>Authentication successful. Closing window...</p>
  </body>
</html>
"#;

pub async fn google_url(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let url = state.identity.authorization_url()?;
    Ok(Json(json!({ "url": url })))
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    code: Option<String>,
    error: Option<String>,
}

fn auth_failed() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Authentication failed").into_response()
}

pub async fn callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Response {
    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        warn!(error = ?params.error, "Callback without authorization code");
        return auth_failed();
    };

    let identity = match state.identity.exchange_code(&code).await {
        Ok(identity) => identity,
        Err(err) => {
            warn!(error = %err, "Code exchange failed");
            return auth_failed();
        }
    };

    let signed_in = match state.sessions.sign_in(identity).await {
        Ok(out) => out,
        Err(err) => {
            warn!(error = %err, "Sign-in failed");
            return auth_failed();
        }
    };

    let Some(cookie) = session_cookie(
        &signed_in.session_token,
        state.sessions.config().session_lifetime_secs,
    ) else {
        return auth_failed();
    };

    info!(account_id = %signed_in.account.id, "Browser session established");
    ([(SET_COOKIE, cookie)], Html(CALLBACK_PAGE)).into_response()
}

pub async fn logout(
    State(state): State<AppState>,
    token: SessionToken,
) -> Result<impl IntoResponse, ApiError> {
    state.sessions.logout(token.as_deref()).await?;
    Ok((
        [(SET_COOKIE, CLEAR_SESSION_COOKIE)],
        Json(json!({ "success": true })),
    ))
}
