//! Route handlers.

pub mod auth;
pub mod billing;
pub mod mockup;
pub mod user;
pub mod well_known;

use chrono::NaiveDate;
use merchmagic_auth::service::SessionLookup;
use merchmagic_core::error::MerchError;
use merchmagic_core::models::account::Account;
use serde::Serialize;

use crate::error::ApiError;
use crate::session::SessionToken;
use crate::state::AppState;

/// Resolve the caller or fail with `unauthenticated` / `session_expired`.
pub(crate) async fn require_account(
    state: &AppState,
    token: &SessionToken,
) -> Result<Account, ApiError> {
    match state.sessions.lookup(token.as_deref()).await? {
        SessionLookup::Bound(account) => Ok(account),
        SessionLookup::Unbound => Err(MerchError::Unauthenticated.into()),
        SessionLookup::Stale(_) => Err(MerchError::SessionExpired.into()),
    }
}

/// Client-facing account snapshot. The counter is normalized to
/// `today` without touching the stored record.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    pub id: String,
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
    pub generations_used: u32,
    pub last_generation_date: NaiveDate,
    pub is_pro: bool,
    pub free_limit: u32,
    /// `None` for entitled accounts.
    pub remaining_today: Option<u32>,
}

impl AccountView {
    pub fn new(account: &Account, today: NaiveDate) -> Self {
        Self {
            id: account.id.to_string(),
            email: account.email.clone(),
            name: account.display_name.clone(),
            picture: account.avatar_url.clone(),
            generations_used: account.used_on(today),
            last_generation_date: account.last_generation_date(),
            is_pro: account.is_entitled(),
            free_limit: account.daily_free_limit(),
            remaining_today: account.remaining_on(today),
        }
    }
}
