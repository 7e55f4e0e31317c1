//! Account domain model.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Free generations per calendar day for accounts without entitlement.
pub const DEFAULT_DAILY_FREE_LIMIT: u32 = 5;

/// Provider-issued identity key (the OAuth `sub` claim).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for AccountId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One end user's identity, quota state and entitlement.
///
/// Quota fields are private: they change only through the ledger
/// methods in [`crate::quota`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub email: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub(crate) generations_used_today: u32,
    pub(crate) last_generation_date: NaiveDate,
    pub(crate) is_entitled: bool,
    pub(crate) daily_free_limit: u32,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Fresh free-tier record for a first-seen identity.
    pub fn new(
        input: CreateAccount,
        daily_free_limit: u32,
        today: NaiveDate,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: input.id,
            email: input.email,
            display_name: input.display_name,
            avatar_url: input.avatar_url,
            generations_used_today: 0,
            last_generation_date: today,
            is_entitled: false,
            daily_free_limit,
            created_at,
        }
    }

    /// Raw stored counter. May belong to an earlier day; see
    /// [`Account::used_on`] for the normalized value.
    pub fn generations_used_today(&self) -> u32 {
        self.generations_used_today
    }

    pub fn last_generation_date(&self) -> NaiveDate {
        self.last_generation_date
    }

    pub fn is_entitled(&self) -> bool {
        self.is_entitled
    }

    pub fn daily_free_limit(&self) -> u32 {
        self.daily_free_limit
    }
}

/// Profile fields captured from the identity provider on first sign-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAccount {
    pub id: AccountId,
    pub email: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}
