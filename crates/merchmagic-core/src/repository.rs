//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Implementations must make
//! [`AccountRepository::update`] atomic per account id: the closure
//! runs while no other mutation of the same account is in flight.

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::MerchResult;
use crate::models::{
    account::{Account, AccountId, CreateAccount},
    session::{CreateSession, Session},
};

pub trait AccountRepository: Send + Sync {
    fn get(&self, id: &AccountId) -> impl Future<Output = MerchResult<Option<Account>>> + Send;

    /// Returns the existing record untouched when `input.id` is known;
    /// otherwise stores a fresh free-tier account dated `today` and
    /// stamped `created_at`.
    fn create(
        &self,
        input: CreateAccount,
        today: NaiveDate,
        created_at: DateTime<Utc>,
    ) -> impl Future<Output = MerchResult<Account>> + Send;

    /// Returns `false` when nothing was stored under `id`.
    fn delete(&self, id: &AccountId) -> impl Future<Output = MerchResult<bool>> + Send;

    /// Atomic read-modify-write. Fails with `NotFound` for unknown ids.
    fn update<F, R>(&self, id: &AccountId, f: F) -> impl Future<Output = MerchResult<R>> + Send
    where
        F: FnOnce(&mut Account) -> R + Send,
        R: Send;
}

pub trait SessionRepository: Send + Sync {
    fn create(&self, input: CreateSession) -> impl Future<Output = MerchResult<Session>> + Send;

    fn get_by_token_hash(
        &self,
        token_hash: &str,
    ) -> impl Future<Output = MerchResult<Option<Session>>> + Send;

    /// Removing an unknown hash is not an error.
    fn invalidate(&self, token_hash: &str) -> impl Future<Output = MerchResult<()>> + Send;

    /// Removes every session bound to `account_id`, returning how many.
    fn invalidate_account_sessions(
        &self,
        account_id: &AccountId,
    ) -> impl Future<Output = MerchResult<u64>> + Send;

    fn cleanup_expired(&self, now: DateTime<Utc>) -> impl Future<Output = MerchResult<u64>> + Send;
}
