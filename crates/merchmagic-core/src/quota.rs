//! Daily quota ledger and entitlement gate.
//!
//! The counter window is one calendar day. Rollover is lazy: it
//! happens on the first check of a new day, never from a timer, so an
//! account idle for a week resets once.

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::clock::{SharedClock, SystemClock};
use crate::error::{MerchError, MerchResult};
use crate::models::account::{Account, AccountId, DEFAULT_DAILY_FREE_LIMIT};
use crate::repository::AccountRepository;

/// Quota settings applied to new accounts and to the day boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaConfig {
    /// Default: 5.
    pub daily_free_limit: u32,
    /// Offset from UTC, in seconds, at which a new day starts (default: 0).
    pub utc_offset_secs: i32,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            daily_free_limit: DEFAULT_DAILY_FREE_LIMIT,
            utc_offset_secs: 0,
        }
    }
}

impl QuotaConfig {
    /// Wall clock whose calendar day follows the configured offset.
    pub fn clock(&self) -> MerchResult<SystemClock> {
        SystemClock::with_offset_secs(self.utc_offset_secs)
    }
}

/// Outcome of a single check-and-consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaDecision {
    /// One unit was charged; `used_today` is the new counter.
    Allowed { used_today: u32 },
    /// Nothing was charged.
    LimitReached { limit: u32 },
}

impl QuotaDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    /// Converts a denial into the error taxonomy.
    pub fn into_result(self) -> MerchResult<u32> {
        match self {
            Self::Allowed { used_today } => Ok(used_today),
            Self::LimitReached { limit } => Err(MerchError::LimitReached { limit }),
        }
    }
}

impl Account {
    /// Starts a new window when `today` is not the stored day.
    /// Returns whether a reset happened.
    pub(crate) fn roll_over(&mut self, today: NaiveDate) -> bool {
        if self.last_generation_date == today {
            return false;
        }
        self.generations_used_today = 0;
        self.last_generation_date = today;
        true
    }

    pub(crate) fn check_and_consume(&mut self, today: NaiveDate) -> QuotaDecision {
        self.roll_over(today);

        if !self.is_entitled && self.generations_used_today >= self.daily_free_limit {
            return QuotaDecision::LimitReached {
                limit: self.daily_free_limit,
            };
        }

        self.generations_used_today += 1;
        QuotaDecision::Allowed {
            used_today: self.generations_used_today,
        }
    }

    /// Counter as it would read on `today`, without mutating.
    pub fn used_on(&self, today: NaiveDate) -> u32 {
        if self.last_generation_date == today {
            self.generations_used_today
        } else {
            0
        }
    }

    /// `None` for entitled accounts.
    pub fn remaining_on(&self, today: NaiveDate) -> Option<u32> {
        if self.is_entitled {
            return None;
        }
        Some(self.daily_free_limit.saturating_sub(self.used_on(today)))
    }

    /// Idempotent. Returns whether the flag changed.
    pub(crate) fn grant_entitlement(&mut self) -> bool {
        let changed = !self.is_entitled;
        self.is_entitled = true;
        changed
    }
}

/// Applies quota and entitlement mutations through the account
/// repository's atomic update.
pub struct QuotaLedger<A: AccountRepository> {
    accounts: A,
    clock: SharedClock,
}

impl<A: AccountRepository> QuotaLedger<A> {
    pub fn new(accounts: A, clock: SharedClock) -> Self {
        Self { accounts, clock }
    }

    pub fn accounts(&self) -> &A {
        &self.accounts
    }

    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }

    /// Fails with `NotFound` when the account no longer exists.
    pub async fn check_and_consume(&self, id: &AccountId) -> MerchResult<QuotaDecision> {
        let today = self.clock.today();
        let decision = self
            .accounts
            .update(id, |account| account.check_and_consume(today))
            .await?;

        match decision {
            QuotaDecision::Allowed { used_today } => {
                debug!(account_id = %id, used_today, "Quota unit consumed");
            }
            QuotaDecision::LimitReached { limit } => {
                info!(account_id = %id, limit, "Daily free limit reached");
            }
        }
        Ok(decision)
    }

    pub async fn grant_entitlement(&self, id: &AccountId) -> MerchResult<bool> {
        let changed = self
            .accounts
            .update(id, |account| account.grant_entitlement())
            .await?;
        if changed {
            info!(account_id = %id, "Entitlement granted");
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::account::{CreateAccount, DEFAULT_DAILY_FREE_LIMIT};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn fresh(today: NaiveDate) -> Account {
        Account::new(
            CreateAccount {
                id: "sub-1".into(),
                email: "alice@example.com".into(),
                display_name: "Alice".into(),
                avatar_url: None,
            },
            DEFAULT_DAILY_FREE_LIMIT,
            today,
            Utc::now(),
        )
    }

    #[test]
    fn five_allowed_then_limit_reached() {
        let mut account = fresh(day(1));
        for expected in 1..=5 {
            assert_eq!(
                account.check_and_consume(day(1)),
                QuotaDecision::Allowed {
                    used_today: expected
                }
            );
        }
        assert_eq!(
            account.check_and_consume(day(1)),
            QuotaDecision::LimitReached { limit: 5 }
        );
    }

    #[test]
    fn denial_leaves_counter_untouched() {
        let mut account = fresh(day(1));
        for _ in 0..5 {
            account.check_and_consume(day(1));
        }
        let before = account.clone();
        for _ in 0..3 {
            assert!(!account.check_and_consume(day(1)).is_allowed());
        }
        assert_eq!(account, before);
    }

    #[test]
    fn yesterday_counter_resets_before_charging() {
        let mut account = fresh(day(1));
        for _ in 0..5 {
            account.check_and_consume(day(1));
        }
        assert_eq!(
            account.check_and_consume(day(2)),
            QuotaDecision::Allowed { used_today: 1 }
        );
        assert_eq!(account.last_generation_date(), day(2));
    }

    #[test]
    fn skipped_days_reset_exactly_once() {
        let mut account = fresh(day(1));
        account.check_and_consume(day(1));
        account.check_and_consume(day(1));

        assert!(account.roll_over(day(9)));
        assert!(!account.roll_over(day(9)));
        assert_eq!(account.generations_used_today(), 0);

        account.check_and_consume(day(9));
        account.check_and_consume(day(9));
        assert_eq!(account.generations_used_today(), 2);
    }

    #[test]
    fn entitled_account_passes_the_cap_and_keeps_counting() {
        let mut account = fresh(day(1));
        for _ in 0..5 {
            account.check_and_consume(day(1));
        }
        assert!(account.grant_entitlement());
        assert!(!account.grant_entitlement());
        assert_eq!(
            account.check_and_consume(day(1)),
            QuotaDecision::Allowed { used_today: 6 }
        );
        for _ in 0..20 {
            assert!(account.check_and_consume(day(1)).is_allowed());
        }
    }

    #[test]
    fn zero_limit_denies_immediately() {
        let mut account = fresh(day(1));
        account.daily_free_limit = 0;
        assert_eq!(
            account.check_and_consume(day(2)),
            QuotaDecision::LimitReached { limit: 0 }
        );
        assert_eq!(account.generations_used_today(), 0);
    }

    #[test]
    fn normalized_view_does_not_mutate() {
        let mut account = fresh(day(1));
        for _ in 0..4 {
            account.check_and_consume(day(1));
        }
        assert_eq!(account.used_on(day(1)), 4);
        assert_eq!(account.remaining_on(day(1)), Some(1));
        assert_eq!(account.used_on(day(2)), 0);
        assert_eq!(account.remaining_on(day(2)), Some(5));
        assert_eq!(account.generations_used_today(), 4);

        account.grant_entitlement();
        assert_eq!(account.remaining_on(day(1)), None);
    }

    #[test]
    fn decision_into_result() {
        assert_eq!(
            QuotaDecision::Allowed { used_today: 3 }.into_result().unwrap(),
            3
        );
        assert!(matches!(
            QuotaDecision::LimitReached { limit: 5 }.into_result(),
            Err(MerchError::LimitReached { limit: 5 })
        ));
    }

    #[test]
    fn quota_config_rejects_out_of_range_offset() {
        assert!(QuotaConfig::default().clock().is_ok());
        let config = QuotaConfig {
            utc_offset_secs: 86_400,
            ..QuotaConfig::default()
        };
        assert!(matches!(config.clock(), Err(MerchError::Validation { .. })));
    }
}
