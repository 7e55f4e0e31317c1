//! In-memory implementation of [`AccountRepository`].

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use merchmagic_core::error::MerchResult;
use merchmagic_core::models::account::{
    Account, AccountId, CreateAccount, DEFAULT_DAILY_FREE_LIMIT,
};
use merchmagic_core::repository::AccountRepository;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::error::DbError;

/// Per-account cell. `removed` is set under the cell lock on delete so
/// a writer that grabbed the cell just before removal sees it.
#[derive(Debug)]
struct Slot {
    account: Account,
    removed: bool,
}

type SlotRef = Arc<Mutex<Slot>>;

/// Process-memory account store with one lock per account.
#[derive(Clone)]
pub struct MemoryAccountRepository {
    slots: Arc<RwLock<HashMap<AccountId, SlotRef>>>,
    daily_free_limit: u32,
}

impl MemoryAccountRepository {
    pub fn new() -> Self {
        Self::with_daily_free_limit(DEFAULT_DAILY_FREE_LIMIT)
    }

    /// Limit applied to accounts created from now on.
    pub fn with_daily_free_limit(daily_free_limit: u32) -> Self {
        Self {
            slots: Arc::new(RwLock::new(HashMap::new())),
            daily_free_limit,
        }
    }

    pub async fn len(&self) -> usize {
        self.slots.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.slots.read().await.is_empty()
    }

    async fn slot(&self, id: &AccountId) -> Option<SlotRef> {
        self.slots.read().await.get(id).cloned()
    }
}

impl Default for MemoryAccountRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountRepository for MemoryAccountRepository {
    async fn get(&self, id: &AccountId) -> MerchResult<Option<Account>> {
        let Some(slot) = self.slot(id).await else {
            return Ok(None);
        };
        let slot = slot.lock().await;
        Ok((!slot.removed).then(|| slot.account.clone()))
    }

    async fn create(
        &self,
        input: CreateAccount,
        today: NaiveDate,
        created_at: DateTime<Utc>,
    ) -> MerchResult<Account> {
        loop {
            let existing = {
                let mut slots = self.slots.write().await;
                match slots.get(&input.id) {
                    Some(slot) => slot.clone(),
                    None => {
                        let account =
                            Account::new(input, self.daily_free_limit, today, created_at);
                        slots.insert(
                            account.id.clone(),
                            Arc::new(Mutex::new(Slot {
                                account: account.clone(),
                                removed: false,
                            })),
                        );
                        debug!(account_id = %account.id, "Account created");
                        return Ok(account);
                    }
                }
            };

            let slot = existing.lock().await;
            if !slot.removed {
                return Ok(slot.account.clone());
            }
            // Deleted between the map lookup and the cell lock; retry.
        }
    }

    async fn delete(&self, id: &AccountId) -> MerchResult<bool> {
        let removed = self.slots.write().await.remove(id);
        match removed {
            Some(slot) => {
                slot.lock().await.removed = true;
                debug!(account_id = %id, "Account deleted");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update<F, R>(&self, id: &AccountId, f: F) -> MerchResult<R>
    where
        F: FnOnce(&mut Account) -> R + Send,
        R: Send,
    {
        let slot = self.slot(id).await.ok_or_else(|| DbError::NotFound {
            entity: "account".into(),
            id: id.to_string(),
        })?;

        let mut slot = slot.lock().await;
        if slot.removed {
            return Err(DbError::Removed(id.to_string()).into());
        }
        Ok(f(&mut slot.account))
    }
}
