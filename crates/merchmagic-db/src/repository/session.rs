//! In-memory implementation of [`SessionRepository`].

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use merchmagic_core::error::MerchResult;
use merchmagic_core::models::account::AccountId;
use merchmagic_core::models::session::{CreateSession, Session};
use merchmagic_core::repository::SessionRepository;
use tokio::sync::RwLock;

/// Process-memory session store keyed by token hash.
#[derive(Clone, Default)]
pub struct MemorySessionRepository {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl MemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

impl SessionRepository for MemorySessionRepository {
    async fn create(&self, input: CreateSession) -> MerchResult<Session> {
        let session = Session {
            token_hash: input.token_hash,
            account_id: input.account_id,
            created_at: input.created_at,
            expires_at: input.expires_at,
        };
        self.sessions
            .write()
            .await
            .insert(session.token_hash.clone(), session.clone());
        Ok(session)
    }

    async fn get_by_token_hash(&self, token_hash: &str) -> MerchResult<Option<Session>> {
        Ok(self.sessions.read().await.get(token_hash).cloned())
    }

    async fn invalidate(&self, token_hash: &str) -> MerchResult<()> {
        self.sessions.write().await.remove(token_hash);
        Ok(())
    }

    async fn invalidate_account_sessions(&self, account_id: &AccountId) -> MerchResult<u64> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| &session.account_id != account_id);
        Ok((before - sessions.len()) as u64)
    }

    async fn cleanup_expired(&self, now: DateTime<Utc>) -> MerchResult<u64> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(now));
        Ok((before - sessions.len()) as u64)
    }
}
