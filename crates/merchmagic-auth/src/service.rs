//! Session binding service: sign-in, lookup with self-heal, logout
//! and account deletion.

use chrono::{DateTime, Duration, Utc};
use merchmagic_core::clock::SharedClock;
use merchmagic_core::error::{MerchError, MerchResult};
use merchmagic_core::models::account::{Account, AccountId, CreateAccount};
use merchmagic_core::models::session::{CreateSession, Session};
use merchmagic_core::provider::VerifiedIdentity;
use merchmagic_core::repository::{AccountRepository, SessionRepository};
use tracing::{debug, info, warn};

use crate::config::AuthConfig;
use crate::token;

/// Result of resolving a session token.
#[derive(Debug, Clone)]
pub enum SessionLookup {
    /// No token, unknown token, or an expired session.
    Unbound,
    /// The token was bound to an account that no longer exists. The
    /// binding has already been cleared.
    Stale(AccountId),
    Bound(Account),
}

/// Successful sign-in result.
#[derive(Debug)]
pub struct SignInOutput {
    /// Raw opaque token (return to client, not stored).
    pub session_token: String,
    pub account: Account,
    pub expires_at: DateTime<Utc>,
}

/// Session binding service.
///
/// Generic over repository implementations so that the auth layer
/// has no dependency on the storage crate.
pub struct SessionService<A: AccountRepository, S: SessionRepository> {
    accounts: A,
    sessions: S,
    clock: SharedClock,
    config: AuthConfig,
}

impl<A: AccountRepository, S: SessionRepository> SessionService<A, S> {
    pub fn new(accounts: A, sessions: S, clock: SharedClock, config: AuthConfig) -> Self {
        Self {
            accounts,
            sessions,
            clock,
            config,
        }
    }

    pub fn accounts(&self) -> &A {
        &self.accounts
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Create (or reuse) the account for a verified identity and bind a
    /// fresh session token to it. Expired sessions of every account are
    /// purged on the way.
    pub async fn sign_in(&self, identity: VerifiedIdentity) -> MerchResult<SignInOutput> {
        let account = self
            .accounts
            .create(
                CreateAccount {
                    id: AccountId::new(identity.subject),
                    email: identity.email,
                    display_name: identity.name,
                    avatar_url: identity.picture,
                },
                self.clock.today(),
                self.clock.now(),
            )
            .await?;

        let purged = self.cleanup_expired().await?;
        if purged > 0 {
            debug!(purged, "Purged expired sessions");
        }

        let session_token = token::generate_session_token();
        let session = self.bind(&session_token, &account.id).await?;

        info!(account_id = %account.id, "Signed in");

        Ok(SignInOutput {
            session_token,
            account,
            expires_at: session.expires_at,
        })
    }

    /// Bind `raw_token` to `account_id` for the configured lifetime.
    pub async fn bind(&self, raw_token: &str, account_id: &AccountId) -> MerchResult<Session> {
        let lifetime = i64::try_from(self.config.session_lifetime_secs)
            .map_err(|_| MerchError::validation("session lifetime out of range"))?;
        let now = self.clock.now();
        self.sessions
            .create(CreateSession {
                token_hash: token::hash_session_token(raw_token),
                account_id: account_id.clone(),
                created_at: now,
                expires_at: now + Duration::seconds(lifetime),
            })
            .await
    }

    /// Resolve a token to its account.
    ///
    /// Expired sessions and sessions whose account is gone are removed
    /// as a side effect, so a second lookup of the same token reports
    /// [`SessionLookup::Unbound`].
    pub async fn lookup(&self, raw_token: Option<&str>) -> MerchResult<SessionLookup> {
        let Some(raw_token) = raw_token else {
            return Ok(SessionLookup::Unbound);
        };
        let token_hash = token::hash_session_token(raw_token);

        let Some(session) = self.sessions.get_by_token_hash(&token_hash).await? else {
            return Ok(SessionLookup::Unbound);
        };

        if session.is_expired(self.clock.now()) {
            self.sessions.invalidate(&token_hash).await?;
            return Ok(SessionLookup::Unbound);
        }

        match self.accounts.get(&session.account_id).await? {
            Some(account) => Ok(SessionLookup::Bound(account)),
            None => {
                self.sessions.invalidate(&token_hash).await?;
                warn!(account_id = %session.account_id, "Cleared stale session");
                Ok(SessionLookup::Stale(session.account_id))
            }
        }
    }

    /// Account id bound to `raw_token`, or `None` (including stale).
    pub async fn resolve(&self, raw_token: &str) -> MerchResult<Option<AccountId>> {
        Ok(match self.lookup(Some(raw_token)).await? {
            SessionLookup::Bound(account) => Some(account.id),
            SessionLookup::Unbound | SessionLookup::Stale(_) => None,
        })
    }

    /// Profile query: the current account or `None`. Never fails for
    /// missing or stale sessions.
    pub async fn current_account(&self, raw_token: Option<&str>) -> MerchResult<Option<Account>> {
        Ok(match self.lookup(raw_token).await? {
            SessionLookup::Bound(account) => Some(account),
            SessionLookup::Unbound | SessionLookup::Stale(_) => None,
        })
    }

    pub async fn unbind(&self, raw_token: &str) -> MerchResult<()> {
        self.sessions
            .invalidate(&token::hash_session_token(raw_token))
            .await
    }

    /// Logout. A missing token is a no-op.
    pub async fn logout(&self, raw_token: Option<&str>) -> MerchResult<()> {
        if let Some(raw_token) = raw_token {
            self.unbind(raw_token).await?;
        }
        Ok(())
    }

    /// Delete the caller's account and every session bound to it.
    pub async fn delete_account(&self, raw_token: Option<&str>) -> MerchResult<AccountId> {
        let account = match self.lookup(raw_token).await? {
            SessionLookup::Bound(account) => account,
            SessionLookup::Unbound => return Err(MerchError::Unauthenticated),
            SessionLookup::Stale(_) => return Err(MerchError::SessionExpired),
        };

        self.accounts.delete(&account.id).await?;
        let sessions = self
            .sessions
            .invalidate_account_sessions(&account.id)
            .await?;

        info!(account_id = %account.id, sessions, "Account deleted");
        Ok(account.id)
    }

    /// Purge expired sessions. Returns how many were removed.
    pub async fn cleanup_expired(&self) -> MerchResult<u64> {
        self.sessions.cleanup_expired(self.clock.now()).await
    }
}
