//! Entitlement service: upgrade checkout and payment completion.

use std::sync::Arc;

use merchmagic_core::clock::SharedClock;
use merchmagic_core::error::{MerchError, MerchResult};
use merchmagic_core::models::account::AccountId;
use merchmagic_core::provider::{CheckoutSession, PaymentProvider};
use merchmagic_core::quota::QuotaLedger;
use merchmagic_core::repository::AccountRepository;
use tracing::{info, warn};

use crate::config::BillingConfig;
use crate::error::BillingError;
use crate::webhook::{self, WebhookEvent};

/// What a verified notification did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// `newly` is false when the account was already entitled.
    Granted { account_id: AccountId, newly: bool },
    /// Completed checkout for an account that no longer exists.
    UnknownAccount(AccountId),
    /// Any other event, or a completed checkout without correlation
    /// metadata.
    Ignored { event_type: String },
}

/// The only component allowed to set an account's entitlement.
pub struct EntitlementService<A: AccountRepository> {
    ledger: QuotaLedger<A>,
    payments: Option<Arc<dyn PaymentProvider>>,
    config: BillingConfig,
}

impl<A: AccountRepository> EntitlementService<A> {
    pub fn new(
        accounts: A,
        clock: SharedClock,
        payments: Option<Arc<dyn PaymentProvider>>,
        config: BillingConfig,
    ) -> Self {
        Self {
            ledger: QuotaLedger::new(accounts, clock),
            payments,
            config,
        }
    }

    /// Idempotent. Returns whether the flag changed.
    pub async fn grant_entitlement(&self, account_id: &AccountId) -> MerchResult<bool> {
        self.ledger.grant_entitlement(account_id).await
    }

    /// Create a hosted checkout correlated with `account_id`.
    pub async fn start_checkout(&self, account_id: &AccountId) -> MerchResult<CheckoutSession> {
        let payments = self
            .payments
            .as_ref()
            .ok_or(BillingError::NotConfigured("STRIPE_SECRET_KEY"))?;
        payments.create_checkout(account_id).await
    }

    /// Verify and apply a payment notification.
    pub async fn handle_webhook(
        &self,
        payload: &[u8],
        signature: Option<&str>,
    ) -> MerchResult<WebhookOutcome> {
        let secret = self
            .config
            .webhook_secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(BillingError::NotConfigured("STRIPE_WEBHOOK_SECRET"))?;
        let signature = signature.ok_or(BillingError::MissingSignature)?;

        let now = self.ledger.clock().now().timestamp();
        webhook::verify_signature(
            payload,
            signature,
            secret,
            now,
            self.config.signature_tolerance_secs,
        )
        .inspect_err(|e| warn!(error = %e, "Rejected payment notification"))?;

        let event = WebhookEvent::parse(payload)?;
        if !event.is_checkout_completed() {
            return Ok(WebhookOutcome::Ignored {
                event_type: event.event_type,
            });
        }

        let Some(account_id) = event.correlated_account() else {
            warn!(event_id = ?event.id, "Completed checkout without account metadata");
            return Ok(WebhookOutcome::Ignored {
                event_type: event.event_type,
            });
        };

        match self.ledger.grant_entitlement(&account_id).await {
            Ok(newly) => Ok(WebhookOutcome::Granted { account_id, newly }),
            Err(MerchError::NotFound { .. }) => {
                info!(account_id = %account_id, "Payment for unknown account acknowledged");
                Ok(WebhookOutcome::UnknownAccount(account_id))
            }
            Err(e) => Err(e),
        }
    }
}
