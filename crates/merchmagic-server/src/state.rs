//! Shared application state.

use std::sync::Arc;

use merchmagic_auth::service::SessionService;
use merchmagic_auth::GoogleIdentityProvider;
use merchmagic_billing::service::EntitlementService;
use merchmagic_billing::StripeClient;
use merchmagic_core::clock::SharedClock;
use merchmagic_core::error::MerchResult;
use merchmagic_core::provider::{IdentityProvider, ImageGenerator, PaymentProvider};
use merchmagic_core::quota::QuotaLedger;
use merchmagic_db::{MemoryAccountRepository, MemorySessionRepository};
use merchmagic_mockup::service::GenerationService;
use merchmagic_mockup::GeminiImageGenerator;
use tracing::warn;

use crate::config::ServerConfig;

pub type Accounts = MemoryAccountRepository;
pub type Sessions = MemorySessionRepository;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub clock: SharedClock,
    pub sessions: Arc<SessionService<Accounts, Sessions>>,
    pub entitlements: Arc<EntitlementService<Accounts>>,
    pub generations: Arc<GenerationService<Accounts, Sessions>>,
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    /// Wire services over fresh in-memory stores.
    pub fn new(
        config: ServerConfig,
        clock: SharedClock,
        identity: Arc<dyn IdentityProvider>,
        payments: Option<Arc<dyn PaymentProvider>>,
        generator: Arc<dyn ImageGenerator>,
    ) -> Self {
        let accounts = MemoryAccountRepository::with_daily_free_limit(config.quota.daily_free_limit);
        let sessions = Arc::new(SessionService::new(
            accounts.clone(),
            MemorySessionRepository::new(),
            clock.clone(),
            config.auth.clone(),
        ));
        let entitlements = Arc::new(EntitlementService::new(
            accounts.clone(),
            clock.clone(),
            payments,
            config.billing.clone(),
        ));
        let generations = Arc::new(GenerationService::new(
            sessions.clone(),
            QuotaLedger::new(accounts, clock.clone()),
            generator,
        ));
        Self {
            config: Arc::new(config),
            clock,
            sessions,
            entitlements,
            generations,
            identity,
        }
    }

    /// Wire the production Google, Stripe and Gemini clients.
    ///
    /// Stripe is optional: without a secret key checkout answers
    /// `configuration_missing`.
    pub fn from_config(config: ServerConfig) -> MerchResult<Self> {
        let clock: SharedClock = Arc::new(config.quota.clock()?);
        let identity: Arc<dyn IdentityProvider> =
            Arc::new(GoogleIdentityProvider::new(config.auth.clone())?);
        let generator: Arc<dyn ImageGenerator> =
            Arc::new(GeminiImageGenerator::new(config.mockup.clone())?);
        let payments: Option<Arc<dyn PaymentProvider>> =
            match StripeClient::new(config.billing.clone()) {
                Ok(client) => Some(Arc::new(client)),
                Err(err) => {
                    warn!(error = %err, "Checkout disabled");
                    None
                }
            };
        if config.billing.webhook_secret.is_none() {
            warn!("STRIPE_WEBHOOK_SECRET not set; payment notifications will be rejected");
        }
        Ok(Self::new(config, clock, identity, payments, generator))
    }
}
