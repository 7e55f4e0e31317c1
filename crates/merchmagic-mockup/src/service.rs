//! Generation orchestrator.
//!
//! One request walks `Start → AuthChecked → QuotaChecked →
//! ExternalCallInFlight → Succeeded | Failed`, or stops early with a
//! denial. The quota unit is charged before the provider call and is
//! kept even when the call fails. No lock is held across the call.

use std::fmt;
use std::sync::Arc;

use merchmagic_auth::service::{SessionLookup, SessionService};
use merchmagic_core::error::{MerchError, MerchResult};
use merchmagic_core::models::account::Account;
use merchmagic_core::models::mockup::{GeneratedMockup, GenerationRequest};
use merchmagic_core::provider::ImageGenerator;
use merchmagic_core::quota::QuotaLedger;
use merchmagic_core::repository::{AccountRepository, SessionRepository};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::MockupError;

/// Failure cause reported when the provider answers without an image.
pub const NO_IMAGE_RETURNED: &str = "no_image_returned";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    AuthChecked,
    QuotaChecked,
    ExternalCallInFlight,
    Succeeded,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AuthChecked => "auth_checked",
            Self::QuotaChecked => "quota_checked",
            Self::ExternalCallInFlight => "external_call_in_flight",
            Self::Succeeded => "succeeded",
        })
    }
}

/// Composes session binding, the quota ledger and the image provider.
pub struct GenerationService<A: AccountRepository, S: SessionRepository> {
    sessions: Arc<SessionService<A, S>>,
    ledger: QuotaLedger<A>,
    generator: Arc<dyn ImageGenerator>,
}

impl<A: AccountRepository, S: SessionRepository> GenerationService<A, S> {
    pub fn new(
        sessions: Arc<SessionService<A, S>>,
        ledger: QuotaLedger<A>,
        generator: Arc<dyn ImageGenerator>,
    ) -> Self {
        Self {
            sessions,
            ledger,
            generator,
        }
    }

    /// Run one generation request for the caller behind `session_token`.
    pub async fn handle(
        &self,
        session_token: Option<&str>,
        request: GenerationRequest,
    ) -> MerchResult<GeneratedMockup> {
        let account = self.authenticate(session_token).await?;
        debug!(account_id = %account.id, stage = %Stage::AuthChecked, "Session resolved");

        validate(&request)?;

        let used_today = match self.ledger.check_and_consume(&account.id).await {
            Ok(decision) => decision.into_result()?,
            // Deleted between lookup and charge.
            Err(MerchError::NotFound { .. }) => return Err(MerchError::SessionExpired),
            Err(err) => return Err(err),
        };
        debug!(account_id = %account.id, stage = %Stage::QuotaChecked, used_today, "Quota charged");

        debug!(account_id = %account.id, stage = %Stage::ExternalCallInFlight, "Calling image provider");
        let image = match self.generator.generate(&request).await {
            Ok(Some(image)) => image,
            Ok(None) => {
                warn!(account_id = %account.id, used_today, "Provider returned no image");
                return Err(MerchError::ExternalCallFailed(NO_IMAGE_RETURNED.into()));
            }
            Err(err) => {
                warn!(account_id = %account.id, used_today, error = %err, "Provider call failed");
                return Err(match err {
                    MerchError::ExternalCallFailed(_) | MerchError::ConfigurationMissing(_) => err,
                    other => MerchError::ExternalCallFailed(other.to_string()),
                });
            }
        };

        let mockup = GeneratedMockup {
            id: Uuid::new_v4(),
            image,
            product_type: request.product_type(),
            prompt: request.user_prompt().map(str::to_owned),
            created_at: self.ledger.clock().now(),
            generations_used_today: used_today,
        };
        info!(
            account_id = %account.id,
            mockup_id = %mockup.id,
            stage = %Stage::Succeeded,
            used_today,
            "Mockup generated"
        );
        Ok(mockup)
    }

    async fn authenticate(&self, session_token: Option<&str>) -> MerchResult<Account> {
        match self.sessions.lookup(session_token).await? {
            SessionLookup::Bound(account) => Ok(account),
            SessionLookup::Unbound => Err(MerchError::Unauthenticated),
            SessionLookup::Stale(_) => Err(MerchError::SessionExpired),
        }
    }
}

fn validate(request: &GenerationRequest) -> Result<(), MockupError> {
    match request {
        GenerationRequest::Create { logo, .. } if logo.data.is_empty() => {
            Err(MockupError::InvalidImage("logo is empty".into()))
        }
        GenerationRequest::Edit {
            current_mockup,
            logo,
            instruction,
            ..
        } => {
            if current_mockup.data.is_empty() || logo.data.is_empty() {
                return Err(MockupError::InvalidImage("edit needs a mockup and a logo".into()));
            }
            if instruction.trim().is_empty() {
                return Err(MockupError::EmptyInstruction);
            }
            Ok(())
        }
        GenerationRequest::Create { .. } => Ok(()),
    }
}
