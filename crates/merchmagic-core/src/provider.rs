//! External collaborators: identity, payment and image generation.
//!
//! These are consumed, never reimplemented. Concrete HTTP clients live
//! in the auth, billing and mockup crates; tests substitute fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::MerchResult;
use crate::models::account::AccountId;
use crate::models::mockup::{GenerationRequest, ImageData};

/// Identity assertion returned by the identity provider after a
/// successful code exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedIdentity {
    pub subject: String,
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// URL of the consent screen the browser is sent to.
    fn authorization_url(&self) -> MerchResult<String>;

    async fn exchange_code(&self, code: &str) -> MerchResult<VerifiedIdentity>;
}

/// Hosted checkout created by the payment provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// `account_id` travels as correlation metadata and comes back in
    /// the completion notification.
    async fn create_checkout(&self, account_id: &AccountId) -> MerchResult<CheckoutSession>;
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// `Ok(None)` means the provider answered without an image part.
    async fn generate(&self, request: &GenerationRequest) -> MerchResult<Option<ImageData>>;
}
