//! Stripe Checkout client.

use std::time::Duration;

use async_trait::async_trait;
use merchmagic_core::error::{MerchError, MerchResult};
use merchmagic_core::models::account::AccountId;
use merchmagic_core::provider::{CheckoutSession, PaymentProvider};
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::BillingConfig;
use crate::error::BillingError;
use crate::webhook::ACCOUNT_METADATA_KEY;

const API_BASE: &str = "https://api.stripe.com/v1";

#[derive(Debug, Deserialize)]
struct CheckoutResponse {
    id: String,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Creates one-time payment checkout sessions.
#[derive(Clone)]
pub struct StripeClient {
    client: Client,
    secret_key: String,
    config: BillingConfig,
    api_base: String,
}

impl StripeClient {
    /// Fails with `ConfigurationMissing` without a secret key.
    pub fn new(config: BillingConfig) -> MerchResult<Self> {
        let secret_key = config
            .stripe_secret_key
            .clone()
            .filter(|key| !key.is_empty())
            .ok_or(BillingError::NotConfigured("STRIPE_SECRET_KEY"))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| MerchError::Internal(format!("HTTP client: {e}")))?;
        Ok(Self {
            client,
            secret_key,
            config,
            api_base: API_BASE.into(),
        })
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Form fields for a single-item, one-time payment.
    pub fn checkout_form(&self, account_id: &AccountId) -> Vec<(String, String)> {
        let c = &self.config;
        vec![
            ("mode".into(), "payment".into()),
            ("payment_method_types[0]".into(), "card".into()),
            (
                "line_items[0][price_data][currency]".into(),
                c.currency.clone(),
            ),
            (
                "line_items[0][price_data][product_data][name]".into(),
                c.product_name.clone(),
            ),
            (
                "line_items[0][price_data][product_data][description]".into(),
                c.product_description.clone(),
            ),
            (
                "line_items[0][price_data][unit_amount]".into(),
                c.unit_amount.to_string(),
            ),
            ("line_items[0][quantity]".into(), "1".into()),
            ("success_url".into(), c.success_url.clone()),
            ("cancel_url".into(), c.cancel_url.clone()),
            (
                format!("metadata[{ACCOUNT_METADATA_KEY}]"),
                account_id.to_string(),
            ),
        ]
    }
}

#[async_trait]
impl PaymentProvider for StripeClient {
    async fn create_checkout(&self, account_id: &AccountId) -> MerchResult<CheckoutSession> {
        let response = self
            .client
            .post(format!("{}/checkout/sessions", self.api_base))
            .bearer_auth(&self.secret_key)
            .form(&self.checkout_form(account_id))
            .send()
            .await
            .map_err(|e| BillingError::Provider(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorEnvelope>()
                .await
                .ok()
                .and_then(|env| env.error.message)
                .unwrap_or_else(|| format!("checkout creation returned {status}"));
            warn!(account_id = %account_id, %status, "Checkout creation failed");
            return Err(BillingError::Provider(message).into());
        }

        let body: CheckoutResponse = response
            .json()
            .await
            .map_err(|e| BillingError::Provider(format!("checkout response: {e}")))?;
        let url = body
            .url
            .ok_or_else(|| BillingError::Provider("checkout session has no url".into()))?;

        info!(account_id = %account_id, checkout_id = %body.id, "Checkout session created");
        Ok(CheckoutSession { id: body.id, url })
    }
}
