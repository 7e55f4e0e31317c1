//! Billing configuration.

/// Configuration for checkout creation and webhook verification.
#[derive(Debug, Clone)]
pub struct BillingConfig {
    /// Stripe secret API key. `None` disables checkout.
    pub stripe_secret_key: Option<String>,
    /// Stripe webhook signing secret (`whsec_...`). `None` rejects
    /// every notification.
    pub webhook_secret: Option<String>,
    pub product_name: String,
    pub product_description: String,
    /// Price in the currency's minor unit (default: 999 = $9.99).
    pub unit_amount: u64,
    pub currency: String,
    pub success_url: String,
    pub cancel_url: String,
    /// Maximum age of a signed notification in seconds (default: 300).
    pub signature_tolerance_secs: u64,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self::for_app_url("http://localhost:3000")
    }
}

impl BillingConfig {
    /// Defaults with redirect targets under `app_url`.
    pub fn for_app_url(app_url: &str) -> Self {
        let base = app_url.trim_end_matches('/');
        Self {
            stripe_secret_key: None,
            webhook_secret: None,
            product_name: "MerchMagic Pro".into(),
            product_description: "Unlimited AI Mockup Generations".into(),
            unit_amount: 999,
            currency: "usd".into(),
            success_url: format!("{base}/?payment=success"),
            cancel_url: format!("{base}/?payment=cancel"),
            signature_tolerance_secs: 300,
        }
    }
}
