//! MerchMagic Billing: one-time upgrade checkout, payment webhook
//! verification, and the entitlement gate it drives.

pub mod config;
pub mod error;
pub mod service;
pub mod stripe;
pub mod webhook;

pub use config::BillingConfig;
pub use error::BillingError;
pub use service::{EntitlementService, WebhookOutcome};
pub use stripe::StripeClient;
