//! Billing error types.

use merchmagic_core::error::MerchError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BillingError {
    #[error("missing signature header")]
    MissingSignature,

    #[error("invalid signature format: {0}")]
    InvalidSignatureFormat(String),

    #[error("invalid signature")]
    InvalidSignature,

    #[error("signature timestamp outside tolerance")]
    TimestampOutsideTolerance,

    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("payment provider is not configured: {0}")]
    NotConfigured(&'static str),

    #[error("payment provider error: {0}")]
    Provider(String),
}

impl From<BillingError> for MerchError {
    fn from(err: BillingError) -> Self {
        match err {
            BillingError::MissingSignature
            | BillingError::InvalidSignatureFormat(_)
            | BillingError::InvalidSignature
            | BillingError::TimestampOutsideTolerance
            | BillingError::InvalidPayload(_) => MerchError::Validation {
                message: err.to_string(),
            },
            BillingError::NotConfigured(name) => MerchError::ConfigurationMissing(name.into()),
            BillingError::Provider(msg) => MerchError::ExternalCallFailed(msg),
        }
    }
}
