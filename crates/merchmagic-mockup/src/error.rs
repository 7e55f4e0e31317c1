//! Mockup error types.

use merchmagic_core::error::MerchError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MockupError {
    #[error("invalid image: {0}")]
    InvalidImage(String),

    #[error("edit instruction must not be empty")]
    EmptyInstruction,

    #[error("image provider error: {0}")]
    Provider(String),

    #[error("image provider is not configured: {0}")]
    NotConfigured(&'static str),
}

impl From<MockupError> for MerchError {
    fn from(err: MockupError) -> Self {
        match err {
            MockupError::InvalidImage(_) | MockupError::EmptyInstruction => {
                MerchError::Validation {
                    message: err.to_string(),
                }
            }
            MockupError::Provider(msg) => MerchError::ExternalCallFailed(msg),
            MockupError::NotConfigured(name) => MerchError::ConfigurationMissing(name.into()),
        }
    }
}
