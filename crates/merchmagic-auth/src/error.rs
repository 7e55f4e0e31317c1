//! Authentication error types.

use merchmagic_core::error::MerchError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("authorization code exchange failed: {0}")]
    CodeExchange(String),

    #[error("identity token rejected: {0}")]
    IdentityRejected(String),

    #[error("identity provider is not configured: {0}")]
    NotConfigured(&'static str),
}

impl From<AuthError> for MerchError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::CodeExchange(_) | AuthError::IdentityRejected(_) => {
                MerchError::ExternalCallFailed(err.to_string())
            }
            AuthError::NotConfigured(name) => MerchError::ConfigurationMissing(name.into()),
        }
    }
}
