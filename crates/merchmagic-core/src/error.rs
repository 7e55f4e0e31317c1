//! Error taxonomy for MerchMagic.
//!
//! Every service returns [`MerchResult`]. The HTTP layer renders each
//! variant with the stable reason string from [`MerchError::code`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MerchError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("session expired")]
    SessionExpired,

    #[error("daily limit of {limit} generations reached")]
    LimitReached { limit: u32 },

    #[error("external call failed: {0}")]
    ExternalCallFailed(String),

    #[error("configuration missing: {0}")]
    ConfigurationMissing(String),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MerchError {
    /// Machine-readable reason reported to clients.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::SessionExpired => "session_expired",
            Self::LimitReached { .. } => "limit_reached",
            Self::ExternalCallFailed(_) => "external_call_failed",
            Self::ConfigurationMissing(_) => "configuration_missing",
            Self::NotFound { .. } => "not_found",
            Self::Validation { .. } => "validation_failed",
            Self::Internal(_) => "internal",
        }
    }

    /// Whether the same request may succeed if the client sends it again.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ExternalCallFailed(_))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

pub type MerchResult<T> = Result<T, MerchError>;
