//! Storage-specific error types and conversions.

use merchmagic_core::error::MerchError;

/// Storage-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Account record was removed while locked: {0}")]
    Removed(String),
}

impl From<DbError> for MerchError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => MerchError::NotFound { entity, id },
            DbError::Removed(id) => MerchError::NotFound {
                entity: "account".into(),
                id,
            },
        }
    }
}
