//! MerchMagic Core: domain models, the daily quota ledger, and the
//! storage / collaborator seams shared by every other crate.

pub mod clock;
pub mod error;
pub mod models;
pub mod provider;
pub mod quota;
pub mod repository;

pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use error::{MerchError, MerchResult};
pub use quota::{QuotaConfig, QuotaDecision, QuotaLedger};
