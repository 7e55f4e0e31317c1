//! MerchMagic Database: in-memory repository implementations.
//!
//! Accounts and sessions live in process memory only. Each account sits
//! behind its own lock, so read-modify-write sequences on one account are
//! serialized while other accounts proceed independently.

mod error;
pub mod repository;

pub use error::DbError;
pub use repository::{MemoryAccountRepository, MemorySessionRepository};
