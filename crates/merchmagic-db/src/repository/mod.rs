//! In-memory repository implementations.

mod account;
mod session;

pub use account::MemoryAccountRepository;
pub use session::MemorySessionRepository;
