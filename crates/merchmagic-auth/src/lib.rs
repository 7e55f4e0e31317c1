//! MerchMagic Auth: opaque session tokens, session binding with
//! stale-session self-heal, and the Google identity-provider client.

pub mod config;
pub mod error;
pub mod google;
pub mod service;
pub mod token;

pub use config::AuthConfig;
pub use error::AuthError;
pub use google::GoogleIdentityProvider;
pub use service::{SessionLookup, SessionService, SignInOutput};
