//! Domain models for MerchMagic.

pub mod account;
pub mod mockup;
pub mod session;
