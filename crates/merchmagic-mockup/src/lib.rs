//! MerchMagic Mockup: turns a logo and a product choice into a
//! generated mockup, charging one quota unit per attempt.

pub mod config;
pub mod data_url;
pub mod error;
pub mod gemini;
pub mod prompt;
pub mod service;

pub use config::MockupConfig;
pub use error::MockupError;
pub use gemini::GeminiImageGenerator;
pub use service::GenerationService;
