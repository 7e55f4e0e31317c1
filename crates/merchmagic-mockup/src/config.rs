//! Image-provider configuration.

#[derive(Debug, Clone)]
pub struct MockupConfig {
    pub gemini_api_key: String,
    /// Default: `gemini-2.5-flash-image`.
    pub model: String,
    /// Upper bound for one provider call in seconds (default: 120).
    pub request_timeout_secs: u64,
    /// Aspect ratio requested for new mockups (default: `1:1`).
    pub aspect_ratio: String,
}

impl Default for MockupConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: String::new(),
            model: "gemini-2.5-flash-image".into(),
            request_timeout_secs: 120,
            aspect_ratio: "1:1".into(),
        }
    }
}
