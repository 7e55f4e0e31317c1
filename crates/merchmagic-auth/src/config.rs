//! Authentication configuration.

/// Configuration for session binding and the identity provider.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Session lifetime in seconds (default: 86_400 = 24 hours).
    pub session_lifetime_secs: u64,
    /// OAuth client id issued by Google.
    pub google_client_id: String,
    /// OAuth client secret issued by Google.
    pub google_client_secret: String,
    /// Absolute callback URL registered with the identity provider.
    pub redirect_uri: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_lifetime_secs: 86_400,
            google_client_id: String::new(),
            google_client_secret: String::new(),
            redirect_uri: "http://localhost:3000/auth/callback".into(),
        }
    }
}

impl AuthConfig {
    pub fn redirect_uri_for(app_url: &str) -> String {
        format!("{}/auth/callback", app_url.trim_end_matches('/'))
    }
}
