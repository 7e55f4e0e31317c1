//! Server configuration loaded from the environment.

use std::env;

use merchmagic_auth::config::AuthConfig;
use merchmagic_billing::config::BillingConfig;
use merchmagic_core::error::{MerchError, MerchResult};
use merchmagic_core::quota::QuotaConfig;
use merchmagic_mockup::config::MockupConfig;

/// JSON bodies carry base64 images.
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 50 * 1024 * 1024;

/// Android app identity published in `assetlinks.json`.
#[derive(Debug, Clone)]
pub struct AndroidAppLinks {
    pub package_name: String,
    pub sha256_cert_fingerprint: String,
}

impl Default for AndroidAppLinks {
    fn default() -> Self {
        Self {
            package_name: "com.merchmagic.app".into(),
            sha256_cert_fingerprint: "YOUR_SHA256_HERE".into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Public origin, no trailing slash.
    pub app_url: String,
    pub body_limit_bytes: usize,
    pub auth: AuthConfig,
    pub billing: BillingConfig,
    pub mockup: MockupConfig,
    pub quota: QuotaConfig,
    pub android: AndroidAppLinks,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let app_url = "http://localhost:3000".to_string();
        Self {
            port: 3000,
            auth: AuthConfig {
                redirect_uri: AuthConfig::redirect_uri_for(&app_url),
                ..AuthConfig::default()
            },
            billing: BillingConfig::for_app_url(&app_url),
            app_url,
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
            mockup: MockupConfig::default(),
            quota: QuotaConfig::default(),
            android: AndroidAppLinks::default(),
        }
    }
}

type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

impl ServerConfig {
    pub fn from_env() -> MerchResult<Self> {
        Self::from_lookup(&|name| env::var(name).ok())
    }

    /// Build from any variable source. Missing credentials fail here,
    /// at startup, rather than on first use.
    pub fn from_lookup(lookup: Lookup<'_>) -> MerchResult<Self> {
        let port = u16::try_from(env_u64(lookup, "PORT", 3000)?)
            .map_err(|_| MerchError::validation("PORT out of range"))?;
        let app_url = env_string(lookup, "APP_URL")
            .map(|raw| normalize_app_url(&raw))
            .unwrap_or_else(|| format!("http://localhost:{port}"));

        let auth = AuthConfig {
            session_lifetime_secs: env_u64(lookup, "SESSION_LIFETIME_SECS", 86_400)?,
            google_client_id: env_required(lookup, "GOOGLE_CLIENT_ID")?,
            google_client_secret: env_required(lookup, "GOOGLE_CLIENT_SECRET")?,
            redirect_uri: AuthConfig::redirect_uri_for(&app_url),
        };

        let billing = BillingConfig {
            stripe_secret_key: env_string(lookup, "STRIPE_SECRET_KEY"),
            webhook_secret: env_string(lookup, "STRIPE_WEBHOOK_SECRET"),
            ..BillingConfig::for_app_url(&app_url)
        };

        let mockup_defaults = MockupConfig::default();
        let mockup = MockupConfig {
            gemini_api_key: env_required(lookup, "GEMINI_API_KEY")?,
            model: env_string(lookup, "GEMINI_MODEL").unwrap_or(mockup_defaults.model),
            ..mockup_defaults
        };

        let quota_defaults = QuotaConfig::default();
        let daily_free_limit = u32::try_from(env_u64(
            lookup,
            "DAILY_FREE_LIMIT",
            u64::from(quota_defaults.daily_free_limit),
        )?)
        .map_err(|_| MerchError::validation("DAILY_FREE_LIMIT out of range"))?;
        let quota = QuotaConfig {
            daily_free_limit,
            utc_offset_secs: env_i32(lookup, "QUOTA_UTC_OFFSET_SECS", quota_defaults.utc_offset_secs)?,
        };

        let android_defaults = AndroidAppLinks::default();
        let android = AndroidAppLinks {
            package_name: env_string(lookup, "ANDROID_PACKAGE_NAME")
                .unwrap_or(android_defaults.package_name),
            sha256_cert_fingerprint: env_string(lookup, "ANDROID_SHA256")
                .unwrap_or(android_defaults.sha256_cert_fingerprint),
        };

        Ok(Self {
            port,
            app_url,
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
            auth,
            billing,
            mockup,
            quota,
            android,
        })
    }
}

/// Strip trailing slashes and default to `https://` when no scheme is given.
pub fn normalize_app_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

fn env_string(lookup: Lookup<'_>, name: &str) -> Option<String> {
    lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_required(lookup: Lookup<'_>, name: &str) -> MerchResult<String> {
    env_string(lookup, name).ok_or_else(|| MerchError::ConfigurationMissing(name.into()))
}

fn env_u64(lookup: Lookup<'_>, name: &str, default: u64) -> MerchResult<u64> {
    match env_string(lookup, name) {
        Some(v) => v
            .parse::<u64>()
            .map_err(|_| MerchError::validation(format!("{name} must be an unsigned integer"))),
        None => Ok(default),
    }
}

fn env_i32(lookup: Lookup<'_>, name: &str, default: i32) -> MerchResult<i32> {
    match env_string(lookup, name) {
        Some(v) => v
            .parse::<i32>()
            .map_err(|_| MerchError::validation(format!("{name} must be an integer"))),
        None => Ok(default),
    }
}
