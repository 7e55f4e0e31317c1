//! Google OAuth 2.0 identity provider client.
//!
//! The authorization code is exchanged for an ID token, which Google's
//! `tokeninfo` endpoint validates (signature and expiry). The audience
//! is checked here against our client id.

use std::time::Duration;

use async_trait::async_trait;
use merchmagic_core::error::{MerchError, MerchResult};
use merchmagic_core::provider::{IdentityProvider, VerifiedIdentity};
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::warn;

use crate::config::AuthConfig;
use crate::error::AuthError;

const AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const TOKENINFO_ENDPOINT: &str = "https://oauth2.googleapis.com/tokeninfo";
const SCOPES: &str = "https://www.googleapis.com/auth/userinfo.profile \
                      https://www.googleapis.com/auth/userinfo.email";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    id_token: Option<String>,
}

/// Subset of the `tokeninfo` response we rely on.
#[derive(Debug, Deserialize)]
pub struct TokenInfo {
    pub aud: String,
    pub sub: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

/// Checks the audience and maps claims to a [`VerifiedIdentity`].
pub fn verify_token_info(info: TokenInfo, client_id: &str) -> Result<VerifiedIdentity, AuthError> {
    if info.aud != client_id {
        return Err(AuthError::IdentityRejected(format!(
            "audience mismatch: {}",
            info.aud
        )));
    }
    if info.sub.is_empty() {
        return Err(AuthError::IdentityRejected("empty subject".into()));
    }
    Ok(VerifiedIdentity {
        subject: info.sub,
        email: info.email.unwrap_or_default(),
        name: info.name.unwrap_or_default(),
        picture: info.picture,
    })
}

#[derive(Clone)]
pub struct GoogleIdentityProvider {
    client: Client,
    config: AuthConfig,
    token_endpoint: String,
    tokeninfo_endpoint: String,
}

impl GoogleIdentityProvider {
    /// Fails with `ConfigurationMissing` when client credentials are empty.
    pub fn new(config: AuthConfig) -> MerchResult<Self> {
        if config.google_client_id.is_empty() {
            return Err(AuthError::NotConfigured("GOOGLE_CLIENT_ID").into());
        }
        if config.google_client_secret.is_empty() {
            return Err(AuthError::NotConfigured("GOOGLE_CLIENT_SECRET").into());
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| MerchError::Internal(format!("HTTP client: {e}")))?;
        Ok(Self {
            client,
            config,
            token_endpoint: TOKEN_ENDPOINT.into(),
            tokeninfo_endpoint: TOKENINFO_ENDPOINT.into(),
        })
    }

    /// Overrides the token and tokeninfo endpoints.
    pub fn with_endpoints(
        mut self,
        token_endpoint: impl Into<String>,
        tokeninfo_endpoint: impl Into<String>,
    ) -> Self {
        self.token_endpoint = token_endpoint.into();
        self.tokeninfo_endpoint = tokeninfo_endpoint.into();
        self
    }

    async fn fetch_id_token(&self, code: &str) -> Result<String, AuthError> {
        let response = self
            .client
            .post(&self.token_endpoint)
            .form(&[
                ("code", code),
                ("client_id", self.config.google_client_id.as_str()),
                ("client_secret", self.config.google_client_secret.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| AuthError::CodeExchange(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::CodeExchange(format!(
                "token endpoint returned {}",
                response.status()
            )));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::CodeExchange(format!("token response: {e}")))?;
        body.id_token
            .ok_or_else(|| AuthError::CodeExchange("response carried no id_token".into()))
    }

    async fn fetch_token_info(&self, id_token: &str) -> Result<TokenInfo, AuthError> {
        let response = self
            .client
            .get(&self.tokeninfo_endpoint)
            .query(&[("id_token", id_token)])
            .send()
            .await
            .map_err(|e| AuthError::IdentityRejected(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::IdentityRejected(format!(
                "tokeninfo returned {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AuthError::IdentityRejected(format!("tokeninfo response: {e}")))
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentityProvider {
    fn authorization_url(&self) -> MerchResult<String> {
        let url = Url::parse_with_params(
            AUTH_ENDPOINT,
            &[
                ("client_id", self.config.google_client_id.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", SCOPES),
                ("access_type", "offline"),
            ],
        )
        .map_err(|e| MerchError::Internal(format!("authorization URL: {e}")))?;
        Ok(url.into())
    }

    async fn exchange_code(&self, code: &str) -> MerchResult<VerifiedIdentity> {
        if code.is_empty() {
            return Err(MerchError::validation("missing authorization code"));
        }
        let id_token = self.fetch_id_token(code).await.inspect_err(|e| {
            warn!(error = %e, "Authorization code exchange failed");
        })?;
        let info = self.fetch_token_info(&id_token).await?;
        Ok(verify_token_info(info, &self.config.google_client_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AuthConfig {
        AuthConfig {
            google_client_id: "client-123.apps.googleusercontent.com".into(),
            google_client_secret: "shh".into(),
            redirect_uri: "https://merch.example.com/auth/callback".into(),
            ..AuthConfig::default()
        }
    }

    fn info(aud: &str) -> TokenInfo {
        TokenInfo {
            aud: aud.into(),
            sub: "1234567890".into(),
            email: Some("alice@example.com".into()),
            name: Some("Alice".into()),
            picture: None,
        }
    }

    #[test]
    fn authorization_url_carries_offline_consent_params() {
        let provider = GoogleIdentityProvider::new(config()).unwrap();
        let url = Url::parse(&provider.authorization_url().unwrap()).unwrap();
        let params: Vec<(String, String)> = url.query_pairs().into_owned().collect();

        let get = |k: &str| {
            params
                .iter()
                .find(|(key, _)| key == k)
                .map(|(_, v)| v.clone())
        };
        assert_eq!(
            get("client_id").as_deref(),
            Some("client-123.apps.googleusercontent.com")
        );
        assert_eq!(
            get("redirect_uri").as_deref(),
            Some("https://merch.example.com/auth/callback")
        );
        assert_eq!(get("access_type").as_deref(), Some("offline"));
        assert!(get("scope").unwrap().contains("userinfo.email"));
    }

    #[test]
    fn missing_credentials_fail_fast() {
        let err = GoogleIdentityProvider::new(AuthConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, MerchError::ConfigurationMissing(_)));
    }

    #[test]
    fn audience_must_match_client_id() {
        let identity = verify_token_info(info("client-123"), "client-123").unwrap();
        assert_eq!(identity.subject, "1234567890");
        assert_eq!(identity.email, "alice@example.com");

        assert!(matches!(
            verify_token_info(info("someone-else"), "client-123"),
            Err(AuthError::IdentityRejected(_))
        ));
    }
}
