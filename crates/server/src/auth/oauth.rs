// OAuth service for Google authentication
// Decision: Manual OAuth2 authorization-code flow over reqwest, no OAuth client crate
// Decision: Only the provider `sub` is kept; profile fields are not persisted

use anyhow::Context;
use async_trait::async_trait;
use hushboard_core::{Error, Result};
use rand::Rng;
use serde::Deserialize;

use super::config::GoogleOAuthConfig;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

/// User info from the OAuth provider
#[derive(Debug, Clone)]
pub struct OAuthUserInfo {
    /// Provider user ID (Google `sub`)
    pub provider_id: String,
}

/// An external identity provider using the authorization-code flow
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// Consent URL the browser is redirected to
    fn authorization_url(&self, state: &str) -> String;

    /// Exchange an authorization code for the provider's view of the user
    async fn exchange_code(&self, code: &str) -> Result<OAuthUserInfo>;
}

/// Random value carried through the consent round trip
pub fn generate_state() -> String {
    let bytes: [u8; 16] = rand::thread_rng().gen();
    hex::encode(bytes)
}

/// Google OAuth service
pub struct GoogleOAuthService {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl GoogleOAuthService {
    pub fn new(config: &GoogleOAuthConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            client_id: config.base.client_id.clone(),
            client_secret: config.base.client_secret.clone(),
            redirect_uri: config.base.redirect_uri.clone(),
        }
    }

    async fn fetch_user_info(&self, code: &str) -> anyhow::Result<GoogleUserInfo> {
        let token_response: GoogleTokenResponse = self
            .client
            .post(GOOGLE_TOKEN_URL)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .context("Failed to exchange code")?
            .error_for_status()
            .context("Token endpoint rejected the code")?
            .json()
            .await
            .context("Failed to parse token response")?;

        let user_info = self
            .client
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(&token_response.access_token)
            .send()
            .await
            .context("Failed to fetch user info")?
            .error_for_status()
            .context("Userinfo endpoint rejected the token")?
            .json()
            .await
            .context("Failed to parse user info")?;

        Ok(user_info)
    }
}

#[async_trait]
impl OAuthProvider for GoogleOAuthService {
    fn authorization_url(&self, state: &str) -> String {
        let params = [
            ("client_id", self.client_id.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("response_type", "code"),
            ("scope", "openid profile"),
            ("state", state),
        ];

        format!("{}?{}", GOOGLE_AUTH_URL, encode_query(&params))
    }

    async fn exchange_code(&self, code: &str) -> Result<OAuthUserInfo> {
        let user_info = self
            .fetch_user_info(code)
            .await
            .map_err(|e| Error::upstream(format!("google: {:#}", e)))?;

        Ok(OAuthUserInfo {
            provider_id: user_info.sub,
        })
    }
}

#[derive(Debug, Deserialize)]
struct GoogleTokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    sub: String,
}

fn encode_query(params: &[(&str, &str)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// URL encoding helper
mod urlencoding {
    pub fn encode(s: &str) -> String {
        let mut result = String::with_capacity(s.len());
        for byte in s.bytes() {
            match byte {
                b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                    result.push(byte as char)
                }
                _ => result.push_str(&format!("%{:02X}", byte)),
            }
        }
        result
    }
}
