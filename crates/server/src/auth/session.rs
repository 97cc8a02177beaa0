// Session manager: opaque cookie tokens backed by server-held records
// Decision: Full token is only ever in the client's cookie; the store keeps its SHA-256 digest
// Decision: Every login issues a fresh token; no rotation or revoke-all

use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::Utc;
use hushboard_core::{Principal, Result, SessionRecord, SessionStore, User};
use rand::Rng;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "hushboard_session";
const TOKEN_LENGTH: usize = 32; // 32 random bytes = 64 hex chars

/// Generate a new opaque session token
pub fn generate_session_token() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; TOKEN_LENGTH] = rng.gen();
    hex::encode(bytes)
}

/// Hash a session token for storage/lookup
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Validate session token format before touching the store
pub fn is_valid_token_format(token: &str) -> bool {
    token.len() == TOKEN_LENGTH * 2 && token.chars().all(|c| c.is_ascii_hexdigit())
}

/// Establishes, restores and destroys sessions
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    max_age: Duration,
    cookie_secure: bool,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>, max_age: Duration, cookie_secure: bool) -> Self {
        Self {
            store,
            max_age,
            cookie_secure,
        }
    }

    /// Anonymous -> Authenticated: store `{id, username}` under a new token
    pub async fn establish(&self, user: &User) -> Result<String> {
        let token = generate_session_token();
        let now = Utc::now();
        let max_age = chrono::Duration::from_std(self.max_age)
            .map_err(|e| anyhow::anyhow!("Invalid session max age: {}", e))?;
        let expires_at = now
            .checked_add_signed(max_age)
            .ok_or_else(|| anyhow::anyhow!("Session max age overflows the expiry timestamp"))?;

        self.store
            .insert(SessionRecord {
                token_hash: hash_token(&token),
                principal: user.principal(),
                expires_at,
                created_at: now,
            })
            .await?;

        tracing::debug!(user_id = %user.id, kind = %user.kind(), "Session established");
        Ok(token)
    }

    /// Resolve a token to its principal
    ///
    /// Missing, malformed and expired tokens all resolve to `None`; store
    /// failures are logged and also treated as anonymous.
    pub async fn restore(&self, token: &str) -> Option<Principal> {
        if !is_valid_token_format(token) {
            return None;
        }

        let token_hash = hash_token(token);
        let record = match self.store.get(&token_hash).await {
            Ok(record) => record?,
            Err(e) => {
                tracing::warn!("Session lookup failed, treating request as anonymous: {}", e);
                return None;
            }
        };

        if record.is_expired() {
            if let Err(e) = self.store.remove(&token_hash).await {
                tracing::warn!("Failed to remove expired session: {}", e);
            }
            return None;
        }

        Some(record.principal)
    }

    /// Authenticated -> Anonymous: invalidate the token server-side
    pub async fn destroy(&self, token: &str) -> Result<()> {
        if !is_valid_token_format(token) {
            return Ok(());
        }
        let existed = self.store.remove(&hash_token(token)).await?;
        tracing::debug!(existed, "Session destroyed");
        Ok(())
    }

    /// Cookie carrying a freshly established token
    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .secure(self.cookie_secure)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::seconds(
                i64::try_from(self.max_age.as_secs()).unwrap_or(i64::MAX),
            ))
            .build()
    }

    /// Cookie shape used to remove the session cookie
    pub fn removal_cookie() -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE).path("/").build()
    }
}
