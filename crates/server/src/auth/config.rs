// Authentication configuration loaded from environment variables.
// Decision: AUTH_ prefix for all auth config; the bare CLIENT_ID / CLIENT_SECRET names are accepted too
// Decision: Google OAuth is optional; without it only local accounts work

use std::time::Duration;

/// Default session lifetime (30 days)
const DEFAULT_SESSION_MAX_AGE: Duration = Duration::from_secs(30 * 24 * 60 * 60);
/// Upper bound on the session lifetime (400 days, the browser cap for cookie Max-Age)
const MAX_SESSION_MAX_AGE: Duration = Duration::from_secs(400 * 24 * 60 * 60);

/// OAuth provider configuration
#[derive(Debug, Clone)]
pub struct OAuthProviderConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

/// Google OAuth configuration
#[derive(Debug, Clone)]
pub struct GoogleOAuthConfig {
    pub base: OAuthProviderConfig,
}

/// Complete authentication configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Base URL for OAuth callbacks
    pub base_url: String,
    /// Google OAuth configuration
    pub google: Option<GoogleOAuthConfig>,
    /// Session max age
    pub session_max_age: Duration,
    /// Mark cookies `Secure` (requires HTTPS)
    pub cookie_secure: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            google: None,
            session_max_age: DEFAULT_SESSION_MAX_AGE,
            cookie_secure: false,
        }
    }
}

impl AuthConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup (extracted for testing)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |primary: &str, fallback: &str| {
            lookup(primary)
                .or_else(|| lookup(fallback))
                .filter(|s| !s.is_empty())
        };

        let base_url = var("AUTH_BASE_URL", "BASE_URL")
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or_else(|| "http://localhost:3000".to_string());

        // Google OAuth configuration
        let google = match (
            var("AUTH_GOOGLE_CLIENT_ID", "CLIENT_ID"),
            var("AUTH_GOOGLE_CLIENT_SECRET", "CLIENT_SECRET"),
        ) {
            (Some(client_id), Some(client_secret)) => {
                let redirect_uri = lookup("AUTH_GOOGLE_REDIRECT_URI")
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| format!("{}/auth/google/secrets", base_url));
                Some(GoogleOAuthConfig {
                    base: OAuthProviderConfig {
                        client_id,
                        client_secret,
                        redirect_uri,
                    },
                })
            }
            _ => None,
        };

        let session_max_age = lookup("AUTH_SESSION_MAX_AGE")
            .and_then(|s| s.parse().ok())
            .map(|mins: u64| {
                let secs = mins.checked_mul(60).unwrap_or(u64::MAX);
                Duration::from_secs(secs).min(MAX_SESSION_MAX_AGE)
            })
            .unwrap_or(DEFAULT_SESSION_MAX_AGE);

        let cookie_secure = lookup("AUTH_COOKIE_SECURE")
            .map(|s| s.to_lowercase() == "true" || s == "1")
            .unwrap_or(false);

        Self {
            base_url,
            google,
            session_max_age,
            cookie_secure,
        }
    }

    /// Check if OAuth is available
    pub fn oauth_enabled(&self) -> bool {
        self.google.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = AuthConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config.base_url, "http://localhost:3000");
        assert!(!config.oauth_enabled());
        assert_eq!(config.session_max_age, DEFAULT_SESSION_MAX_AGE);
        assert!(!config.cookie_secure);
    }

    #[test]
    fn test_google_config_with_default_redirect() {
        let config = AuthConfig::from_lookup(lookup_from(&[
            ("AUTH_BASE_URL", "https://secrets.example.com/"),
            ("AUTH_GOOGLE_CLIENT_ID", "id"),
            ("AUTH_GOOGLE_CLIENT_SECRET", "secret"),
        ]));
        let google = config.google.expect("google configured");
        assert_eq!(google.base.client_id, "id");
        assert_eq!(
            google.base.redirect_uri,
            "https://secrets.example.com/auth/google/secrets"
        );
    }

    #[test]
    fn test_google_config_from_bare_names() {
        let config = AuthConfig::from_lookup(lookup_from(&[
            ("CLIENT_ID", "legacy-id"),
            ("CLIENT_SECRET", "legacy-secret"),
        ]));
        assert!(config.oauth_enabled());
        assert_eq!(config.google.unwrap().base.client_secret, "legacy-secret");
    }

    #[test]
    fn test_google_requires_both_values() {
        let config = AuthConfig::from_lookup(lookup_from(&[("AUTH_GOOGLE_CLIENT_ID", "id")]));
        assert!(!config.oauth_enabled());
    }

    #[test]
    fn test_session_and_cookie_settings() {
        let config = AuthConfig::from_lookup(lookup_from(&[
            ("AUTH_SESSION_MAX_AGE", "90"),
            ("AUTH_COOKIE_SECURE", "TRUE"),
        ]));
        assert_eq!(config.session_max_age, Duration::from_secs(90 * 60));
        assert!(config.cookie_secure);
    }

    #[test]
    fn test_huge_session_max_age_is_clamped() {
        for value in ["1000000000000", "18446744073709551615"] {
            let config =
                AuthConfig::from_lookup(lookup_from(&[("AUTH_SESSION_MAX_AGE", value)]));
            assert_eq!(config.session_max_age, MAX_SESSION_MAX_AGE);
        }
    }
}
