// Hushboard server library
// Decision: Router construction lives in the library so integration tests drive the same app as the binary
// Decision: All services are built once and injected through axum state; no globals

pub mod api;
pub mod auth;
pub mod config;
pub mod storage;
pub mod views;

use std::path::Path;
use std::sync::Arc;

use axum::{extract::FromRef, Router};
use hushboard_core::UserStore;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::auth::{AuthConfig, CredentialVerifier, GoogleOAuthService, OAuthProvider, SessionManager};
use crate::storage::StorageBackend;
use crate::views::Views;

pub use config::ServerConfig;

/// App state shared across routes
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub sessions: SessionManager,
    pub verifier: CredentialVerifier,
    /// `None` when Google OAuth is not configured
    pub oauth: Option<Arc<dyn OAuthProvider>>,
    pub views: Views,
    pub config: AuthConfig,
    /// Storage backend name reported by /health
    pub storage: &'static str,
}

impl AppState {
    pub fn new(backend: &StorageBackend, config: AuthConfig) -> anyhow::Result<Self> {
        let users = backend.user_store();
        let sessions = SessionManager::new(
            backend.session_store(),
            config.session_max_age,
            config.cookie_secure,
        );
        let oauth = config
            .google
            .as_ref()
            .map(|google| Arc::new(GoogleOAuthService::new(google)) as Arc<dyn OAuthProvider>);

        Ok(Self {
            verifier: CredentialVerifier::new(users.clone()),
            users,
            sessions,
            oauth,
            views: Views::new()?,
            config,
            storage: backend.name(),
        })
    }

    /// Swap the OAuth provider (used to stub Google in tests)
    pub fn with_oauth_provider(mut self, provider: Arc<dyn OAuthProvider>) -> Self {
        self.oauth = Some(provider);
        self
    }
}

impl FromRef<AppState> for SessionManager {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}

/// Build the full application router
pub fn build_router(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .merge(api::routes())
        .merge(auth::routes())
        .fallback_service(ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
