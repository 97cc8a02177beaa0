// Authentication module
// Decision: Local username/password and Google OAuth both end in the same server-held session

pub mod config;
pub mod middleware;
pub mod oauth;
pub mod routes;
pub mod session;
pub mod verifier;

pub use config::AuthConfig;
pub use middleware::CurrentSession;
pub use oauth::{GoogleOAuthService, OAuthProvider, OAuthUserInfo};
pub use routes::routes;
pub use session::SessionManager;
pub use verifier::CredentialVerifier;
