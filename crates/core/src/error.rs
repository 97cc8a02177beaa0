// Error types for identity and session operations

use thiserror::Error;

/// Result type alias for identity operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the stores, the credential verifier and the gate
#[derive(Debug, Error)]
pub enum Error {
    /// Unknown username, wrong password, or an account without a password
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Registration with a username that is already taken
    #[error("Username already registered")]
    DuplicateUsername,

    /// A unique key (username or federated id) collided in the store
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// Record does not exist (anymore)
    #[error("Not found")]
    NotFound,

    /// Request has no authenticated session
    #[error("Authentication required")]
    Unauthenticated,

    /// OAuth provider or database connectivity failure
    #[error("Upstream failure: {0}")]
    UpstreamFailure(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl Error {
    /// Create a duplicate key error
    pub fn duplicate_key(key: impl Into<String>) -> Self {
        Error::DuplicateKey(key.into())
    }

    /// Create an upstream failure error
    pub fn upstream(msg: impl Into<String>) -> Self {
        Error::UpstreamFailure(msg.into())
    }

    /// Whether the error is caused by the caller rather than the system
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidCredentials
                | Error::DuplicateUsername
                | Error::DuplicateKey(_)
                | Error::NotFound
                | Error::Unauthenticated
        )
    }
}
