// Core traits for pluggable backends
//
// These traits allow the identity model to be used with different backends:
// - In-memory implementations for dev mode and testing
// - Database implementations for production

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::user::{NewUser, SessionRecord, User};

// ============================================================================
// UserStore - Persisted user identities
// ============================================================================

/// Trait for storing and retrieving users
///
/// Implementations must enforce uniqueness of `username` and `federated_id`
/// themselves: two concurrent `create` calls with the same key must end with
/// exactly one success and one `Error::DuplicateKey`.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find a user by local username
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Find a user by the id asserted by the external identity provider
    async fn find_by_federated_id(&self, federated_id: &str) -> Result<Option<User>>;

    /// Find a user by id
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;

    /// Create a user; fails with `DuplicateKey` on a username or federated id collision
    async fn create(&self, input: NewUser) -> Result<User>;

    /// Persist mutations of an existing user; fails with `NotFound` if it is gone
    async fn save(&self, user: &User) -> Result<()>;

    /// Users that have posted a secret, most recently updated first
    async fn list_with_secrets(&self) -> Result<Vec<User>>;
}

// ============================================================================
// SessionStore - Server-held session state
// ============================================================================

/// Trait for storing session records keyed by token digest
///
/// Stores never see raw tokens, only their digests.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Store a new session record
    async fn insert(&self, record: SessionRecord) -> Result<()>;

    /// Load a session record by token digest (expired records included)
    async fn get(&self, token_hash: &str) -> Result<Option<SessionRecord>>;

    /// Remove a session record; returns whether it existed
    async fn remove(&self, token_hash: &str) -> Result<bool>;
}
