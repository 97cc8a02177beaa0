// In-memory implementations for dev mode and testing
// Decision: Use parking_lot for thread-safe access (locks are never held across .await)
//
// These implementations keep all data in memory, making them suitable for:
// - Running the server without a database
// - Unit and integration tests

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::traits::{SessionStore, UserStore};
use crate::user::{NewUser, SessionRecord, User};

// ============================================================================
// InMemoryUserStore - Stores users in memory
// ============================================================================

/// In-memory user store
///
/// Stores users in a HashMap keyed by user ID. Uniqueness checks and the
/// insert happen under one write lock, so concurrent creates with the same
/// key cannot both succeed.
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserStore {
    /// Create a new in-memory user store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users
    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.read().is_empty()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .read()
            .values()
            .find(|u| u.username.as_deref() == Some(username))
            .cloned())
    }

    async fn find_by_federated_id(&self, federated_id: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .read()
            .values()
            .find(|u| u.federated_id.as_deref() == Some(federated_id))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.users.read().get(&id).cloned())
    }

    async fn create(&self, input: NewUser) -> Result<User> {
        if !input.has_credential() {
            return Err(Error::Internal(anyhow::anyhow!(
                "user needs a password or a federated id"
            )));
        }

        let mut users = self.users.write();

        if let Some(username) = input.username.as_deref() {
            if users
                .values()
                .any(|u| u.username.as_deref() == Some(username))
            {
                return Err(Error::duplicate_key("username"));
            }
        }
        if let Some(federated_id) = input.federated_id.as_deref() {
            if users
                .values()
                .any(|u| u.federated_id.as_deref() == Some(federated_id))
            {
                return Err(Error::duplicate_key("federated_id"));
            }
        }

        let user = User::from_new(input);
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn save(&self, user: &User) -> Result<()> {
        let mut users = self.users.write();
        let stored = users.get_mut(&user.id).ok_or(Error::NotFound)?;
        *stored = User {
            updated_at: Utc::now(),
            ..user.clone()
        };
        Ok(())
    }

    async fn list_with_secrets(&self) -> Result<Vec<User>> {
        let mut result: Vec<User> = self
            .users
            .read()
            .values()
            .filter(|u| u.secret.is_some())
            .cloned()
            .collect();
        result.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(result)
    }
}

// ============================================================================
// InMemorySessionStore - Stores sessions in memory
// ============================================================================

/// In-memory session store
///
/// Stores session records in a HashMap keyed by token digest.
#[derive(Debug, Default, Clone)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, SessionRecord>>>,
}

impl InMemorySessionStore {
    /// Create a new in-memory session store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live records (expired ones included until looked up)
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn insert(&self, record: SessionRecord) -> Result<()> {
        self.sessions
            .write()
            .insert(record.token_hash.clone(), record);
        Ok(())
    }

    async fn get(&self, token_hash: &str) -> Result<Option<SessionRecord>> {
        Ok(self.sessions.read().get(token_hash).cloned())
    }

    async fn remove(&self, token_hash: &str) -> Result<bool> {
        Ok(self.sessions.write().remove(token_hash).is_some())
    }
}
