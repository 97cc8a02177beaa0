// User and principal domain types
//
// These types represent the persisted User entity, the input used to create
// one, and the Principal a session resolves to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a user proves who they are
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityKind {
    /// Username + password held by us
    Local,
    /// Identity asserted by an external OAuth provider
    Federated,
}

impl std::fmt::Display for IdentityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdentityKind::Local => write!(f, "local"),
            IdentityKind::Federated => write!(f, "federated"),
        }
    }
}

/// User - the only persisted entity
///
/// A persisted user always has a password hash, a federated id, or both.
/// Local and federated identities are never linked automatically.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub federated_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a user from creation input with a fresh time-ordered id
    pub fn from_new(input: NewUser) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            username: input.username,
            password_hash: input.password_hash,
            federated_id: input.federated_id,
            secret: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Identity kind this record was created with
    pub fn kind(&self) -> IdentityKind {
        if self.password_hash.is_some() {
            IdentityKind::Local
        } else {
            IdentityKind::Federated
        }
    }

    /// Principal reference stored in a session
    pub fn principal(&self) -> Principal {
        Principal {
            user_id: self.id,
            username: self.username.clone(),
        }
    }
}

/// Input for creating a user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewUser {
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub federated_id: Option<String>,
}

impl NewUser {
    /// Local account: username + derived credential
    pub fn local(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            password_hash: Some(password_hash.into()),
            federated_id: None,
        }
    }

    /// Federated account: provider id only, no username, no password
    pub fn federated(federated_id: impl Into<String>) -> Self {
        Self {
            username: None,
            password_hash: None,
            federated_id: Some(federated_id.into()),
        }
    }

    /// A user needs at least one way to sign in before it can be persisted
    pub fn has_credential(&self) -> bool {
        self.password_hash.is_some() || self.federated_id.is_some()
    }
}

/// Principal - the identity an authenticated session resolves to
///
/// References the user by id only; the user record may change or disappear
/// while the session lives.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Server-side session state, keyed by the digest of the client's token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub token_hash: String,
    pub principal: Principal,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}
