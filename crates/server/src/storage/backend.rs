// Storage backend selection
// Decision: Use enum dispatch at construction time; handlers only see the core traits
//
// The backend is either PostgreSQL (production) or in-memory (dev mode).
// Both hand out the same `UserStore` / `SessionStore` trait objects.

use anyhow::Result;
use hushboard_core::{InMemorySessionStore, InMemoryUserStore, SessionStore, UserStore};
use std::sync::Arc;

use super::repositories::Database;

/// Storage backend that can be either PostgreSQL or in-memory
#[derive(Clone)]
pub enum StorageBackend {
    /// PostgreSQL database (production)
    Postgres(Database),
    /// In-memory stores (dev mode, tests)
    InMemory {
        users: InMemoryUserStore,
        sessions: InMemorySessionStore,
    },
}

impl StorageBackend {
    /// Create a PostgreSQL storage backend from a database URL
    pub async fn postgres(database_url: &str) -> Result<Self> {
        let db = Database::from_url(database_url).await?;
        Ok(Self::Postgres(db))
    }

    /// Create an in-memory storage backend
    pub fn in_memory() -> Self {
        Self::InMemory {
            users: InMemoryUserStore::new(),
            sessions: InMemorySessionStore::new(),
        }
    }

    /// PostgreSQL when a URL is given, in-memory otherwise
    pub async fn from_database_url(database_url: Option<&str>) -> Result<Self> {
        match database_url {
            Some(url) => Self::postgres(url).await,
            None => Ok(Self::in_memory()),
        }
    }

    /// Check if this is dev mode (in-memory)
    pub fn is_dev_mode(&self) -> bool {
        matches!(self, Self::InMemory { .. })
    }

    /// Short name for logs and the health endpoint
    pub fn name(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::InMemory { .. } => "memory",
        }
    }

    pub fn user_store(&self) -> Arc<dyn UserStore> {
        match self {
            Self::Postgres(db) => Arc::new(db.clone()),
            Self::InMemory { users, .. } => Arc::new(users.clone()),
        }
    }

    pub fn session_store(&self) -> Arc<dyn SessionStore> {
        match self {
            Self::Postgres(db) => Arc::new(db.clone()),
            Self::InMemory { sessions, .. } => Arc::new(sessions.clone()),
        }
    }
}
