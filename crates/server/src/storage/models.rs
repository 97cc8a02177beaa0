// Database models (internal, may differ from domain types)

use chrono::{DateTime, Utc};
use hushboard_core::{Principal, SessionRecord, User};
use sqlx::FromRow;
use uuid::Uuid;

// ============================================
// Users
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub federated_id: Option<String>,
    pub secret: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
            federated_id: row.federated_id,
            secret: row.secret,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// ============================================
// Auth sessions
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct AuthSessionRow {
    pub token_hash: String,
    pub user_id: Uuid,
    pub username: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<AuthSessionRow> for SessionRecord {
    fn from(row: AuthSessionRow) -> Self {
        SessionRecord {
            token_hash: row.token_hash,
            principal: Principal {
                user_id: row.user_id,
                username: row.username,
            },
            expires_at: row.expires_at,
            created_at: row.created_at,
        }
    }
}
