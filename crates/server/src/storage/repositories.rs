// Repository layer for PostgreSQL
// Decision: Unique indexes enforce username / federated_id uniqueness; violations map to DuplicateKey
// Decision: Ids are generated in Rust (UUID v7) so both backends behave the same

use anyhow::{Context, Result};
use async_trait::async_trait;
use hushboard_core::{
    Error as CoreError, NewUser, Result as CoreResult, SessionRecord, SessionStore, User,
    UserStore,
};
use sqlx::PgPool;
use uuid::Uuid;

use super::models::{AuthSessionRow, UserRow};

const USER_COLUMNS: &str =
    "id, username, password_hash, federated_id, secret, created_at, updated_at";

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create database connection from URL and apply migrations
    pub async fn from_url(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url)
            .await
            .context("Failed to connect to database")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;

        Ok(Self { pool })
    }

    async fn fetch_user_where(&self, column: &str, value: &str) -> CoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(User::from))
    }
}

/// Translate sqlx errors into the identity error taxonomy
fn map_sqlx_error(e: sqlx::Error) -> CoreError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            let key = match db_err.constraint() {
                Some(c) if c.contains("federated_id") => "federated_id",
                _ => "username",
            };
            return CoreError::duplicate_key(key);
        }
    }

    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            CoreError::upstream(format!("database unavailable: {}", e))
        }
        other => CoreError::Internal(anyhow::Error::new(other).context("Database query failed")),
    }
}

// ============================================
// Users
// ============================================

#[async_trait]
impl UserStore for Database {
    async fn find_by_username(&self, username: &str) -> CoreResult<Option<User>> {
        self.fetch_user_where("username", username).await
    }

    async fn find_by_federated_id(&self, federated_id: &str) -> CoreResult<Option<User>> {
        self.fetch_user_where("federated_id", federated_id).await
    }

    async fn find_by_id(&self, id: Uuid) -> CoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(User::from))
    }

    async fn create(&self, input: NewUser) -> CoreResult<User> {
        if !input.has_credential() {
            return Err(CoreError::Internal(anyhow::anyhow!(
                "user needs a password or a federated id"
            )));
        }

        let user = User::from_new(input);
        let sql = format!(
            r#"
            INSERT INTO users (id, username, password_hash, federated_id, secret, created_at, updated_at)
            VALUES ($1, $2, $3, $4, NULL, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(user.id)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(&user.federated_id)
            .bind(user.created_at)
            .bind(user.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn save(&self, user: &User) -> CoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET username = $2,
                password_hash = $3,
                federated_id = $4,
                secret = $5,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.federated_id)
        .bind(&user.secret)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound);
        }
        Ok(())
    }

    async fn list_with_secrets(&self) -> CoreResult<Vec<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE secret IS NOT NULL ORDER BY updated_at DESC"
        );
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(User::from).collect())
    }
}

// ============================================
// Auth sessions
// ============================================

#[async_trait]
impl SessionStore for Database {
    async fn insert(&self, record: SessionRecord) -> CoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO auth_sessions (token_hash, user_id, username, expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&record.token_hash)
        .bind(record.principal.user_id)
        .bind(&record.principal.username)
        .bind(record.expires_at)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn get(&self, token_hash: &str) -> CoreResult<Option<SessionRecord>> {
        let row = sqlx::query_as::<_, AuthSessionRow>(
            r#"
            SELECT token_hash, user_id, username, expires_at, created_at
            FROM auth_sessions
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(SessionRecord::from))
    }

    async fn remove(&self, token_hash: &str) -> CoreResult<bool> {
        let result = sqlx::query("DELETE FROM auth_sessions WHERE token_hash = $1")
            .bind(token_hash)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}
