// Credential verifier: local password login, local registration, federated upsert
// Decision: Local and federated identities are never linked; different lookup keys mean different users
// Decision: Every local failure surfaces as InvalidCredentials so login never reveals which usernames exist

use hushboard_core::{Error, NewUser, Result, User, UserStore};
use std::sync::Arc;

use crate::storage::password::{hash_password_blocking, verify_password_blocking};

#[derive(Clone)]
pub struct CredentialVerifier {
    users: Arc<dyn UserStore>,
}

impl CredentialVerifier {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Local strategy: username + plaintext password
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User> {
        // Same normalization as `register`
        let username = username.trim();
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(Error::InvalidCredentials)?;

        // Federated-only accounts have no password to check against
        let password_hash = user
            .password_hash
            .clone()
            .ok_or(Error::InvalidCredentials)?;

        let valid = verify_password_blocking(password.to_string(), password_hash).await?;
        if !valid {
            tracing::debug!(user_id = %user.id, "Password mismatch");
            return Err(Error::InvalidCredentials);
        }

        Ok(user)
    }

    /// Local registration: fails with DuplicateUsername if the name is taken
    pub async fn register(&self, username: &str, password: &str) -> Result<User> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(Error::InvalidCredentials);
        }

        if self.users.find_by_username(username).await?.is_some() {
            return Err(Error::DuplicateUsername);
        }

        let password_hash = hash_password_blocking(password.to_string()).await?;

        // The store's uniqueness check decides between concurrent registrations
        match self
            .users
            .create(NewUser::local(username, password_hash))
            .await
        {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "Registered local user");
                Ok(user)
            }
            Err(Error::DuplicateKey(_)) => Err(Error::DuplicateUsername),
            Err(e) => Err(e),
        }
    }

    /// Federated strategy: upsert by external id, never mutating an existing user
    pub async fn resolve_federated(&self, external_id: &str) -> Result<User> {
        if let Some(user) = self.users.find_by_federated_id(external_id).await? {
            return Ok(user);
        }

        match self.users.create(NewUser::federated(external_id)).await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "Created federated user");
                Ok(user)
            }
            // Lost a race with a concurrent first login; the winner's record is the user
            Err(Error::DuplicateKey(_)) => self
                .users
                .find_by_federated_id(external_id)
                .await?
                .ok_or(Error::NotFound),
            Err(e) => Err(e),
        }
    }
}
