use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

/// Error for credential storage operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("No credential stored for user: {0}")]
    NotFound(String),

    #[error("Credential already stored for user: {0}")]
    AlreadyExists(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Port for persisting encoded credentials per user identity.
///
/// Implementations store the encoded string verbatim and never interpret it.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Retrieve the encoded credential for `username`.
    ///
    /// # Errors
    /// * `NotFound` - No credential stored for this user
    /// * `Backend` - Storage operation failed
    async fn get(&self, username: &str) -> Result<String, StoreError>;

    /// Store a credential for a user that has none yet.
    ///
    /// # Errors
    /// * `AlreadyExists` - A credential is already stored for this user
    /// * `Backend` - Storage operation failed
    async fn insert(&self, username: &str, encoded: String) -> Result<(), StoreError>;

    /// Overwrite the credential of an existing user.
    ///
    /// # Errors
    /// * `NotFound` - No credential stored for this user
    /// * `Backend` - Storage operation failed
    async fn replace(&self, username: &str, encoded: String) -> Result<(), StoreError>;
}

/// Process-local store, for tests and single-instance deployments.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn get(&self, username: &str) -> Result<String, StoreError> {
        self.entries
            .read()
            .await
            .get(username)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(username.to_string()))
    }

    async fn insert(&self, username: &str, encoded: String) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        if entries.contains_key(username) {
            return Err(StoreError::AlreadyExists(username.to_string()));
        }
        entries.insert(username.to_string(), encoded);
        Ok(())
    }

    async fn replace(&self, username: &str, encoded: String) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        match entries.get_mut(username) {
            Some(existing) => {
                *existing = encoded;
                Ok(())
            }
            None => Err(StoreError::NotFound(username.to_string())),
        }
    }
}
