//! Lookup of stored administrator password hashes.

use async_trait::async_trait;

use crate::error::StoreError;

/// Read-only view of the administrator credential store.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// The stored password hash for `username`, or `None` if there is no such user.
    async fn password_hash(&self, username: &str) -> Result<Option<String>, StoreError>;
}
