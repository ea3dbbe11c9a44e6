use std::collections::HashMap;

use alertgate_core::{CredentialStore, StoreError};
use async_trait::async_trait;

use crate::config::ServerConfig;

/// Administrators declared under `[[administrators]]` in the config file.
#[derive(Debug, Default)]
pub struct StaticCredentialStore {
    hashes: HashMap<String, String>,
}

impl StaticCredentialStore {
    pub fn from_config(config: &ServerConfig) -> Self {
        config
            .administrators
            .iter()
            .map(|a| (a.username.clone(), a.password_hash.clone()))
            .collect()
    }
}

impl FromIterator<(String, String)> for StaticCredentialStore {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            hashes: iter.into_iter().collect(),
        }
    }
}

#[async_trait]
impl CredentialStore for StaticCredentialStore {
    async fn password_hash(&self, username: &str) -> Result<Option<String>, StoreError> {
        Ok(self.hashes.get(username).cloned())
    }
}
