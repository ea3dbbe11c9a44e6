//! Credential stores backing `POST /token`.

mod sqlite;
mod static_store;

use std::sync::Arc;

use alertgate_core::CredentialStore;

pub use sqlite::SqliteCredentialStore;
pub use static_store::StaticCredentialStore;

use crate::config::ServerConfig;

/// Opens the SQLite store when a database path is configured, otherwise
/// serves the administrators listed in the config file.
pub async fn open(config: &ServerConfig) -> anyhow::Result<Arc<dyn CredentialStore>> {
    match &config.database.path {
        Some(path) => {
            let store = SqliteCredentialStore::open(path).await?;
            tracing::info!("Using SQLite credential store at {}", path.display());
            Ok(Arc::new(store))
        }
        None => {
            tracing::info!(
                "Using {} administrator(s) from config file",
                config.administrators.len()
            );
            Ok(Arc::new(StaticCredentialStore::from_config(config)))
        }
    }
}
