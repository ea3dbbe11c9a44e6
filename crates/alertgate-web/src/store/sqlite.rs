//! SQLite-backed administrator store.
//!
//! Queries run on the `tokio-rusqlite` connection thread, so the async
//! scheduler is never blocked on disk I/O.

use std::path::Path;

use alertgate_core::{CredentialStore, StoreError};
use async_trait::async_trait;
use rusqlite::OptionalExtension;
use tokio_rusqlite::Connection;

const CREATE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS administrator (
    username TEXT PRIMARY KEY NOT NULL,
    password TEXT NOT NULL
);
"#;

pub struct SqliteCredentialStore {
    conn: Connection,
}

impl SqliteCredentialStore {
    /// Opens (or creates) the database at `path` and ensures the schema exists.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).await.map_err(unavailable)?;
        Self::init(conn).await
    }

    /// In-memory database, for tests.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().await.map_err(unavailable)?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.call(|conn| {
            conn.execute_batch(CREATE_SCHEMA)?;
            Ok(())
        })
        .await
        .map_err(unavailable)?;

        Ok(Self { conn })
    }

    /// Adds or replaces an administrator.
    pub async fn upsert_admin(&self, username: &str, password_hash: &str) -> Result<(), StoreError> {
        let username = username.to_string();
        let password_hash = password_hash.to_string();

        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT OR REPLACE INTO administrator (username, password) VALUES (?1, ?2)",
                    rusqlite::params![username, password_hash],
                )?;
                Ok(())
            })
            .await
            .map_err(unavailable)
    }
}

#[async_trait]
impl CredentialStore for SqliteCredentialStore {
    async fn password_hash(&self, username: &str) -> Result<Option<String>, StoreError> {
        let username = username.to_string();

        self.conn
            .call(move |conn| {
                let hash = conn
                    .query_row(
                        "SELECT password FROM administrator WHERE username = ?1",
                        [&username],
                        |row| row.get::<_, String>(0),
                    )
                    .optional()?;
                Ok(hash)
            })
            .await
            .map_err(unavailable)
    }
}

fn unavailable(e: tokio_rusqlite::Error) -> StoreError {
    StoreError::Unavailable(e.to_string())
}
