use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use std::str::FromStr;
use std::time::Duration;

use super::types::{is_lock_message, StorageError};

// ============================================================================
// SqliteStore
// ============================================================================

/// Durable key-value adapter backed by a single SQLite table.
#[derive(Clone)]
pub struct SqliteStore {
    pub(crate) pool: SqlitePool,
}

impl SqliteStore {
    /// Open a database connection and create the key-value table.
    ///
    /// `":memory:"` opens a private in-memory database, used by tests.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InstanceLocked` if another process holds the
    /// database lock, `StorageError::Migration` if the table cannot be created.
    pub async fn open(path: &str) -> Result<Self, StorageError> {
        let in_memory = path == ":memory:";
        let url = format!("sqlite:{}?mode=rwc", path);

        // Pre-create the file as 0600 so there is no window with umask permissions
        #[cfg(unix)]
        if !in_memory {
            use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
            let db_path = std::path::Path::new(path);
            if db_path.exists() {
                let perms = std::fs::Permissions::from_mode(0o600);
                if let Err(e) = std::fs::set_permissions(db_path, perms) {
                    tracing::warn!(path = %path, error = %e, "Failed to set database file permissions");
                }
            } else if db_path.parent().is_some_and(|p| p.exists()) {
                // Creation errors resurface from connect_with below.
                let _ = std::fs::OpenOptions::new()
                    .write(true)
                    .create_new(true)
                    .mode(0o600)
                    .open(db_path);
            }
        }

        let options = SqliteConnectOptions::from_str(&url)
            .map_err(StorageError::from_sqlx)?
            .pragma("busy_timeout", "5000");

        // An in-memory database lives as long as its one connection.
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(4)
        };
        let pool = pool_options
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await
            .map_err(StorageError::from_sqlx)?;

        let store = Self { pool };
        store.migrate().await.map_err(|e| {
            if is_lock_message(&e.to_string()) {
                StorageError::InstanceLocked
            } else {
                StorageError::Migration(e.to_string())
            }
        })?;
        tracing::debug!(path = %path, "Opened key-value store");
        Ok(store)
    }

    /// Create the key-value table. Idempotent.
    async fn migrate(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
