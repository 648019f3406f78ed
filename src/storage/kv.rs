use async_trait::async_trait;
use std::sync::Arc;

use super::schema::SqliteStore;
use super::types::StorageError;

// ============================================================================
// Port
// ============================================================================

/// Asynchronous string-keyed store the news store mirrors its state into.
///
/// Values are opaque strings; the store writes whole-collection JSON
/// snapshots, never deltas. Implementations must be safe to share across
/// tasks because the background writer holds its own handle.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value under `key`, `None` if it was never written or removed.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value under `key`.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Removing an absent key succeeds.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

#[async_trait]
impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key).await
    }
}

// ============================================================================
// SQLite Adapter
// ============================================================================

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from_sqlx)?;

        Ok(row.map(|(value,)| value))
    }

    /// UPSERT: inserts the key or replaces its value and timestamp.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?, ?, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
        "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(StorageError::from_sqlx)?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM kv_store WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from_sqlx)?;

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
