use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

use super::kv::KeyValueStore;
use super::types::StorageError;

/// Volatile key-value adapter.
///
/// Backs tests and ephemeral sessions. Reads and writes can be switched to
/// fail so callers can observe how the store behaves when its mirror rejects
/// operations. Every successful `set`/`remove` is appended to a write log.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    write_log: Mutex<Vec<String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with raw values, as if written by an earlier session.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: Mutex::new(entries),
            ..Self::default()
        }
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Current raw value under `key`, bypassing failure injection.
    pub async fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().await.get(key).cloned()
    }

    /// Keys of successful writes and removals, oldest first.
    pub async fn write_log(&self) -> Vec<String> {
        self.write_log.lock().await.clone()
    }

    fn check_writes(&self) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("writes disabled".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("reads disabled".to_string()));
        }
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_writes()?;
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        self.write_log.lock().await.push(key.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check_writes()?;
        self.entries.lock().await.remove(key);
        self.write_log.lock().await.push(key.to_string());
        Ok(())
    }
}
