//! # Key-Value Substrate
//!
//! The persistence contract the offline queue is built on: a durable
//! string-keyed text store with `get`, `set` and `remove`. A `set` replaces
//! the whole value atomically, so readers see either the old or the new
//! value, never a partial one.
//!
//! `update` is the read-modify-write primitive. Several handles may share
//! one database file (one per process), so a load followed by a separate
//! `set` could overwrite a value another handle wrote in between. `update`
//! runs the whole step under the substrate's write lock instead.

use async_trait::async_trait;
use sqlx::{Row, SqliteExecutor};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::client::error::StorageError;
use crate::client::local_db::LocalDatabase;

/// What an `update` closure wants done with the value it was shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KvUpdate {
    /// Leave the stored value as it is
    Keep,
    /// Replace the value
    Set(String),
    /// Delete the key
    Remove,
}

/// Closure run by `KeyValueStore::update` against the current value
pub type Updater<'a> = Box<dyn FnOnce(Option<String>) -> KvUpdate + Send + 'a>;

/// Durable string-keyed text store
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Atomically replace the value stored under `key`
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`; deleting a missing key is not an error
    async fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Read `key`, pass the value to `updater` and apply its answer
    ///
    /// No write to the same storage, from this handle or any other, lands
    /// between the read and the write.
    async fn update(&self, key: &str, updater: Updater<'_>) -> Result<(), StorageError>;
}

async fn upsert<'e>(executor: impl SqliteExecutor<'e>, key: &str, value: &str) -> Result<(), StorageError> {
    sqlx::query(
        "INSERT INTO kv_store (key, value, updated_at) VALUES (?, ?, ?)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
    )
    .bind(key)
    .bind(value)
    .bind(chrono::Utc::now().to_rfc3339())
    .execute(executor)
    .await?;
    Ok(())
}

async fn delete<'e>(executor: impl SqliteExecutor<'e>, key: &str) -> Result<(), StorageError> {
    sqlx::query("DELETE FROM kv_store WHERE key = ?")
        .bind(key)
        .execute(executor)
        .await?;
    Ok(())
}

#[async_trait]
impl KeyValueStore for LocalDatabase {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let row = sqlx::query("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(self.pool())
            .await?;

        match row {
            Some(row) => Ok(Some(row.try_get("value")?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        upsert(self.pool(), key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        delete(self.pool(), key).await
    }

    async fn update(&self, key: &str, updater: Updater<'_>) -> Result<(), StorageError> {
        // IMMEDIATE takes the write lock before the read; other connections
        // wait on the busy timeout instead of racing us
        let mut tx = self.pool().begin_with("BEGIN IMMEDIATE").await?;

        let current: Option<String> = sqlx::query_scalar("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&mut *tx)
            .await?;

        match updater(current) {
            KvUpdate::Keep => {}
            KvUpdate::Set(value) => upsert(&mut *tx, key, &value).await?,
            KvUpdate::Remove => delete(&mut *tx, key).await?,
        }

        tx.commit().await?;
        Ok(())
    }
}

/// In-process store, lost when dropped
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn update(&self, key: &str, updater: Updater<'_>) -> Result<(), StorageError> {
        let mut entries = self.entries.write().await;
        match updater(entries.get(key).cloned()) {
            KvUpdate::Keep => {}
            KvUpdate::Set(value) => {
                entries.insert(key.to_string(), value);
            }
            KvUpdate::Remove => {
                entries.remove(key);
            }
        }
        Ok(())
    }
}
