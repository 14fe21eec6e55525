//! Persisted key-value store port and its backends.
//!
//! The store is an opaque async get/set API holding one JSON document per key.
//! Any backend failure surfaces as [`AppError::StoreUnavailable`].

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

use crate::db::repos::kv as kv_repo;
use crate::db::DbPool;
use crate::error::AppError;

#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`. An absent key is `Ok(None)`.
    async fn get(&self, key: &str) -> Result<Option<Value>, AppError>;

    /// Replace the value stored under `key`.
    async fn set(&self, key: &str, value: Value) -> Result<(), AppError>;
}

// =============================================================================
// SQLite backend
// =============================================================================

/// Durable backend over the `kv_store` table.
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, AppError> {
        let pool = self.pool.clone();
        let key = key.to_string();
        tokio::task::spawn_blocking(move || kv_repo::get_document(&pool, &key))
            .await
            .map_err(|e| AppError::StoreUnavailable(format!("Store task failed: {e}")))?
            .map_err(unavailable)
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), AppError> {
        let pool = self.pool.clone();
        let key = key.to_string();
        tokio::task::spawn_blocking(move || kv_repo::put_document(&pool, &key, &value))
            .await
            .map_err(|e| AppError::StoreUnavailable(format!("Store task failed: {e}")))?
            .map_err(unavailable)
    }
}

/// Connection and SQL failures mean the store is unreachable; a document that
/// does not parse keeps its `Serde` kind.
fn unavailable(e: AppError) -> AppError {
    match e {
        AppError::Database(_) | AppError::Pool(_) | AppError::Io(_) => {
            AppError::StoreUnavailable(e.to_string())
        }
        other => other,
    }
}

// =============================================================================
// In-memory backend
// =============================================================================

/// Process-local backend. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, AppError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), AppError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value);
        Ok(())
    }
}
