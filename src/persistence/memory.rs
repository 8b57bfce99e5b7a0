//! In-process store backend.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::PoolStore;
use super::models::{DEFAULT_POOL_KEY, decode_pool, encode_pool};
use crate::domain::Pool;
use crate::error::GatewayError;

/// Key-value store held in process memory.
///
/// Stores the encoded blob, not the [`Pool`] itself, so loads go through
/// the same decoding path as a remote backend. State is lost on restart.
#[derive(Debug)]
pub struct MemoryStore {
    key: String,
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store that keeps the pool under `key`.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            values: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the raw blob currently stored, if any.
    pub async fn raw(&self) -> Option<String> {
        self.values.read().await.get(&self.key).cloned()
    }

    /// Overwrites the raw blob, bypassing encoding.
    pub async fn put_raw(&self, blob: impl Into<String>) {
        self.values
            .write()
            .await
            .insert(self.key.clone(), blob.into());
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_KEY)
    }
}

#[async_trait]
impl PoolStore for MemoryStore {
    async fn load(&self) -> Result<Pool, GatewayError> {
        match self.values.read().await.get(&self.key) {
            Some(blob) => decode_pool(blob),
            None => Ok(Pool::new()),
        }
    }

    async fn save(&self, pool: &Pool) -> Result<(), GatewayError> {
        let blob = encode_pool(pool)?;
        self.values.write().await.insert(self.key.clone(), blob);
        Ok(())
    }
}
