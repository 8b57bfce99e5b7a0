//! Persistence layer: the single-blob store adapter.
//!
//! Provides the [`PoolStore`] trait for loading and saving the whole pool
//! under one well-known key. Backends offer no compare-and-swap, so the
//! repository above them is last-write-wins.
//!
//! - [`MemoryStore`]: process-local map, for development and tests.
//! - [`CloudflareKvStore`]: Workers KV REST API over `reqwest`.

pub mod cloudflare_kv;
pub mod memory;
pub mod models;

use async_trait::async_trait;

pub use cloudflare_kv::CloudflareKvStore;
pub use memory::MemoryStore;

use crate::domain::Pool;
use crate::error::GatewayError;

/// Eventually-consistent get/put of the pool blob.
#[async_trait]
pub trait PoolStore: Send + Sync + std::fmt::Debug {
    /// Reads the current pool. An absent key yields an empty pool.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::StoreUnavailable`] on transport failure or a
    /// blob that does not decode.
    async fn load(&self) -> Result<Pool, GatewayError>;

    /// Replaces the stored pool with `pool`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::StoreUnavailable`] on transport failure.
    async fn save(&self, pool: &Pool) -> Result<(), GatewayError>;
}
