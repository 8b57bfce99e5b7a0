//! Encoding of the persisted pool blob.

use crate::domain::Pool;
use crate::error::GatewayError;

/// Default key the pool is stored under.
pub const DEFAULT_POOL_KEY: &str = "email_sk_map";

/// Decodes a stored blob into a [`Pool`].
///
/// A blank blob counts as an empty pool. Anything that is not a JSON object
/// of string to string is reported as [`GatewayError::StoreUnavailable`]
/// rather than silently replaced, so a later save cannot wipe it.
///
/// # Errors
///
/// Returns [`GatewayError::StoreUnavailable`] for a malformed blob.
pub fn decode_pool(blob: &str) -> Result<Pool, GatewayError> {
    if blob.trim().is_empty() {
        return Ok(Pool::new());
    }
    serde_json::from_str(blob)
        .map_err(|e| GatewayError::StoreUnavailable(format!("malformed pool blob: {e}")))
}

/// Encodes a [`Pool`] as its JSON object blob.
///
/// # Errors
///
/// Returns [`GatewayError::StoreUnavailable`] if serialization fails.
pub fn encode_pool(pool: &Pool) -> Result<String, GatewayError> {
    serde_json::to_string(pool)
        .map_err(|e| GatewayError::StoreUnavailable(format!("pool encoding failed: {e}")))
}
