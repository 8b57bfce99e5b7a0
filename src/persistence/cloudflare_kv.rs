//! Workers KV backend using the Cloudflare REST API.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{ClientBuilder, StatusCode};
use thiserror::Error;
use url::Url;

use super::PoolStore;
use super::models::{decode_pool, encode_pool};
use crate::domain::Pool;
use crate::error::GatewayError;

/// Connection settings for a Workers KV namespace.
#[derive(Clone)]
pub struct KvSettings {
    /// REST API root, e.g. `https://api.cloudflare.com/client/v4`.
    pub api_base: Url,
    /// Cloudflare account identifier.
    pub account_id: String,
    /// KV namespace identifier.
    pub namespace_id: String,
    /// API token with KV read/write permission.
    pub api_token: String,
}

impl fmt::Debug for KvSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KvSettings")
            .field("api_base", &self.api_base.as_str())
            .field("account_id", &self.account_id)
            .field("namespace_id", &self.namespace_id)
            .finish_non_exhaustive()
    }
}

/// Errors raised while building a [`CloudflareKvStore`].
#[derive(Error, Debug)]
pub enum StoreSetupError {
    /// The API base URL cannot carry path segments.
    #[error("KV api base cannot be a base URL: {0}")]
    InvalidBase(Url),
    /// The HTTP client could not be built.
    #[error("http client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// [`PoolStore`] backed by one key of a Workers KV namespace.
#[derive(Clone)]
pub struct CloudflareKvStore {
    client: reqwest::Client,
    value_url: Url,
    api_token: String,
}

impl CloudflareKvStore {
    /// Creates a store reading and writing `key` in the configured namespace.
    ///
    /// # Errors
    ///
    /// Returns [`StoreSetupError`] if the value URL cannot be built or the
    /// HTTP client fails to initialise.
    pub fn new(settings: &KvSettings, key: &str, timeout: Duration) -> Result<Self, StoreSetupError> {
        let mut value_url = settings.api_base.clone();
        value_url
            .path_segments_mut()
            .map_err(|()| StoreSetupError::InvalidBase(settings.api_base.clone()))?
            .pop_if_empty()
            .extend([
                "accounts",
                settings.account_id.as_str(),
                "storage",
                "kv",
                "namespaces",
                settings.namespace_id.as_str(),
                "values",
                key,
            ]);

        let client = ClientBuilder::new().timeout(timeout).build()?;

        Ok(Self {
            client,
            value_url,
            api_token: settings.api_token.clone(),
        })
    }

    /// URL of the value holding the pool.
    #[must_use]
    pub fn value_url(&self) -> &Url {
        &self.value_url
    }
}

impl fmt::Debug for CloudflareKvStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudflareKvStore")
            .field("value_url", &self.value_url.as_str())
            .finish_non_exhaustive()
    }
}

fn transport(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::StoreUnavailable("kv request timed out".into())
    } else {
        GatewayError::StoreUnavailable(format!("kv transport error: {e}"))
    }
}

#[async_trait]
impl PoolStore for CloudflareKvStore {
    async fn load(&self) -> Result<Pool, GatewayError> {
        let response = self
            .client
            .get(self.value_url.clone())
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(transport)?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                tracing::debug!("pool key absent, starting empty");
                Ok(Pool::new())
            }
            status if status.is_success() => {
                let blob = response.text().await.map_err(transport)?;
                decode_pool(&blob)
            }
            status => Err(GatewayError::StoreUnavailable(format!(
                "kv read returned {status}"
            ))),
        }
    }

    async fn save(&self, pool: &Pool) -> Result<(), GatewayError> {
        let blob = encode_pool(pool)?;
        let response = self
            .client
            .put(self.value_url.clone())
            .bearer_auth(&self.api_token)
            .body(blob)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::StoreUnavailable(format!(
                "kv write returned {status}"
            )));
        }
        tracing::debug!(entries = pool.len(), "pool saved to kv");
        Ok(())
    }
}
