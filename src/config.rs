//! Gateway configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). Numeric settings fall back to their
//! defaults when unset or unparseable; structural settings (addresses,
//! URLs, backend choice) fail startup instead.

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use url::Url;

use crate::persistence::cloudflare_kv::KvSettings;
use crate::persistence::models::DEFAULT_POOL_KEY;

/// Default Workers KV REST root.
pub const DEFAULT_KV_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Which key-value backend holds the pool.
#[derive(Debug, Clone)]
pub enum StoreBackend {
    /// Process memory; contents vanish on restart.
    Memory,
    /// Cloudflare Workers KV namespace.
    CloudflareKv(KvSettings),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per event.
    Json,
}

/// Top-level gateway configuration.
///
/// Loaded once at startup via [`GatewayConfig::from_env`].
#[derive(Clone)]
pub struct GatewayConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:3000`).
    pub listen_addr: SocketAddr,

    /// Admin secret. `None` disables every admin endpoint.
    pub admin_password: Option<String>,

    /// Base URL of the credential issuer.
    pub issuer_base_url: Url,

    /// Timeout in seconds for one issuer call.
    pub issuer_timeout_secs: u64,

    /// Pool storage backend.
    pub store: StoreBackend,

    /// Key the pool blob is stored under.
    pub pool_key: String,

    /// Timeout in seconds for one store call.
    pub store_timeout_secs: u64,

    /// Timeout in seconds for a whole HTTP request.
    pub request_timeout_secs: u64,

    /// Log output format.
    pub log_format: LogFormat,

    /// Optional error-tracking endpoint. Opaque to the gateway.
    pub error_tracking_dsn: Option<String>,
}

impl GatewayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// See [`GatewayConfig::from_lookup`].
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key → value lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if `BASE_URL` is missing or not a URL, if
    /// `LISTEN_ADDR` or `KV_API_BASE` does not parse, if `STORE_BACKEND` is
    /// unknown, or if `cloudflare_kv` is selected without its credentials.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let listen_addr: SocketAddr = get("LISTEN_ADDR")
            .unwrap_or_else(|| "0.0.0.0:3000".to_string())
            .parse()?;

        let issuer_base_url: Url = get("BASE_URL")
            .ok_or("BASE_URL must be set to the credential issuer's base URL")?
            .parse()?;

        let store = match get("STORE_BACKEND").as_deref().unwrap_or("memory") {
            "memory" => StoreBackend::Memory,
            "cloudflare_kv" => {
                let require = |key: &str| {
                    get(key).ok_or_else(|| format!("{key} is required for STORE_BACKEND=cloudflare_kv"))
                };
                StoreBackend::CloudflareKv(KvSettings {
                    api_base: get("KV_API_BASE")
                        .unwrap_or_else(|| DEFAULT_KV_API_BASE.to_string())
                        .parse()?,
                    account_id: require("KV_ACCOUNT_ID")?,
                    namespace_id: require("KV_NAMESPACE_ID")?,
                    api_token: require("KV_API_TOKEN")?,
                })
            }
            other => return Err(format!("unknown STORE_BACKEND: {other}").into()),
        };

        let log_format = match get("LOG_FORMAT").as_deref() {
            Some("json") | Some("JSON") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Self {
            listen_addr,
            admin_password: get("ADMIN_PASSWORD"),
            issuer_base_url,
            issuer_timeout_secs: parse_or(get("ISSUER_TIMEOUT_SECS"), 10),
            store,
            pool_key: get("POOL_KEY").unwrap_or_else(|| DEFAULT_POOL_KEY.to_string()),
            store_timeout_secs: parse_or(get("STORE_TIMEOUT_SECS"), 5),
            request_timeout_secs: parse_or(get("REQUEST_TIMEOUT_SECS"), 30),
            log_format,
            error_tracking_dsn: get("ERROR_TRACKING_DSN"),
        })
    }

    /// Bound on one issuer call.
    #[must_use]
    pub const fn issuer_timeout(&self) -> Duration {
        Duration::from_secs(self.issuer_timeout_secs)
    }

    /// Bound on one store call.
    #[must_use]
    pub const fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_secs)
    }

    /// Bound on one HTTP request.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("listen_addr", &self.listen_addr)
            .field("admin_enabled", &self.admin_password.is_some())
            .field("issuer_base_url", &self.issuer_base_url.as_str())
            .field("issuer_timeout_secs", &self.issuer_timeout_secs)
            .field("store", &self.store)
            .field("pool_key", &self.pool_key)
            .field("store_timeout_secs", &self.store_timeout_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("log_format", &self.log_format)
            .field("error_tracking", &self.error_tracking_dsn.is_some())
            .finish()
    }
}

/// Parses a positive integer, returning `default` on missing, invalid, or
/// zero values.
fn parse_or(value: Option<String>, default: u64) -> u64 {
    value
        .and_then(|v| v.parse().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<GatewayConfig, Box<dyn std::error::Error>> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        GatewayConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_with_only_base_url() {
        let Ok(config) = load(&[("BASE_URL", "https://issuer.example")]) else {
            panic!("config should load");
        };
        assert_eq!(config.listen_addr.port(), 3000);
        assert!(matches!(config.store, StoreBackend::Memory));
        assert_eq!(config.pool_key, "email_sk_map");
        assert_eq!(config.issuer_timeout(), Duration::from_secs(10));
        assert_eq!(config.store_timeout(), Duration::from_secs(5));
        assert_eq!(config.log_format, LogFormat::Text);
        assert!(config.admin_password.is_none());
    }

    #[test]
    fn base_url_is_required() {
        assert!(load(&[]).is_err());
        assert!(load(&[("BASE_URL", "not a url")]).is_err());
    }

    #[test]
    fn invalid_numbers_fall_back() {
        let Ok(config) = load(&[
            ("BASE_URL", "https://issuer.example"),
            ("STORE_TIMEOUT_SECS", "soon"),
            ("ISSUER_TIMEOUT_SECS", "0"),
            ("REQUEST_TIMEOUT_SECS", "12"),
        ]) else {
            panic!("config should load");
        };
        assert_eq!(config.store_timeout_secs, 5);
        assert_eq!(config.issuer_timeout_secs, 10);
        assert_eq!(config.request_timeout_secs, 12);
    }

    #[test]
    fn kv_backend_needs_credentials() {
        let partial = load(&[
            ("BASE_URL", "https://issuer.example"),
            ("STORE_BACKEND", "cloudflare_kv"),
            ("KV_ACCOUNT_ID", "acc"),
        ]);
        assert!(partial.is_err());

        let Ok(config) = load(&[
            ("BASE_URL", "https://issuer.example"),
            ("STORE_BACKEND", "cloudflare_kv"),
            ("KV_ACCOUNT_ID", "acc"),
            ("KV_NAMESPACE_ID", "ns"),
            ("KV_API_TOKEN", "token"),
        ]) else {
            panic!("config should load");
        };
        let StoreBackend::CloudflareKv(kv) = &config.store else {
            panic!("expected kv backend");
        };
        assert_eq!(kv.api_base.as_str(), "https://api.cloudflare.com/client/v4");
        assert!(!format!("{config:?}").contains("token\""));
    }

    #[test]
    fn unknown_backend_fails() {
        assert!(load(&[("BASE_URL", "https://issuer.example"), ("STORE_BACKEND", "redis")]).is_err());
    }

    #[test]
    fn secrets_are_not_debug_printed() {
        let Ok(config) = load(&[
            ("BASE_URL", "https://issuer.example"),
            ("ADMIN_PASSWORD", "hunter2"),
        ]) else {
            panic!("config should load");
        };
        assert_eq!(config.admin_password.as_deref(), Some("hunter2"));
        assert!(!format!("{config:?}").contains("hunter2"));
    }
}
