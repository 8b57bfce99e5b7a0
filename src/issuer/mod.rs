//! Credential issuer: turns a session key into a one-time login URL.
//!
//! The gateway never retries issuance and never edits the pool based on the
//! outcome: an expired key and a flaky issuer look too alike to act on.

pub mod http;

use async_trait::async_trait;
use url::Url;

pub use http::HttpIssuer;

use crate::error::GatewayError;

/// Remote service that exchanges an SK for a login URL.
#[async_trait]
pub trait CredentialIssuer: Send + Sync + std::fmt::Debug {
    /// Obtains a one-time login URL for `sk` from the issuer at `base_url`.
    ///
    /// `unique_name` is passed through untouched when present.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::IssuerUnavailable`] on transport failure or
    /// timeout and [`GatewayError::IssuerRejected`] when the issuer refuses
    /// the key.
    async fn issue_login_url(
        &self,
        sk: &str,
        base_url: &Url,
        unique_name: Option<&str>,
    ) -> Result<String, GatewayError>;
}
