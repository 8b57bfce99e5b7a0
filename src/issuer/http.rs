//! HTTP client for the issuer's OAuth-token endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{ClientBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use super::CredentialIssuer;
use crate::error::GatewayError;

/// Path segments of the token endpoint, relative to the base URL.
const TOKEN_ENDPOINT: [&str; 3] = ["manage-api", "auth", "oauth_token"];

#[derive(Serialize)]
struct TokenRequest<'a> {
    session_key: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    unique_name: Option<&'a str>,
}

#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default)]
    login_url: Option<String>,
}

/// [`CredentialIssuer`] speaking JSON over HTTP.
#[derive(Debug, Clone)]
pub struct HttpIssuer {
    client: reqwest::Client,
}

impl HttpIssuer {
    /// Creates a client whose requests are bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`reqwest::Error`] if the client cannot be
    /// built.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = ClientBuilder::new().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// URL of the token endpoint under `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::IssuerUnavailable`] if `base_url` cannot
    /// carry a path.
    pub fn endpoint(base_url: &Url) -> Result<Url, GatewayError> {
        let mut url = base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                GatewayError::IssuerUnavailable(format!("unusable issuer base url: {base_url}"))
            })?
            .pop_if_empty()
            .extend(TOKEN_ENDPOINT);
        Ok(url)
    }
}

fn transport(e: &reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::IssuerUnavailable("issuer request timed out".into())
    } else {
        GatewayError::IssuerUnavailable(format!("issuer transport error: {e}"))
    }
}

#[async_trait]
impl CredentialIssuer for HttpIssuer {
    async fn issue_login_url(
        &self,
        sk: &str,
        base_url: &Url,
        unique_name: Option<&str>,
    ) -> Result<String, GatewayError> {
        let endpoint = Self::endpoint(base_url)?;
        let response = self
            .client
            .post(endpoint)
            .json(&TokenRequest {
                session_key: sk,
                unique_name,
            })
            .send()
            .await
            .map_err(|e| transport(&e))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            return Err(GatewayError::IssuerUnavailable(format!(
                "issuer returned {status}"
            )));
        }
        if !status.is_success() {
            return Err(GatewayError::IssuerRejected(format!(
                "issuer returned {status}"
            )));
        }

        let body: TokenResponse = response.json().await.map_err(|e| {
            if e.is_decode() {
                GatewayError::IssuerRejected("issuer reply is not a token response".into())
            } else {
                transport(&e)
            }
        })?;
        let login_url = body
            .login_url
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| GatewayError::IssuerRejected("issuer reply has no login_url".into()))?;

        // The issuer usually answers with a path; anchor it at the base URL.
        let resolved = base_url.join(login_url.trim()).map_err(|e| {
            GatewayError::IssuerRejected(format!("issuer returned an invalid login_url: {e}"))
        })?;
        Ok(resolved.into())
    }
}
