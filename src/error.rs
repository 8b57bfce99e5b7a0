//! Gateway error types with HTTP status code mapping.
//!
//! [`GatewayError`] is the central error type for the gateway. Each variant
//! maps to a specific HTTP status code and structured JSON error response.
//! Messages carry emails where useful but never session keys.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2002,
///     "message": "account not found: a@x.com"
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see the table on [`GatewayError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category         | HTTP Status                       |
/// |-----------|------------------|-----------------------------------|
/// | 1000–1999 | Validation       | 400 Bad Request                   |
/// | 2000–2999 | State/Not Found  | 404 Not Found / 409 Conflict      |
/// | 3000–3999 | Upstream         | 502 Bad Gateway / 503 Unavailable |
/// | 4000–4999 | Authentication   | 401 Unauthorized                  |
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// Request validation failed (empty or malformed email / SK, bad mode).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An account with this email is already in the pool.
    #[error("email already exists: {0}")]
    DuplicateEmail(String),

    /// No usable account with this email exists.
    #[error("account not found: {0}")]
    NotFound(String),

    /// Random selection was requested but the pool has no usable account.
    #[error("no accounts available in the pool")]
    PoolEmpty,

    /// Admin credential missing or wrong.
    #[error("unauthorized")]
    Unauthorized,

    /// The pool changed underneath an optimistic update. Reserved; the
    /// last-write-wins repository never raises it.
    #[error("conflicting update: {0}")]
    Conflict(String),

    /// The key-value store could not be reached or returned garbage.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// The credential issuer could not be reached in time.
    #[error("issuer unavailable: {0}")]
    IssuerUnavailable(String),

    /// The credential issuer refused the session key.
    #[error("issuer rejected the session key: {0}")]
    IssuerRejected(String),
}

impl GatewayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidInput(_) => 1001,
            Self::DuplicateEmail(_) => 2001,
            Self::NotFound(_) => 2002,
            Self::PoolEmpty => 2003,
            Self::Conflict(_) => 2004,
            Self::StoreUnavailable(_) => 3001,
            Self::IssuerUnavailable(_) => 3002,
            Self::IssuerRejected(_) => 3003,
            Self::Unauthorized => 4001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) | Self::PoolEmpty => StatusCode::NOT_FOUND,
            Self::DuplicateEmail(_) | Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::StoreUnavailable(_) | Self::IssuerUnavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::IssuerRejected(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Returns `true` when the failure is transient and the caller may
    /// retry the same request unchanged.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::StoreUnavailable(_) | Self::IssuerUnavailable(_)
        )
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!(code = self.error_code(), error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: self
                    .is_transient()
                    .then(|| "transient failure, safe to retry".to_string()),
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_4xx() {
        assert_eq!(
            GatewayError::InvalidInput("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::DuplicateEmail("a@x.com".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(GatewayError::PoolEmpty.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            GatewayError::Unauthorized.status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn only_unavailable_kinds_are_transient() {
        assert!(GatewayError::StoreUnavailable("down".into()).is_transient());
        assert!(GatewayError::IssuerUnavailable("down".into()).is_transient());
        assert!(!GatewayError::IssuerRejected("expired".into()).is_transient());
        assert!(!GatewayError::NotFound("a@x.com".into()).is_transient());
        assert!(!GatewayError::Conflict("stale".into()).is_transient());
    }

    #[test]
    fn error_codes_are_unique() {
        let all = [
            GatewayError::InvalidInput(String::new()),
            GatewayError::DuplicateEmail(String::new()),
            GatewayError::NotFound(String::new()),
            GatewayError::PoolEmpty,
            GatewayError::Unauthorized,
            GatewayError::Conflict(String::new()),
            GatewayError::StoreUnavailable(String::new()),
            GatewayError::IssuerUnavailable(String::new()),
            GatewayError::IssuerRejected(String::new()),
        ];
        let mut codes: Vec<u32> = all.iter().map(GatewayError::error_code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), all.len());
    }

    #[tokio::test]
    async fn response_carries_code_and_status() {
        let response = GatewayError::PoolEmpty.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let Ok(bytes) = axum::body::to_bytes(response.into_body(), 1024).await else {
            panic!("body read failed");
        };
        let Ok(json) = serde_json::from_slice::<serde_json::Value>(&bytes) else {
            panic!("body is not json");
        };
        assert_eq!(json.pointer("/error/code"), Some(&serde_json::json!(2003)));
    }
}
