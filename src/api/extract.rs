//! Request extractors.

use std::fmt;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::app_state::AppState;
use crate::error::GatewayError;

/// Header carrying the admin password.
pub const ADMIN_PASSWORD_HEADER: &str = "x-admin-password";

/// Admin password supplied with the request, already verified.
///
/// Read from `X-Admin-Password`, falling back to `Authorization: Bearer`.
/// The check runs while the request head is extracted, so a wrong password
/// is rejected with [`GatewayError::Unauthorized`] before any body is
/// parsed.
pub struct AdminPassword(pub String);

impl fmt::Debug for AdminPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AdminPassword(<redacted>)")
    }
}

impl FromRequestParts<AppState> for AdminPassword {
    type Rejection = GatewayError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let password = supplied_password(parts)?;
        state.pool_service.authorize(&password)?;
        Ok(Self(password))
    }
}

fn supplied_password(parts: &Parts) -> Result<String, GatewayError> {
    if let Some(value) = parts.headers.get(ADMIN_PASSWORD_HEADER) {
        return value
            .to_str()
            .map(str::to_string)
            .map_err(|_| GatewayError::Unauthorized);
    }
    let bearer = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or_default();
    Ok(bearer.to_string())
}
