//! Public-facing DTOs: email listing and login.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Request for `POST /login` (JSON body) and `GET /login` (query string).
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LoginRequest {
    /// `"specific"` or `"random"`.
    pub mode: String,
    /// Target account; required in specific mode, ignored in random mode.
    #[serde(default)]
    pub email: Option<String>,
    /// Optional isolation name passed through to the issuer.
    #[serde(default)]
    pub unique_name: Option<String>,
}

/// Response body for `POST /login`.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    /// One-time login URL.
    pub login_url: String,
}

/// Response body for `GET /emails`.
#[derive(Debug, Serialize, ToSchema)]
pub struct EmailListResponse {
    /// Usable account emails, sorted ascending.
    pub emails: Vec<String>,
    /// Number of emails.
    pub total: usize,
}
