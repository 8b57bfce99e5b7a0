//! Admin DTOs for account management.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::AccountSummary;

/// Request body for `POST /admin/accounts`.
#[derive(Deserialize, ToSchema)]
pub struct AddAccountRequest {
    /// Account email.
    pub email: String,
    /// Session key.
    pub sk: String,
}

impl fmt::Debug for AddAccountRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AddAccountRequest")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Request body for `PATCH /admin/accounts/{email}`. At least one field
/// must be non-blank.
#[derive(Deserialize, ToSchema)]
pub struct UpdateAccountRequest {
    /// New email for the account.
    #[serde(default)]
    pub new_email: Option<String>,
    /// Replacement session key.
    #[serde(default)]
    pub new_sk: Option<String>,
}

impl fmt::Debug for UpdateAccountRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateAccountRequest")
            .field("new_email", &self.new_email)
            .field("new_sk", &self.new_sk.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Response body for `GET /admin/accounts`.
#[derive(Debug, Serialize, ToSchema)]
pub struct AccountListResponse {
    /// Accounts sorted by email, keys redacted.
    pub accounts: Vec<AccountSummary>,
    /// Number of accounts.
    pub total: usize,
}
