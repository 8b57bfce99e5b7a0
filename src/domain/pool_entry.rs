//! Pool entry: one email paired with its session key.

use std::fmt;

use serde::Serialize;
use utoipa::ToSchema;

use super::validation::{normalize_email, normalize_sk};
use crate::error::GatewayError;

/// Number of leading characters kept by [`redact_sk`].
pub const PREVIEW_HEAD: usize = 6;

/// Number of trailing characters kept by [`redact_sk`].
pub const PREVIEW_TAIL: usize = 4;

/// One account of the pool.
///
/// The email is the unique identifier; the SK is an opaque bearer secret.
/// `Debug` prints a redacted SK so entries can be logged safely.
#[derive(Clone, PartialEq, Eq)]
pub struct PoolEntry {
    /// Account email (unique, case-sensitive).
    pub email: String,
    /// Session key handed to the credential issuer.
    pub sk: String,
}

impl PoolEntry {
    /// Builds a validated entry from raw user input.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidInput`] if either field is empty or
    /// malformed.
    pub fn new(email: &str, sk: &str) -> Result<Self, GatewayError> {
        Ok(Self {
            email: normalize_email(email)?,
            sk: normalize_sk(sk)?,
        })
    }

    /// Redacted form of the SK, safe to display.
    #[must_use]
    pub fn sk_preview(&self) -> String {
        redact_sk(&self.sk)
    }
}

impl fmt::Debug for PoolEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolEntry")
            .field("email", &self.email)
            .field("sk", &self.sk_preview())
            .finish()
    }
}

/// Admin-facing view of an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AccountSummary {
    /// Account email.
    pub email: String,
    /// Redacted session key (see [`redact_sk`]).
    pub sk_preview: String,
}

impl From<&PoolEntry> for AccountSummary {
    fn from(entry: &PoolEntry) -> Self {
        Self {
            email: entry.email.clone(),
            sk_preview: entry.sk_preview(),
        }
    }
}

/// Redacts a session key to its first [`PREVIEW_HEAD`] and last
/// [`PREVIEW_TAIL`] characters.
///
/// Keys no longer than the preview window are masked completely, so the
/// preview never reproduces the secret.
#[must_use]
pub fn redact_sk(sk: &str) -> String {
    let len = sk.chars().count();
    if len <= PREVIEW_HEAD + PREVIEW_TAIL {
        return "*".repeat(len.max(1));
    }
    let head: String = sk.chars().take(PREVIEW_HEAD).collect();
    let tail: String = sk.chars().skip(len - PREVIEW_TAIL).collect();
    format!("{head}...{tail}")
}
