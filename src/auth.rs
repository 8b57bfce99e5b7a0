//! Admin password check.
//!
//! Both sides are hashed with SHA-256 and the digests compared in constant
//! time, so neither a mismatching prefix nor a length difference shows up
//! in the timing.

use std::fmt;

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::error::GatewayError;

/// Verifies supplied passwords against the configured admin secret.
#[derive(Clone)]
pub struct AdminAuthenticator {
    secret_digest: Option<[u8; 32]>,
}

impl AdminAuthenticator {
    /// Creates an authenticator. A missing or blank secret disables admin
    /// access entirely: every password is rejected.
    #[must_use]
    pub fn new(secret: Option<&str>) -> Self {
        let secret_digest = secret.filter(|s| !s.trim().is_empty()).map(digest);
        Self { secret_digest }
    }

    /// Returns `true` if admin access is configured.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.secret_digest.is_some()
    }

    /// Returns `true` if `supplied` matches the secret.
    #[must_use]
    pub fn authenticate(&self, supplied: &str) -> bool {
        let Some(expected) = &self.secret_digest else {
            return false;
        };
        digest(supplied).as_slice().ct_eq(expected.as_slice()).into()
    }

    /// Like [`Self::authenticate`], as a `Result`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Unauthorized`] on mismatch.
    pub fn require(&self, supplied: &str) -> Result<(), GatewayError> {
        if self.authenticate(supplied) {
            Ok(())
        } else {
            tracing::warn!("admin authentication failed");
            Err(GatewayError::Unauthorized)
        }
    }
}

impl fmt::Debug for AdminAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminAuthenticator")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

fn digest(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_password_is_accepted() {
        let auth = AdminAuthenticator::new(Some("hunter2"));
        assert!(auth.authenticate("hunter2"));
        assert!(auth.require("hunter2").is_ok());
    }

    #[test]
    fn wrong_or_prefix_password_is_rejected() {
        let auth = AdminAuthenticator::new(Some("hunter2"));
        for wrong in ["", "hunter", "hunter22", "Hunter2"] {
            assert!(!auth.authenticate(wrong), "{wrong:?} must not pass");
        }
        assert_eq!(auth.require("nope"), Err(GatewayError::Unauthorized));
    }

    #[test]
    fn unset_secret_disables_admin() {
        for auth in [AdminAuthenticator::new(None), AdminAuthenticator::new(Some(""))] {
            assert!(!auth.is_enabled());
            assert!(!auth.authenticate(""));
        }
    }

    #[test]
    fn debug_hides_secret() {
        let auth = AdminAuthenticator::new(Some("hunter2"));
        assert!(!format!("{auth:?}").contains("hunter2"));
    }
}
