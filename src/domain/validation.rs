//! Input normalisation for emails and session keys.
//!
//! Both functions trim surrounding whitespace and return the value that is
//! actually stored. Emails keep their case: `A@x.com` and `a@x.com` are two
//! different accounts.

use crate::error::GatewayError;

/// Longest accepted email address (RFC 5321 path limit).
pub const MAX_EMAIL_LEN: usize = 254;

/// Longest accepted session key.
pub const MAX_SK_LEN: usize = 4096;

/// Trims and validates an email address.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidInput`] when the email is empty, too long,
/// contains whitespace, or is not of the form `local@domain`.
pub fn normalize_email(raw: &str) -> Result<String, GatewayError> {
    let email = raw.trim();
    if email.is_empty() {
        return Err(GatewayError::InvalidInput("email must not be empty".into()));
    }
    if email.chars().count() > MAX_EMAIL_LEN {
        return Err(GatewayError::InvalidInput(format!(
            "email exceeds {MAX_EMAIL_LEN} characters"
        )));
    }
    if email.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(GatewayError::InvalidInput(format!(
            "email must not contain whitespace: {email}"
        )));
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(email.to_string())
        }
        _ => Err(GatewayError::InvalidInput(format!(
            "malformed email: {email}"
        ))),
    }
}

/// Trims and validates a session key.
///
/// The key itself never appears in the error message.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidInput`] when the key is empty, too long,
/// or contains whitespace or control characters.
pub fn normalize_sk(raw: &str) -> Result<String, GatewayError> {
    let sk = raw.trim();
    if sk.is_empty() {
        return Err(GatewayError::InvalidInput("sk must not be empty".into()));
    }
    if sk.chars().count() > MAX_SK_LEN {
        return Err(GatewayError::InvalidInput(format!(
            "sk exceeds {MAX_SK_LEN} characters"
        )));
    }
    if sk.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(GatewayError::InvalidInput(
            "sk must not contain whitespace or control characters".into(),
        ));
    }
    Ok(sk.to_string())
}

/// Treats `None` and blank strings alike: both mean "not supplied".
#[must_use]
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
