//! The email → SK mapping and its pure in-memory mutations.
//!
//! A [`Pool`] is a snapshot: it is loaded from the store, changed here,
//! and written back by [`super::PoolRepository`]. Nothing in this module
//! performs I/O.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::pool_entry::{AccountSummary, PoolEntry};
use super::validation::{non_blank, normalize_email, normalize_sk};
use crate::error::GatewayError;

/// Email → SK mapping.
///
/// Serializes as a plain JSON object (`{"a@x.com": "sk-..."}`), which is the
/// persisted layout. Backed by a `BTreeMap`, so every view is already sorted
/// by email.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pool {
    accounts: BTreeMap<String, String>,
}

impl Pool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries, usable or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Returns `true` if the pool has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Returns `true` if an entry with exactly this email exists.
    #[must_use]
    pub fn contains(&self, email: &str) -> bool {
        self.accounts.contains_key(email)
    }

    /// Returns the SK stored for `email`.
    #[must_use]
    pub fn sk(&self, email: &str) -> Option<&str> {
        self.accounts.get(email).map(String::as_str)
    }

    /// Inserts a new entry.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::DuplicateEmail`] if the email is already
    /// present; the pool is left untouched.
    pub fn insert(&mut self, entry: PoolEntry) -> Result<(), GatewayError> {
        if self.accounts.contains_key(&entry.email) {
            return Err(GatewayError::DuplicateEmail(entry.email));
        }
        self.accounts.insert(entry.email, entry.sk);
        Ok(())
    }

    /// Finds the stored key for `email`: the trimmed form first, then the
    /// exact string, so keys written with stray whitespace stay reachable.
    fn locate<'a>(&self, email: &'a str) -> Option<&'a str> {
        let trimmed = email.trim();
        if self.accounts.contains_key(trimmed) {
            Some(trimmed)
        } else if self.accounts.contains_key(email) {
            Some(email)
        } else {
            None
        }
    }

    /// Renames and/or re-keys the entry stored under `email`.
    ///
    /// Renaming an entry to its own email is a no-op rename.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] if `email` is absent and
    /// [`GatewayError::InvalidInput`] if the new email belongs to another
    /// entry. On error the pool is left untouched.
    pub fn update(&mut self, email: &str, patch: &AccountPatch) -> Result<(), GatewayError> {
        let Some(email) = self.locate(email) else {
            return Err(GatewayError::NotFound(email.trim().to_string()));
        };
        let Some(current_sk) = self.accounts.get(email) else {
            return Err(GatewayError::NotFound(email.to_string()));
        };
        let target = patch.new_email.as_deref().unwrap_or(email);
        if target != email && self.accounts.contains_key(target) {
            return Err(GatewayError::InvalidInput(format!(
                "email already used by another account: {target}"
            )));
        }

        let sk = patch
            .new_sk
            .clone()
            .unwrap_or_else(|| current_sk.clone());
        if target != email {
            self.accounts.remove(email);
        }
        self.accounts.insert(target.to_string(), sk);
        Ok(())
    }

    /// Removes the entry stored under `email`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] if `email` is absent.
    pub fn remove(&mut self, email: &str) -> Result<PoolEntry, GatewayError> {
        self.locate(email)
            .and_then(|key| self.accounts.remove_entry(key))
            .map(|(email, sk)| PoolEntry { email, sk })
            .ok_or_else(|| GatewayError::NotFound(email.trim().to_string()))
    }

    /// Entries with a non-empty SK, in email order.
    pub fn usable(&self) -> impl Iterator<Item = (&str, &str)> {
        self.accounts
            .iter()
            .filter(|(_, sk)| !sk.trim().is_empty())
            .map(|(email, sk)| (email.as_str(), sk.as_str()))
    }

    /// Emails of usable entries, sorted ascending.
    #[must_use]
    pub fn usable_emails(&self) -> Vec<String> {
        self.usable().map(|(email, _)| email.to_string()).collect()
    }

    /// Redacted view of every entry, sorted ascending by email.
    #[must_use]
    pub fn summaries(&self) -> Vec<AccountSummary> {
        self.accounts
            .iter()
            .map(|(email, sk)| {
                AccountSummary::from(&PoolEntry {
                    email: email.clone(),
                    sk: sk.clone(),
                })
            })
            .collect()
    }
}

impl fmt::Debug for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("emails", &self.accounts.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl FromIterator<PoolEntry> for Pool {
    fn from_iter<I: IntoIterator<Item = PoolEntry>>(iter: I) -> Self {
        Self {
            accounts: iter.into_iter().map(|e| (e.email, e.sk)).collect(),
        }
    }
}

/// Validated change set for an update.
#[derive(Clone, PartialEq, Eq)]
pub struct AccountPatch {
    /// Replacement email, already normalised.
    pub new_email: Option<String>,
    /// Replacement SK, already normalised.
    pub new_sk: Option<String>,
}

impl AccountPatch {
    /// Validates the raw update fields. Blank values count as absent.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidInput`] if neither field is supplied
    /// or a supplied field is malformed.
    pub fn new(new_email: Option<&str>, new_sk: Option<&str>) -> Result<Self, GatewayError> {
        let new_email = non_blank(new_email).map(normalize_email).transpose()?;
        let new_sk = non_blank(new_sk).map(normalize_sk).transpose()?;
        if new_email.is_none() && new_sk.is_none() {
            return Err(GatewayError::InvalidInput(
                "at least one of new_email or new_sk is required".into(),
            ));
        }
        Ok(Self { new_email, new_sk })
    }
}

impl fmt::Debug for AccountPatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountPatch")
            .field("new_email", &self.new_email)
            .field("new_sk", &self.new_sk.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn entry(email: &str, sk: &str) -> PoolEntry {
        let Ok(entry) = PoolEntry::new(email, sk) else {
            panic!("valid entry");
        };
        entry
    }

    fn patch(new_email: Option<&str>, new_sk: Option<&str>) -> AccountPatch {
        let Ok(patch) = AccountPatch::new(new_email, new_sk) else {
            panic!("valid patch");
        };
        patch
    }

    #[test]
    fn persisted_layout_is_a_flat_object() {
        let pool: Pool = [entry("b@x.com", "sk2"), entry("a@x.com", "sk1")]
            .into_iter()
            .collect();
        let Ok(json) = serde_json::to_string(&pool) else {
            panic!("serialization failed");
        };
        assert_eq!(json, r#"{"a@x.com":"sk1","b@x.com":"sk2"}"#);
    }

    #[test]
    fn insert_rejects_duplicates_without_change() {
        let mut pool = Pool::new();
        assert!(pool.insert(entry("a@x.com", "sk1")).is_ok());
        assert_eq!(
            pool.insert(entry("a@x.com", "sk2")),
            Err(GatewayError::DuplicateEmail("a@x.com".into()))
        );
        assert_eq!(pool.sk("a@x.com"), Some("sk1"));
    }

    #[test]
    fn emails_are_case_sensitive() {
        let mut pool = Pool::new();
        assert!(pool.insert(entry("a@x.com", "sk1")).is_ok());
        assert!(pool.insert(entry("A@x.com", "sk2")).is_ok());
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn update_sk_keeps_email() {
        let mut pool: Pool = [entry("a@x.com", "sk1")].into_iter().collect();
        assert!(pool.update("a@x.com", &patch(None, Some("sk2"))).is_ok());
        assert_eq!(pool.sk("a@x.com"), Some("sk2"));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn rename_moves_sk() {
        let mut pool: Pool = [entry("a@x.com", "sk1")].into_iter().collect();
        assert!(pool.update("a@x.com", &patch(Some("c@x.com"), None)).is_ok());
        assert!(!pool.contains("a@x.com"));
        assert_eq!(pool.sk("c@x.com"), Some("sk1"));
    }

    #[test]
    fn rename_and_rekey_together() {
        let mut pool: Pool = [entry("a@x.com", "sk1")].into_iter().collect();
        assert!(
            pool.update("a@x.com", &patch(Some("c@x.com"), Some("sk9")))
                .is_ok()
        );
        assert_eq!(pool.sk("c@x.com"), Some("sk9"));
    }

    #[test]
    fn rename_onto_other_entry_is_invalid() {
        let mut pool: Pool = [entry("a@x.com", "sk1"), entry("b@x.com", "sk2")]
            .into_iter()
            .collect();
        let before = pool.clone();
        let result = pool.update("a@x.com", &patch(Some("b@x.com"), Some("sk3")));
        assert!(matches!(result, Err(GatewayError::InvalidInput(_))));
        assert_eq!(pool, before);
    }

    #[test]
    fn rename_to_self_is_noop() {
        let mut pool: Pool = [entry("a@x.com", "sk1")].into_iter().collect();
        assert!(pool.update("a@x.com", &patch(Some("a@x.com"), None)).is_ok());
        assert_eq!(pool.sk("a@x.com"), Some("sk1"));
    }

    #[test]
    fn rename_to_self_still_replaces_sk() {
        let mut pool: Pool = [entry("a@x.com", "sk1")].into_iter().collect();
        assert!(
            pool.update("a@x.com", &patch(Some("a@x.com"), Some("sk2")))
                .is_ok()
        );
        assert_eq!(pool.sk("a@x.com"), Some("sk2"));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn padded_stored_keys_remain_editable() {
        let Ok(mut pool) =
            serde_json::from_str::<Pool>(r#"{" a@x.com ":"sk1","b@x.com":"sk2"}"#)
        else {
            panic!("valid blob");
        };
        assert!(pool.update(" a@x.com ", &patch(None, Some("sk3"))).is_ok());
        assert_eq!(pool.sk(" a@x.com "), Some("sk3"));

        assert!(pool.update(" b@x.com", &patch(None, Some("sk4"))).is_ok());
        assert_eq!(pool.sk("b@x.com"), Some("sk4"));

        let Ok(removed) = pool.remove(" a@x.com ") else {
            panic!("padded key should be removable");
        };
        assert_eq!(removed.email, " a@x.com ");
        assert!(matches!(
            pool.remove("a@x.com"),
            Err(GatewayError::NotFound(_))
        ));
    }

    #[test]
    fn update_missing_is_not_found() {
        let mut pool = Pool::new();
        assert_eq!(
            pool.update("a@x.com", &patch(None, Some("sk2"))),
            Err(GatewayError::NotFound("a@x.com".into()))
        );
    }

    #[test]
    fn empty_patch_is_invalid() {
        assert!(matches!(
            AccountPatch::new(None, Some("  ")),
            Err(GatewayError::InvalidInput(_))
        ));
    }

    #[test]
    fn remove_returns_entry() {
        let mut pool: Pool = [entry("a@x.com", "sk1")].into_iter().collect();
        let Ok(removed) = pool.remove("a@x.com") else {
            panic!("entry should exist");
        };
        assert_eq!(removed.sk, "sk1");
        assert!(pool.is_empty());
        assert!(matches!(
            pool.remove("a@x.com"),
            Err(GatewayError::NotFound(_))
        ));
    }

    #[test]
    fn usable_emails_skip_blank_keys() {
        let Ok(pool) =
            serde_json::from_str::<Pool>(r#"{"c@x.com":"sk3","a@x.com":"sk1","b@x.com":""}"#)
        else {
            panic!("valid blob");
        };
        assert_eq!(pool.usable_emails(), vec!["a@x.com", "c@x.com"]);
        assert_eq!(pool.summaries().len(), 3);
    }

    #[test]
    fn debug_hides_keys() {
        let pool: Pool = [entry("a@x.com", "sk-secret-value")].into_iter().collect();
        let printed = format!("{pool:?}");
        assert!(printed.contains("a@x.com"));
        assert!(!printed.contains("secret"));
    }
}
