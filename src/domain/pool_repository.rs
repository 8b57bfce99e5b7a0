//! Load-mutate-save access to the persisted pool.
//!
//! [`PoolRepository`] is the only writer of the pool. Every mutation loads
//! a fresh snapshot, applies the change in memory, and saves the whole blob
//! back. The store has no compare-and-swap, so two concurrent mutations
//! race and the later `save` wins; a failed step never reaches `save`, so
//! errors leave the stored pool unchanged.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use super::pool::{AccountPatch, Pool};
use super::pool_entry::{AccountSummary, PoolEntry};
use crate::error::GatewayError;
use crate::persistence::PoolStore;

/// Serialises pool mutations through a [`PoolStore`].
///
/// Holds no pool state of its own; each call works on a snapshot loaded
/// for that call only.
#[derive(Debug, Clone)]
pub struct PoolRepository {
    store: Arc<dyn PoolStore>,
    store_timeout: Duration,
}

impl PoolRepository {
    /// Creates a repository over `store`, bounding each store call by
    /// `store_timeout`.
    #[must_use]
    pub fn new(store: Arc<dyn PoolStore>, store_timeout: Duration) -> Self {
        Self {
            store,
            store_timeout,
        }
    }

    /// Loads the current pool snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::StoreUnavailable`] if the store fails or
    /// does not answer in time.
    pub async fn snapshot(&self) -> Result<Pool, GatewayError> {
        self.bounded(self.store.load()).await
    }

    /// Adds a new account.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidInput`] for an empty or malformed
    /// field, [`GatewayError::DuplicateEmail`] if the email exists, or
    /// [`GatewayError::StoreUnavailable`].
    pub async fn add(&self, email: &str, sk: &str) -> Result<(), GatewayError> {
        let entry = PoolEntry::new(email, sk)?;
        let email = entry.email.clone();
        self.mutate(|pool| pool.insert(entry)).await?;
        tracing::info!(%email, "account added");
        Ok(())
    }

    /// Renames an account and/or replaces its SK in one cycle.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidInput`] if nothing is supplied or the
    /// new email belongs to another account, [`GatewayError::NotFound`] if
    /// `email` is absent, or [`GatewayError::StoreUnavailable`].
    pub async fn update(
        &self,
        email: &str,
        new_email: Option<&str>,
        new_sk: Option<&str>,
    ) -> Result<(), GatewayError> {
        let patch = AccountPatch::new(new_email, new_sk)?;
        self.mutate(|pool| pool.update(email, &patch)).await?;
        let email = email.trim();
        tracing::info!(
            %email,
            new_email = patch.new_email.as_deref().unwrap_or(email),
            sk_replaced = patch.new_sk.is_some(),
            "account updated"
        );
        Ok(())
    }

    /// Deletes an account.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] if `email` is absent, or
    /// [`GatewayError::StoreUnavailable`].
    pub async fn delete(&self, email: &str) -> Result<(), GatewayError> {
        let removed = self.mutate(|pool| pool.remove(email)).await?;
        tracing::info!(email = %removed.email, "account deleted");
        Ok(())
    }

    /// Redacted listing of every account, sorted by email.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::StoreUnavailable`].
    pub async fn list(&self) -> Result<Vec<AccountSummary>, GatewayError> {
        Ok(self.snapshot().await?.summaries())
    }

    /// Emails of accounts with a non-empty SK, sorted ascending.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::StoreUnavailable`].
    pub async fn list_emails(&self) -> Result<Vec<String>, GatewayError> {
        Ok(self.snapshot().await?.usable_emails())
    }

    /// Runs one load → apply → save cycle.
    ///
    /// `apply` sees a private copy; if it fails, nothing is saved.
    async fn mutate<T>(
        &self,
        apply: impl FnOnce(&mut Pool) -> Result<T, GatewayError>,
    ) -> Result<T, GatewayError> {
        let mut pool = self.snapshot().await?;
        let out = apply(&mut pool)?;
        self.bounded(self.store.save(&pool)).await?;
        Ok(out)
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, GatewayError>>,
    ) -> Result<T, GatewayError> {
        tokio::time::timeout(self.store_timeout, call)
            .await
            .map_err(|_| {
                GatewayError::StoreUnavailable(format!(
                    "store did not answer within {:?}",
                    self.store_timeout
                ))
            })?
    }
}
