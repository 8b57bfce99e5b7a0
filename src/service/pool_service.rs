//! Pool service: the user and admin operations exposed to handlers.

use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::auth::AdminAuthenticator;
use crate::domain::selector::select;
use crate::domain::validation::non_blank;
use crate::domain::{
    AccountSummary, EntryPicker, LoginMode, LoginTarget, PoolRepository, ThreadRngPicker,
};
use crate::error::GatewayError;
use crate::issuer::CredentialIssuer;

/// Where and how long to talk to the credential issuer.
#[derive(Debug, Clone)]
pub struct IssuerSettings {
    /// Issuer base URL every login URL is requested from.
    pub base_url: Url,
    /// Bound on a single issuance call.
    pub timeout: Duration,
}

/// Orchestration layer for all pool operations.
///
/// Stateless coordinator: every call loads a fresh snapshot through the
/// [`PoolRepository`]. Admin methods check the password before touching
/// the repository.
#[derive(Debug, Clone)]
pub struct PoolService {
    repository: PoolRepository,
    issuer: Arc<dyn CredentialIssuer>,
    authenticator: AdminAuthenticator,
    picker: Arc<dyn EntryPicker>,
    issuer_settings: IssuerSettings,
}

impl PoolService {
    /// Creates a new `PoolService` using the thread RNG for random picks.
    #[must_use]
    pub fn new(
        repository: PoolRepository,
        issuer: Arc<dyn CredentialIssuer>,
        authenticator: AdminAuthenticator,
        issuer_settings: IssuerSettings,
    ) -> Self {
        Self {
            repository,
            issuer,
            authenticator,
            picker: Arc::new(ThreadRngPicker),
            issuer_settings,
        }
    }

    /// Replaces the random source used by random-mode logins.
    #[must_use]
    pub fn with_picker(mut self, picker: Arc<dyn EntryPicker>) -> Self {
        self.picker = picker;
        self
    }

    /// Checks an admin password without touching the pool.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Unauthorized`] on mismatch.
    pub fn authorize(&self, password: &str) -> Result<(), GatewayError> {
        self.authenticator.require(password)
    }

    /// Emails that can be logged into, sorted ascending.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::StoreUnavailable`].
    pub async fn list_emails(&self) -> Result<Vec<String>, GatewayError> {
        self.repository.list_emails().await
    }

    /// Issues a one-time login URL for a specific or random account.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidInput`] if specific mode lacks an
    /// email, [`GatewayError::NotFound`] or [`GatewayError::PoolEmpty`] if
    /// no account matches, [`GatewayError::StoreUnavailable`], or the
    /// issuer's own failure kinds.
    pub async fn login(
        &self,
        mode: LoginMode,
        email: Option<&str>,
        unique_name: Option<&str>,
    ) -> Result<String, GatewayError> {
        let target = LoginTarget::new(mode, email)?;
        let pool = self.repository.snapshot().await?;
        let entry = select(&pool, &target, self.picker.as_ref())?;
        tracing::info!(email = %entry.email, ?mode, "account selected for login");

        let timeout = self.issuer_settings.timeout;
        let issued = tokio::time::timeout(
            timeout,
            self.issuer.issue_login_url(
                &entry.sk,
                &self.issuer_settings.base_url,
                non_blank(unique_name),
            ),
        )
        .await
        .map_err(|_| {
            GatewayError::IssuerUnavailable(format!("issuer did not answer within {timeout:?}"))
        })?;

        if let Err(e) = &issued {
            tracing::warn!(email = %entry.email, error = %e, "login url issuance failed");
        }
        issued
    }

    /// Redacted listing of all accounts.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Unauthorized`] or
    /// [`GatewayError::StoreUnavailable`].
    pub async fn admin_list(&self, password: &str) -> Result<Vec<AccountSummary>, GatewayError> {
        self.authenticator.require(password)?;
        self.repository.list().await
    }

    /// Adds an account.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Unauthorized`] before anything else, then
    /// any [`PoolRepository::add`] error.
    pub async fn admin_add(&self, password: &str, email: &str, sk: &str) -> Result<(), GatewayError> {
        self.authenticator.require(password)?;
        self.repository.add(email, sk).await
    }

    /// Renames an account and/or replaces its SK.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Unauthorized`] before anything else, then
    /// any [`PoolRepository::update`] error.
    pub async fn admin_update(
        &self,
        password: &str,
        email: &str,
        new_email: Option<&str>,
        new_sk: Option<&str>,
    ) -> Result<(), GatewayError> {
        self.authenticator.require(password)?;
        self.repository.update(email, new_email, new_sk).await
    }

    /// Deletes an account.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Unauthorized`] before anything else, then
    /// any [`PoolRepository::delete`] error.
    pub async fn admin_delete(&self, password: &str, email: &str) -> Result<(), GatewayError> {
        self.authenticator.require(password)?;
        self.repository.delete(email).await
    }
}
