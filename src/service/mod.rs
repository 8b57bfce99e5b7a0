//! Service layer: business logic orchestration.
//!
//! [`PoolService`] authenticates admin calls, drives the
//! [`crate::domain::PoolRepository`], and hands selected keys to the
//! [`crate::issuer::CredentialIssuer`].

pub mod pool_service;

pub use pool_service::{IssuerSettings, PoolService};
