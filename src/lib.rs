//! # session-pool-gateway
//!
//! REST gateway that keeps a pool of `email → session key` accounts in a
//! key-value store and exchanges a chosen key for a one-time login URL at
//! an upstream credential issuer.
//!
//! The gateway is stateless between requests: every operation reloads the
//! pool from the store, and every mutation writes the whole pool back.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── PoolService (service/)
//!     ├── AdminAuthenticator (auth)
//!     │
//!     ├── PoolRepository + Selector (domain/)
//!     ├── CredentialIssuer (issuer/)
//!     │
//!     └── PoolStore: memory / Workers KV (persistence/)
//! ```

pub mod api;
pub mod app_state;
pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod issuer;
pub mod persistence;
pub mod service;
