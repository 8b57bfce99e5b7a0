//! Domain layer: pool model, repository, and account selection.
//!
//! This module contains the email → SK mapping, its validation rules, the
//! load-mutate-save repository that persists it, and the selector that
//! resolves login requests against a snapshot.

pub mod pool;
pub mod pool_entry;
pub mod pool_repository;
pub mod selector;
pub mod validation;

pub use pool::{AccountPatch, Pool};
pub use pool_entry::{AccountSummary, PoolEntry};
pub use pool_repository::PoolRepository;
pub use selector::{EntryPicker, LoginMode, LoginTarget, SeededPicker, ThreadRngPicker};
