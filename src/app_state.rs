//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::service::PoolService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Pool service for all business logic.
    pub pool_service: Arc<PoolService>,
}

impl AppState {
    /// Wraps a service for sharing across handlers.
    #[must_use]
    pub fn new(pool_service: PoolService) -> Self {
        Self {
            pool_service: Arc::new(pool_service),
        }
    }
}
