//! REST endpoint handlers organized by audience.

pub mod admin;
pub mod login;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(login::routes())
        .merge(admin::routes())
}
