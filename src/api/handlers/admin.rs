//! Admin handlers: account CRUD behind the admin password.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};

use crate::api::dto::{AccountListResponse, AddAccountRequest, UpdateAccountRequest};
use crate::api::extract::AdminPassword;
use crate::app_state::AppState;
use crate::error::{ErrorResponse, GatewayError};

/// `GET /admin/accounts` — List all accounts with redacted keys.
///
/// # Errors
///
/// Returns [`GatewayError::Unauthorized`] on a bad password.
#[utoipa::path(
    get,
    path = "/api/v1/admin/accounts",
    tag = "Admin",
    summary = "List accounts",
    description = "Returns every account sorted by email. Session keys are shown as a short preview only.",
    params(
        ("X-Admin-Password" = String, Header, description = "Admin password"),
    ),
    responses(
        (status = 200, description = "Account list", body = AccountListResponse),
        (status = 401, description = "Wrong admin password", body = ErrorResponse),
    )
)]
pub async fn list_accounts(
    State(state): State<AppState>,
    AdminPassword(password): AdminPassword,
) -> Result<Json<AccountListResponse>, GatewayError> {
    let accounts = state.pool_service.admin_list(&password).await?;
    Ok(Json(AccountListResponse {
        total: accounts.len(),
        accounts,
    }))
}

/// `POST /admin/accounts` — Add an account.
///
/// # Errors
///
/// Returns [`GatewayError`] on a bad password, invalid input, or a
/// duplicate email.
#[utoipa::path(
    post,
    path = "/api/v1/admin/accounts",
    tag = "Admin",
    summary = "Add an account",
    request_body = AddAccountRequest,
    params(
        ("X-Admin-Password" = String, Header, description = "Admin password"),
    ),
    responses(
        (status = 201, description = "Account added"),
        (status = 400, description = "Invalid email or session key", body = ErrorResponse),
        (status = 401, description = "Wrong admin password", body = ErrorResponse),
        (status = 409, description = "Email already exists", body = ErrorResponse),
    )
)]
pub async fn add_account(
    State(state): State<AppState>,
    AdminPassword(password): AdminPassword,
    Json(req): Json<AddAccountRequest>,
) -> Result<StatusCode, GatewayError> {
    state
        .pool_service
        .admin_add(&password, &req.email, &req.sk)
        .await?;
    Ok(StatusCode::CREATED)
}

/// `PATCH /admin/accounts/{email}` — Rename an account and/or replace its key.
///
/// # Errors
///
/// Returns [`GatewayError`] on a bad password, an empty change set, an
/// email clash, or an unknown account.
#[utoipa::path(
    patch,
    path = "/api/v1/admin/accounts/{email}",
    tag = "Admin",
    summary = "Update an account",
    description = "Applies the rename and the key replacement in one step. At least one of `new_email` and `new_sk` is required.",
    request_body = UpdateAccountRequest,
    params(
        ("email" = String, Path, description = "Current account email"),
        ("X-Admin-Password" = String, Header, description = "Admin password"),
    ),
    responses(
        (status = 204, description = "Account updated"),
        (status = 400, description = "Nothing to change or email already used", body = ErrorResponse),
        (status = 401, description = "Wrong admin password", body = ErrorResponse),
        (status = 404, description = "Account not found", body = ErrorResponse),
    )
)]
pub async fn update_account(
    State(state): State<AppState>,
    AdminPassword(password): AdminPassword,
    Path(email): Path<String>,
    Json(req): Json<UpdateAccountRequest>,
) -> Result<StatusCode, GatewayError> {
    state
        .pool_service
        .admin_update(
            &password,
            &email,
            req.new_email.as_deref(),
            req.new_sk.as_deref(),
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /admin/accounts/{email}` — Remove an account.
///
/// # Errors
///
/// Returns [`GatewayError`] on a bad password or an unknown account.
#[utoipa::path(
    delete,
    path = "/api/v1/admin/accounts/{email}",
    tag = "Admin",
    summary = "Delete an account",
    params(
        ("email" = String, Path, description = "Account email"),
        ("X-Admin-Password" = String, Header, description = "Admin password"),
    ),
    responses(
        (status = 204, description = "Account deleted"),
        (status = 401, description = "Wrong admin password", body = ErrorResponse),
        (status = 404, description = "Account not found", body = ErrorResponse),
    )
)]
pub async fn delete_account(
    State(state): State<AppState>,
    AdminPassword(password): AdminPassword,
    Path(email): Path<String>,
) -> Result<StatusCode, GatewayError> {
    state.pool_service.admin_delete(&password, &email).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Admin routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/accounts", get(list_accounts).post(add_account))
        .route(
            "/admin/accounts/{email}",
            patch(update_account).delete(delete_account),
        )
}
