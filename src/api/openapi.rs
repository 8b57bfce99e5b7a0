//! OpenAPI document for the REST surface.

use utoipa::OpenApi;

use crate::api::dto::{
    AccountListResponse, AddAccountRequest, EmailListResponse, LoginRequest, LoginResponse,
    UpdateAccountRequest,
};
use crate::api::handlers::{admin, login, system};
use crate::domain::{AccountSummary, LoginMode};
use crate::error::{ErrorBody, ErrorResponse};

/// Generated OpenAPI description, served at `/api-docs/openapi.json`.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "Session Pool Gateway",
        description = "Hands out one-time login URLs from a pool of session keys.",
    ),
    paths(
        system::health_handler,
        login::list_emails,
        login::login,
        login::login_redirect,
        admin::list_accounts,
        admin::add_account,
        admin::update_account,
        admin::delete_account,
    ),
    components(schemas(
        system::HealthResponse,
        LoginMode,
        LoginRequest,
        LoginResponse,
        EmailListResponse,
        AddAccountRequest,
        UpdateAccountRequest,
        AccountListResponse,
        AccountSummary,
        ErrorResponse,
        ErrorBody,
    )),
    tags(
        (name = "System", description = "Liveness"),
        (name = "Login", description = "Public account listing and login URL issuance"),
        (name = "Admin", description = "Account management, password protected"),
    ),
)]
pub struct ApiDoc;
