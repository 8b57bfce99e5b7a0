//! Public handlers: list emails and obtain login URLs.

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect};
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{EmailListResponse, LoginRequest, LoginResponse};
use crate::app_state::AppState;
use crate::domain::LoginMode;
use crate::error::{ErrorResponse, GatewayError};

/// `GET /emails` — List accounts that can be logged into.
///
/// # Errors
///
/// Returns [`GatewayError::StoreUnavailable`] if the pool cannot be read.
#[utoipa::path(
    get,
    path = "/api/v1/emails",
    tag = "Login",
    summary = "List available emails",
    description = "Returns every email with a usable session key, sorted ascending.",
    responses(
        (status = 200, description = "Email list", body = EmailListResponse),
        (status = 503, description = "Store unavailable", body = ErrorResponse),
    )
)]
pub async fn list_emails(
    State(state): State<AppState>,
) -> Result<Json<EmailListResponse>, GatewayError> {
    let emails = state.pool_service.list_emails().await?;
    Ok(Json(EmailListResponse {
        total: emails.len(),
        emails,
    }))
}

/// `POST /login` — Issue a one-time login URL.
///
/// # Errors
///
/// Returns [`GatewayError`] on a bad mode, an unknown email, an empty
/// pool, or an issuer failure.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    tag = "Login",
    summary = "Obtain a login URL",
    description = "Selects the named account (`specific`) or a uniformly random one (`random`) and exchanges its session key for a one-time login URL.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login URL issued", body = LoginResponse),
        (status = 400, description = "Invalid mode or missing email", body = ErrorResponse),
        (status = 404, description = "Account not found or pool empty", body = ErrorResponse),
        (status = 502, description = "Issuer rejected the session key", body = ErrorResponse),
        (status = 503, description = "Store or issuer unavailable", body = ErrorResponse),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, GatewayError> {
    let login_url = issue(&state, &req).await?;
    Ok(Json(LoginResponse { login_url }))
}

/// `GET /login` — Issue a login URL and redirect the browser to it.
///
/// # Errors
///
/// Same as [`login`].
#[utoipa::path(
    get,
    path = "/api/v1/login",
    tag = "Login",
    summary = "Redirect to a login URL",
    description = "Same selection as `POST /login`, answered with a 303 redirect.",
    params(LoginRequest),
    responses(
        (status = 303, description = "Redirect to the issued login URL"),
        (status = 400, description = "Invalid mode or missing email", body = ErrorResponse),
        (status = 404, description = "Account not found or pool empty", body = ErrorResponse),
    )
)]
pub async fn login_redirect(
    State(state): State<AppState>,
    Query(req): Query<LoginRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let login_url = issue(&state, &req).await?;
    Ok(Redirect::to(&login_url))
}

async fn issue(state: &AppState, req: &LoginRequest) -> Result<String, GatewayError> {
    let mode: LoginMode = req.mode.parse()?;
    state
        .pool_service
        .login(mode, req.email.as_deref(), req.unique_name.as_deref())
        .await
}

/// Public routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/emails", get(list_emails))
        .route("/login", get(login_redirect).post(login))
}
