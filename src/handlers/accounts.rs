use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use serde_json::Value;

use crate::{
    AppState,
    error::ApiError,
    handlers::ok,
    models::{Account, AccountStatus, CreateAccountRequest, UpdateAccountStatusRequest},
};

/// list_accounts
///
/// [Super-Admin Route] Lists every user account across all offices. The
/// super-admin middleware has already re-verified the caller against the store.
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "All accounts"),
        (status = 403, description = "Super-admin access only")
    )
)]
pub async fn list_accounts(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let accounts = state.repo.list_accounts().await?;
    Ok(ok(accounts))
}

/// create_account
///
/// [Super-Admin Route] Provisions a new user account. Email is normalized to
/// lowercase since it doubles as the primary key and the token subject. New
/// accounts start `Active`.
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateAccountRequest,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Validation failure"),
        (status = 403, description = "Super-admin access only")
    )
)]
pub async fn create_account(
    State(state): State<AppState>,
    Json(payload): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let email = payload.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::Validation("A valid email is required".into()));
    }
    if payload.name.trim().is_empty() {
        return Err(ApiError::Validation("Name is required".into()));
    }
    if payload.office_id.trim().is_empty() {
        return Err(ApiError::Validation("Office ID is required".into()));
    }

    let account = Account {
        email,
        name: payload.name,
        role: payload.role,
        office_id: payload.office_id,
        status: AccountStatus::Active,
        created_at: Utc::now(),
    };

    let created = state.repo.create_account(account).await?;
    Ok((StatusCode::CREATED, ok(created)))
}

/// set_account_status
///
/// [Super-Admin Route] Activates, deactivates or suspends an account. Takes
/// effect immediately for the privileged middlewares (they re-fetch), and at
/// next expiry or refresh for ordinary bearer-token access.
#[utoipa::path(
    patch,
    path = "/api/users/{email}/status",
    params(("email" = String, Path, description = "Account email")),
    request_body = UpdateAccountStatusRequest,
    responses(
        (status = 200, description = "Updated"),
        (status = 403, description = "Super-admin access only"),
        (status = 404, description = "User not found")
    )
)]
pub async fn set_account_status(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Json(payload): Json<UpdateAccountStatusRequest>,
) -> Result<Json<Value>, ApiError> {
    let email = email.trim().to_lowercase();

    let updated = state
        .repo
        .set_account_status(&email, payload.status)
        .await?
        .ok_or(ApiError::AccountNotFound)?;

    Ok(ok(updated))
}
