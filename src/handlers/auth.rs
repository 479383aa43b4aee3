use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::{
    AppState,
    auth::{AuthUser, TokenCodec},
    error::ApiError,
    handlers::ok_message,
    models::{AccountStatus, LoginRequest, RefreshRequest},
};

/// login
///
/// [Public Route] Resolves the account by email and issues a fresh token.
/// Existence and status are validated *before* issuing — the codec itself never
/// touches the store.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued"),
        (status = 403, description = "Account is inactive"),
        (status = 404, description = "User not found")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let email = payload.email.trim().to_lowercase();
    if email.is_empty() {
        return Err(ApiError::Validation("Email is required".into()));
    }

    let account = state
        .repo
        .find_account(&email)
        .await?
        .ok_or(ApiError::AccountNotFound)?;

    if account.status != AccountStatus::Active {
        return Err(ApiError::AccountInactive);
    }

    let token = TokenCodec::from_config(&state.config).issue(&account)?;

    Ok(Json(json!({
        "success": true,
        "message": "Login successful",
        "token": token,
        "user": {
            "email": account.email,
            "role": account.role,
            "officeId": account.office_id,
            "name": account.name,
        },
    })))
}

/// refresh
///
/// [Public Route] Re-issues a token from an expired-but-structurally-valid one.
/// The new token is built from the account's **current** role/office/status —
/// this is the one path where privilege changes propagate before expiry.
/// Refresh is repeatable: the old token is not invalidated.
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Token refreshed"),
        (status = 401, description = "Invalid token"),
        (status = 403, description = "Account is inactive"),
        (status = 404, description = "User not found")
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<Value>, ApiError> {
    if payload.token.trim().is_empty() {
        return Err(ApiError::Validation("Token is required".into()));
    }

    let codec = TokenCodec::from_config(&state.config);
    let stale = codec.verify_ignoring_expiry(&payload.token)?;

    let account = state
        .repo
        .find_account(&stale.email)
        .await?
        .ok_or(ApiError::AccountNotFound)?;

    if account.status != AccountStatus::Active {
        return Err(ApiError::AccountInactive);
    }

    let token = codec.issue(&account)?;

    Ok(Json(json!({
        "success": true,
        "message": "Token refreshed successfully",
        "token": token,
    })))
}

/// verify
///
/// [Authenticated Route] If the extractor passed, the token is valid; echo the
/// resolved identity back to the client.
#[utoipa::path(
    get,
    path = "/api/auth/verify",
    responses((status = 200, description = "Token is valid"))
)]
pub async fn verify(AuthUser(claims): AuthUser) -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Token is valid",
        "user": {
            "email": claims.email,
            "role": claims.role,
            "status": claims.status,
            "officeId": claims.office_id,
        },
    }))
}

/// logout
///
/// [Authenticated Route] Stateless tokens have nothing to tear down server-side;
/// the client simply discards the token. Kept for API symmetry.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses((status = 200, description = "Logged out"))
)]
pub async fn logout(_user: AuthUser) -> Json<Value> {
    ok_message("Logout successful")
}
