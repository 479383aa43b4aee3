use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// ApiError
///
/// The crate-wide failure taxonomy. Every fallible path in the core resolves to one
/// of these variants, and the `IntoResponse` implementation is the single place where
/// a variant is mapped to an HTTP status and the standard error envelope.
///
/// Authorization failures are always produced before any data access; store failures
/// bubble up unmodified. Nothing here is retried — every failure is terminal for the
/// current request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No `Authorization: Bearer` header was present on the request.
    #[error("Unauthorized access - No token provided")]
    TokenMissing,

    /// The token failed signature or structural validation.
    #[error("Invalid token")]
    TokenMalformed,

    /// The token was well-formed and correctly signed, but past its expiry.
    #[error("Token expired")]
    TokenExpired,

    /// The account referenced by a token or request no longer exists.
    #[error("User not found")]
    AccountNotFound,

    /// The account exists but its status is not `active`.
    #[error("Account is inactive")]
    AccountInactive,

    /// The caller's role is not permitted to perform this operation at all.
    #[error("Forbidden access: {0}")]
    Forbidden(&'static str),

    /// A caller-supplied filter value was not usable (e.g. a negative amount).
    #[error("Invalid filter value for {0}")]
    InvalidFilterValue(&'static str),

    /// The requested sort field is not sortable for this resource.
    #[error("Invalid sort field: {0}")]
    InvalidSortField(String),

    /// A request payload failed domain validation.
    #[error("{0}")]
    Validation(String),

    /// The record does not exist — or is outside the caller's scope, which is
    /// deliberately indistinguishable.
    #[error("Record not found")]
    NotFound,

    /// A persistence-layer failure, surfaced as-is from the record store.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// An unexpected internal failure (e.g. token signing).
    #[error("Internal server error")]
    Internal(String),
}

/// StoreError
///
/// Generic wrapper around a record-store failure. The core never inspects the inner
/// error beyond logging it; the HTTP layer sees an opaque 500.
#[derive(Debug, Error)]
#[error("store error: {0}")]
pub struct StoreError(#[from] pub sqlx::Error);

impl ApiError {
    /// Maps each taxonomy variant to its HTTP status code.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::TokenMissing | ApiError::TokenMalformed | ApiError::TokenExpired => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::AccountNotFound | ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::AccountInactive | ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::InvalidFilterValue(_)
            | ApiError::InvalidSortField(_)
            | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Store failures carry connection details that must not reach the client.
        let message = match &self {
            ApiError::Store(e) => {
                tracing::error!("store error: {:?}", e);
                "Internal server error".to_string()
            }
            ApiError::Internal(detail) => {
                tracing::error!("internal error: {}", detail);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({ "success": false, "error": message }));
        (status, body).into_response()
    }
}
