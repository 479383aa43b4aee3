use crate::{AppState, handlers};
use axum::{Router, routing::{get, post}};

/// Public Router Module
///
/// Defines endpoints reachable without a bearer token. Only the session entry
/// points live here — everything that touches a record requires a token.
///
/// Security Mandate:
/// `login` and `refresh` must verify the account's existence and **current**
/// status against the store before issuing a token. An inactive account must
/// never receive a fresh token through either path.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Unauthenticated liveness probe for monitoring and load balancers.
        .route("/health", get(|| async { "ok" }))
        // POST /api/auth/login
        // Issues a token for an existing, active account.
        .route("/api/auth/login", post(handlers::auth::login))
        // POST /api/auth/refresh
        // Re-issues a token from an expired one, rebuilt from the account's
        // current role/office/status. Public because the old token may be
        // expired and would not pass the auth layer.
        .route("/api/auth/refresh", post(handlers::auth::refresh))
}
