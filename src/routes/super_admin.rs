use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, patch},
};

/// Super-Admin Router Module
///
/// Account management: the only surface from which user accounts are created
/// or have their status changed. Wrapped in the `require_super_admin`
/// middleware, which re-validates the caller's current role and status against
/// the store on every request.
pub fn super_admin_routes() -> Router<AppState> {
    Router::new()
        // GET/POST /api/users
        // Lists every account across offices; provisions new accounts.
        .route(
            "/api/users",
            get(handlers::accounts::list_accounts).post(handlers::accounts::create_account),
        )
        // PATCH /api/users/{email}/status
        // Activates, deactivates or suspends an account. The status change is
        // picked up immediately by the privileged middlewares and at the next
        // refresh or expiry for plain bearer access.
        .route(
            "/api/users/{email}/status",
            patch(handlers::accounts::set_account_status),
        )
}
