use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{post, put},
};

/// Admin Router Module
///
/// Write access to global reference data (airlines). The entire router is
/// wrapped in the `require_admin` middleware, which authenticates the caller
/// and then **re-fetches the account** to check the current role, office and
/// status — a demoted or deactivated admin loses this surface immediately,
/// not at token expiry.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // POST /api/airlines
        // Adds an airline to the global reference set.
        .route("/api/airlines", post(handlers::airlines::create_airline))
        // PUT/DELETE /api/airlines/{id}
        // Edits or removes an airline record.
        .route(
            "/api/airlines/{id}",
            put(handlers::airlines::update_airline).delete(handlers::airlines::delete_airline),
        )
}
