use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Authenticated Router Module
///
/// Every route here sits behind the `require_auth` layer, so handlers always
/// receive a validated `AuthUser`. Visibility is then narrowed per request by
/// the role policy: agents see their own sales, office admins their office,
/// super-admins everything. Payments additionally reject agents outright.
///
/// Access Control Strategy:
/// Handlers derive a scope filter from the verified claims and weld it into
/// the query predicate before any store call, so an out-of-scope record id is
/// indistinguishable from a nonexistent one (404, never 403).
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // --- Session ---
        // GET /api/auth/verify
        // Echoes the resolved identity; reaching the handler proves validity.
        .route("/api/auth/verify", get(handlers::auth::verify))
        // POST /api/auth/logout
        // No server-side session to destroy; kept for API symmetry.
        .route("/api/auth/logout", post(handlers::auth::logout))
        // --- Sales ---
        // The /stats and /validate-document segments must be registered before
        // axum would otherwise capture them; literal segments take precedence
        // over {id} so order here is for readability only.
        .route(
            "/api/sales",
            get(handlers::sales::list_sales).post(handlers::sales::create_sale),
        )
        // GET /api/sales/stats?startDate=...&endDate=...
        // Scoped aggregate counters for the dashboard.
        .route("/api/sales/stats", get(handlers::sales::sale_stats))
        // GET /api/sales/validate-document?documentNumber=...
        // Uniqueness probe plus next receipt-voucher number.
        .route(
            "/api/sales/validate-document",
            get(handlers::sales::validate_document),
        )
        .route(
            "/api/sales/{id}",
            get(handlers::sales::get_sale)
                .put(handlers::sales::update_sale)
                .delete(handlers::sales::delete_sale),
        )
        // --- Payments (agents are rejected by the role policy, 403) ---
        .route(
            "/api/payments",
            get(handlers::payments::list_payments).post(handlers::payments::create_payment),
        )
        .route(
            "/api/payments/{id}",
            get(handlers::payments::get_payment)
                .put(handlers::payments::update_payment)
                .delete(handlers::payments::delete_payment),
        )
        // --- Suppliers (office-scoped for every role below super-admin) ---
        .route(
            "/api/suppliers",
            get(handlers::suppliers::list_suppliers).post(handlers::suppliers::create_supplier),
        )
        .route(
            "/api/suppliers/{id}",
            get(handlers::suppliers::get_supplier)
                .put(handlers::suppliers::update_supplier)
                .delete(handlers::suppliers::delete_supplier),
        )
        // --- Airlines (global reference data, read-only here) ---
        .route("/api/airlines", get(handlers::airlines::list_airlines))
        .route("/api/airlines/{id}", get(handlers::airlines::get_airline))
}
