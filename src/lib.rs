use axum::{
    Json, Router,
    extract::FromRef,
    http::{HeaderName, StatusCode},
    middleware,
};
use serde_json::json;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod paginate;
pub mod policy;
pub mod query;
pub mod repository;

// Module for routing segregation (Public, Authenticated, Admin, Super-Admin).
pub mod routes;
use routes::{admin, authenticated, public, super_admin};

// --- Public Re-exports ---

// Makes core state types easily accessible to the main application entry point (main.rs).
pub use config::AppConfig;
pub use repository::{PostgresRepository, RepositoryState};

/// ApiDoc
///
/// Auto-generates the OpenAPI documentation (Swagger JSON) for the application.
/// It aggregates all API paths and data schemas decorated with the
/// `#[utoipa::path]` and `#[derive(utoipa::ToSchema)]` macros.
/// The resulting JSON is served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    // List all handler functions here for documentation generation.
    paths(
        handlers::auth::login, handlers::auth::refresh, handlers::auth::verify,
        handlers::auth::logout,
        handlers::sales::list_sales, handlers::sales::get_sale, handlers::sales::create_sale,
        handlers::sales::update_sale, handlers::sales::delete_sale, handlers::sales::sale_stats,
        handlers::sales::validate_document,
        handlers::payments::list_payments, handlers::payments::get_payment,
        handlers::payments::create_payment, handlers::payments::update_payment,
        handlers::payments::delete_payment,
        handlers::suppliers::list_suppliers, handlers::suppliers::get_supplier,
        handlers::suppliers::create_supplier, handlers::suppliers::update_supplier,
        handlers::suppliers::delete_supplier,
        handlers::airlines::list_airlines, handlers::airlines::get_airline,
        handlers::airlines::create_airline, handlers::airlines::update_airline,
        handlers::airlines::delete_airline,
        handlers::accounts::list_accounts, handlers::accounts::create_account,
        handlers::accounts::set_account_status,
    ),
    // List all models (schemas) used in the request/response bodies.
    components(
        schemas(
            models::Role, models::AccountStatus, models::Account, models::Sale,
            models::Payment, models::Supplier, models::Airline,
            models::LoginRequest, models::RefreshRequest,
            models::CreateSaleRequest, models::UpdateSaleRequest,
            models::CreatePaymentRequest, models::UpdatePaymentRequest,
            models::CreateSupplierRequest, models::UpdateSupplierRequest,
            models::CreateAirlineRequest, models::UpdateAirlineRequest,
            models::CreateAccountRequest, models::UpdateAccountStatusRequest,
            models::SaleStats, paginate::PageMeta,
        )
    ),
    tags(
        (name = "quickway", description = "Travel agency records API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, thread-safe, immutable container holding all application
/// services and configuration, shared across all incoming requests.
#[derive(Clone)]
pub struct AppState {
    /// Repository Layer: abstracts database access behind the `Repository` trait.
    pub repo: RepositoryState,
    /// Configuration: the loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// These allow handlers and extractors to selectively pull components from the
// shared AppState.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the application's entire routing structure, applies global and
/// scoped middleware, and registers the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        // Documentation: serve the auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public routes: no middleware applied.
        .merge(public::public_routes())
        // Authenticated routes: the extractor rejects before any handler runs.
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth::require_auth,
            )),
        )
        // Admin routes: authentication plus a live re-check of the caller's
        // role, office and status against the store.
        .merge(
            admin::admin_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth::require_admin,
            )),
        )
        // Super-admin routes: account management, top role only.
        .merge(
            super_admin::super_admin_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth::require_super_admin,
            )),
        )
        // Unknown paths get the same envelope shape as every other error.
        .fallback(|| async {
            (
                StatusCode::NOT_FOUND,
                Json(json!({ "success": false, "error": "Route not found" })),
            )
        })
        // Apply the unified state to all routes.
        .with_state(state);

    // 3. Observability and Correlation Layers (applied outermost/first)
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Request ID generation: a unique UUID for every request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. Request tracing: wraps the request/response lifecycle in a
                // span carrying the generated request ID.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Request ID propagation back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS layer.
        .layer(cors)
}

/// trace_span_logger
///
/// Customizes the tracing span created by `TraceLayer`: the `x-request-id`
/// header (if present) is included alongside the HTTP method and URI, so every
/// log line for a single request is correlated by a unique ID.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
