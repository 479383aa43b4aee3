use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    AppState,
    auth::AuthUser,
    error::ApiError,
    handlers::{ok, ok_message},
    models::{Airline, CreateAirlineRequest, UpdateAirlineRequest},
    paginate::{Page, PageQuery, paginate},
    query::{Record, ScopedQuery},
};

/// AirlineFilter
///
/// Resource-specific query parameters for airline listings.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct AirlineFilter {
    pub status: Option<String>,
}

/// list_airlines
///
/// [Authenticated Route] Lists airlines. Airlines are global reference data —
/// every authenticated caller sees the same set regardless of role or office.
#[utoipa::path(
    get,
    path = "/api/airlines",
    params(PageQuery, AirlineFilter),
    responses((status = 200, description = "Paginated airlines"))
)]
pub async fn list_airlines(
    _user: AuthUser,
    State(state): State<AppState>,
    Query(page_query): Query<PageQuery>,
    Query(filter): Query<AirlineFilter>,
) -> Result<Page<Airline>, ApiError> {
    let predicate = ScopedQuery::unscoped()
        .eq_text_opt("status", filter.status)
        .search(page_query.search.as_deref(), Airline::SEARCH_FIELDS)
        .build();

    paginate(state.repo.airlines(), &predicate, &page_query, &state.config).await
}

/// get_airline
///
/// [Authenticated Route] Retrieves one airline by id.
#[utoipa::path(
    get,
    path = "/api/airlines/{id}",
    params(("id" = Uuid, Path, description = "Airline ID")),
    responses(
        (status = 200, description = "Found"),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_airline(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let predicate = ScopedQuery::unscoped().id(id).build();

    let airline = state
        .repo
        .airlines()
        .find_one(&predicate)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(ok(airline))
}

/// create_airline
///
/// [Admin Route] Adds an airline to the global reference set. Gated by the
/// admin middleware, which re-checks the caller's current role against the
/// store before this handler runs.
#[utoipa::path(
    post,
    path = "/api/airlines",
    request_body = CreateAirlineRequest,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Validation failure"),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn create_airline(
    State(state): State<AppState>,
    Json(payload): Json<CreateAirlineRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    payload.validate()?;

    let airline = Airline {
        id: Uuid::new_v4(),
        airline_name: payload.airline_name,
        iata_name: payload.iata_name,
        airline_code: payload.airline_code,
        status: "Active".to_string(),
        created_at: Utc::now(),
    };

    let created = state.repo.insert_airline(airline).await?;
    Ok((StatusCode::CREATED, ok(created)))
}

/// update_airline
///
/// [Admin Route] Partial update of an airline record.
#[utoipa::path(
    put,
    path = "/api/airlines/{id}",
    params(("id" = Uuid, Path, description = "Airline ID")),
    request_body = UpdateAirlineRequest,
    responses(
        (status = 200, description = "Updated"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_airline(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAirlineRequest>,
) -> Result<Json<Value>, ApiError> {
    payload.validate()?;

    let updated = state
        .repo
        .update_airline(id, payload)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(ok(updated))
}

/// delete_airline
///
/// [Admin Route] Removes an airline from the reference set.
#[utoipa::path(
    delete,
    path = "/api/airlines/{id}",
    params(("id" = Uuid, Path, description = "Airline ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_airline(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    if !state.repo.delete_airline(id).await? {
        return Err(ApiError::NotFound);
    }

    Ok(ok_message("Airline deleted successfully"))
}
