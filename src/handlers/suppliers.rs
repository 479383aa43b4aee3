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
    models::{CreateSupplierRequest, Supplier, UpdateSupplierRequest},
    paginate::{Page, PageQuery, paginate},
    policy::{ScopedResource, scope_for},
    query::{Record, ScopedQuery},
};

/// SupplierFilter
///
/// Resource-specific query parameters for supplier listings.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct SupplierFilter {
    pub status: Option<String>,
    pub account_type: Option<String>,
}

/// list_suppliers
///
/// [Authenticated Route] Lists suppliers for the caller's office. Suppliers are
/// office-shared reference data, so agents are scoped by office here rather
/// than by creator.
#[utoipa::path(
    get,
    path = "/api/suppliers",
    params(PageQuery, SupplierFilter),
    responses((status = 200, description = "Paginated suppliers"))
)]
pub async fn list_suppliers(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Query(page_query): Query<PageQuery>,
    Query(filter): Query<SupplierFilter>,
) -> Result<Page<Supplier>, ApiError> {
    let scope = scope_for(&claims, ScopedResource::Suppliers)?;
    let predicate = ScopedQuery::new(scope)
        .eq_text_opt("status", filter.status)
        .eq_text_opt("account_type", filter.account_type)
        .search(page_query.search.as_deref(), Supplier::SEARCH_FIELDS)
        .build();

    paginate(state.repo.suppliers(), &predicate, &page_query, &state.config).await
}

/// get_supplier
///
/// [Authenticated Route] Retrieves one supplier by id, under office scope.
#[utoipa::path(
    get,
    path = "/api/suppliers/{id}",
    params(("id" = Uuid, Path, description = "Supplier ID")),
    responses(
        (status = 200, description = "Found"),
        (status = 404, description = "Not found or out of scope")
    )
)]
pub async fn get_supplier(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let scope = scope_for(&claims, ScopedResource::Suppliers)?;
    let predicate = ScopedQuery::new(scope).id(id).build();

    let supplier = state
        .repo
        .suppliers()
        .find_one(&predicate)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(ok(supplier))
}

/// create_supplier
///
/// [Authenticated Route] Registers a new supplier for the caller's office. New
/// suppliers start `Active` with zero dues unless stated otherwise.
#[utoipa::path(
    post,
    path = "/api/suppliers",
    request_body = CreateSupplierRequest,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Validation failure")
    )
)]
pub async fn create_supplier(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateSupplierRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    payload.validate()?;

    let supplier = Supplier {
        id: Uuid::new_v4(),
        office_id: claims.office_id.clone(),
        created_by: claims.email.clone(),
        supplier_name: payload.supplier_name,
        account_type: payload.account_type,
        status: "Active".to_string(),
        total_due: payload.total_due.unwrap_or(0.0),
        created_at: Utc::now(),
    };

    let created = state.repo.insert_supplier(supplier).await?;
    Ok((StatusCode::CREATED, ok(created)))
}

/// update_supplier
///
/// [Authenticated Route] Partial update under office scope.
#[utoipa::path(
    put,
    path = "/api/suppliers/{id}",
    params(("id" = Uuid, Path, description = "Supplier ID")),
    request_body = UpdateSupplierRequest,
    responses(
        (status = 200, description = "Updated"),
        (status = 404, description = "Not found or out of scope")
    )
)]
pub async fn update_supplier(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSupplierRequest>,
) -> Result<Json<Value>, ApiError> {
    payload.validate()?;

    let scope = scope_for(&claims, ScopedResource::Suppliers)?;
    let predicate = ScopedQuery::new(scope).id(id).build();
    state
        .repo
        .suppliers()
        .find_one(&predicate)
        .await?
        .ok_or(ApiError::NotFound)?;

    let updated = state
        .repo
        .update_supplier(id, payload)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(ok(updated))
}

/// delete_supplier
///
/// [Authenticated Route] Deletes a supplier under office scope.
#[utoipa::path(
    delete,
    path = "/api/suppliers/{id}",
    params(("id" = Uuid, Path, description = "Supplier ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not found or out of scope")
    )
)]
pub async fn delete_supplier(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let scope = scope_for(&claims, ScopedResource::Suppliers)?;
    let predicate = ScopedQuery::new(scope).id(id).build();
    state
        .repo
        .suppliers()
        .find_one(&predicate)
        .await?
        .ok_or(ApiError::NotFound)?;

    if !state.repo.delete_supplier(id).await? {
        return Err(ApiError::NotFound);
    }

    Ok(ok_message("Supplier deleted successfully"))
}
