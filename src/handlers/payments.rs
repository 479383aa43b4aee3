use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::Value;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    AppState,
    auth::AuthUser,
    error::ApiError,
    handlers::{ok, ok_message},
    models::{CreatePaymentRequest, Payment, UpdatePaymentRequest},
    paginate::{Page, PageQuery, paginate},
    policy::{ScopedResource, scope_for},
    query::{Record, ScopedQuery},
};

/// PaymentFilter
///
/// Resource-specific query parameters for payment listings.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct PaymentFilter {
    pub method: Option<String>,
    pub amount: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// list_payments
///
/// [Authenticated Route] Lists payments under the caller's scope. Agents are
/// denied the payments resource entirely (403 via the role policy); office
/// admins see their office, super-admins everything.
#[utoipa::path(
    get,
    path = "/api/payments",
    params(PageQuery, PaymentFilter),
    responses(
        (status = 200, description = "Paginated payments"),
        (status = 403, description = "Agents cannot access payments")
    )
)]
pub async fn list_payments(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Query(page_query): Query<PageQuery>,
    Query(filter): Query<PaymentFilter>,
) -> Result<Page<Payment>, ApiError> {
    let scope = scope_for(&claims, ScopedResource::Payments)?;
    let predicate = ScopedQuery::new(scope)
        .eq_text_opt("method", filter.method)
        .eq_amount("amount", filter.amount)?
        .date_range("date", filter.start_date, filter.end_date)
        .search(page_query.search.as_deref(), Payment::SEARCH_FIELDS)
        .build();

    paginate(state.repo.payments(), &predicate, &page_query, &state.config).await
}

/// get_payment
///
/// [Authenticated Route] Retrieves one payment by id, under scope.
#[utoipa::path(
    get,
    path = "/api/payments/{id}",
    params(("id" = Uuid, Path, description = "Payment ID")),
    responses(
        (status = 200, description = "Found"),
        (status = 403, description = "Agents cannot access payments"),
        (status = 404, description = "Not found or out of scope")
    )
)]
pub async fn get_payment(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let scope = scope_for(&claims, ScopedResource::Payments)?;
    let predicate = ScopedQuery::new(scope).id(id).build();

    let payment = state
        .repo
        .payments()
        .find_one(&predicate)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(ok(payment))
}

/// create_payment
///
/// [Authenticated Route] Records a new payment, stamped with the caller's
/// office and email. The role policy has already rejected agents at this point.
#[utoipa::path(
    post,
    path = "/api/payments",
    request_body = CreatePaymentRequest,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Validation failure"),
        (status = 403, description = "Agents cannot access payments")
    )
)]
pub async fn create_payment(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreatePaymentRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    scope_for(&claims, ScopedResource::Payments)?;
    payload.validate()?;

    let payment = Payment {
        id: Uuid::new_v4(),
        office_id: claims.office_id.clone(),
        created_by: claims.email.clone(),
        date: payload.date,
        amount: payload.amount,
        method: payload.method,
        remarks: payload.remarks,
        created_at: Utc::now(),
    };

    let created = state.repo.insert_payment(payment).await?;
    Ok((StatusCode::CREATED, ok(created)))
}

/// update_payment
///
/// [Authenticated Route] Partial update under scope; out-of-scope ids are 404.
#[utoipa::path(
    put,
    path = "/api/payments/{id}",
    params(("id" = Uuid, Path, description = "Payment ID")),
    request_body = UpdatePaymentRequest,
    responses(
        (status = 200, description = "Updated"),
        (status = 404, description = "Not found or out of scope")
    )
)]
pub async fn update_payment(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePaymentRequest>,
) -> Result<Json<Value>, ApiError> {
    payload.validate()?;

    let scope = scope_for(&claims, ScopedResource::Payments)?;
    let predicate = ScopedQuery::new(scope).id(id).build();
    state
        .repo
        .payments()
        .find_one(&predicate)
        .await?
        .ok_or(ApiError::NotFound)?;

    let updated = state
        .repo
        .update_payment(id, payload)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(ok(updated))
}

/// delete_payment
///
/// [Authenticated Route] Deletes a payment under scope.
#[utoipa::path(
    delete,
    path = "/api/payments/{id}",
    params(("id" = Uuid, Path, description = "Payment ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not found or out of scope")
    )
)]
pub async fn delete_payment(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let scope = scope_for(&claims, ScopedResource::Payments)?;
    let predicate = ScopedQuery::new(scope).id(id).build();
    state
        .repo
        .payments()
        .find_one(&predicate)
        .await?
        .ok_or(ApiError::NotFound)?;

    if !state.repo.delete_payment(id).await? {
        return Err(ApiError::NotFound);
    }

    Ok(ok_message("Payment deleted successfully"))
}
