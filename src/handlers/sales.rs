use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{Value, json};
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    AppState,
    auth::AuthUser,
    error::ApiError,
    handlers::{ok, ok_message},
    models::{CreateSaleRequest, Sale, SaleStats, UpdateSaleRequest},
    paginate::{Page, PageQuery, paginate},
    policy::{ScopedResource, scope_for},
    query::{Predicate, Record, ScopedQuery, Sort},
};

/// SaleFilter
///
/// Resource-specific query parameters for sale listings, bound alongside the
/// shared `PageQuery`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct SaleFilter {
    pub post_status: Option<String>,
    pub payment_status: Option<String>,
    pub account_type: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// StatsQuery
///
/// Optional date window for the sales statistics endpoint.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct StatsQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// DocumentQuery
///
/// Input for the document-number availability probe.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct DocumentQuery {
    pub document_number: String,
}

/// list_sales
///
/// [Authenticated Route] Lists sales under the caller's scope with filtering,
/// search and pagination. Agents see only their own sales, office admins their
/// office's, super-admins everything.
#[utoipa::path(
    get,
    path = "/api/sales",
    params(PageQuery, SaleFilter),
    responses((status = 200, description = "Paginated sales"))
)]
pub async fn list_sales(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Query(page_query): Query<PageQuery>,
    Query(filter): Query<SaleFilter>,
) -> Result<Page<Sale>, ApiError> {
    let scope = scope_for(&claims, ScopedResource::Sales)?;
    let predicate = ScopedQuery::new(scope)
        .eq_text_opt("post_status", filter.post_status)
        .eq_text_opt("payment_status", filter.payment_status)
        .eq_text_opt("account_type", filter.account_type)
        .date_range("date", filter.start_date, filter.end_date)
        .search(page_query.search.as_deref(), Sale::SEARCH_FIELDS)
        .build();

    paginate(state.repo.sales(), &predicate, &page_query, &state.config).await
}

/// get_sale
///
/// [Authenticated Route] Retrieves a single sale by id, under scope. A sale
/// outside the caller's scope is indistinguishable from a missing one (404).
#[utoipa::path(
    get,
    path = "/api/sales/{id}",
    params(("id" = Uuid, Path, description = "Sale ID")),
    responses(
        (status = 200, description = "Found"),
        (status = 404, description = "Not found or out of scope")
    )
)]
pub async fn get_sale(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let scope = scope_for(&claims, ScopedResource::Sales)?;
    let predicate = ScopedQuery::new(scope).id(id).build();

    let sale = state
        .repo
        .sales()
        .find_one(&predicate)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(ok(sale))
}

/// create_sale
///
/// [Authenticated Route] Records a new sale. `created_by` and `office_id` are
/// stamped from the caller's claims, never accepted from the payload, so a sale
/// is always anchored to the office and agent that produced it.
#[utoipa::path(
    post,
    path = "/api/sales",
    request_body = CreateSaleRequest,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Validation failure")
    )
)]
pub async fn create_sale(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateSaleRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    payload.validate()?;

    let post_status = if payload.save_and_post {
        "Posted".to_string()
    } else {
        payload.post_status.unwrap_or_else(|| "Draft".to_string())
    };

    let sale = Sale {
        id: Uuid::new_v4(),
        office_id: claims.office_id.clone(),
        created_by: claims.email.clone(),
        date: payload.date,
        document_number: payload.document_number,
        rv_number: payload.rv_number,
        passenger_name: payload.passenger_name,
        supplier_name: payload.supplier_name,
        airline_code: payload.airline_code,
        sector: payload.sector,
        sell_price: payload.sell_price,
        buying_price: payload.buying_price,
        account_type: payload.account_type.unwrap_or_else(|| "Cash".to_string()),
        post_status,
        payment_status: payload
            .payment_status
            .unwrap_or_else(|| "Pending".to_string()),
        created_at: Utc::now(),
    };

    let created = state.repo.insert_sale(sale).await?;
    Ok((StatusCode::CREATED, ok(created)))
}

/// update_sale
///
/// [Authenticated Route] Partial update of a sale. The scoped existence check
/// runs first, so out-of-scope updates surface as 404 before any write.
#[utoipa::path(
    put,
    path = "/api/sales/{id}",
    params(("id" = Uuid, Path, description = "Sale ID")),
    request_body = UpdateSaleRequest,
    responses(
        (status = 200, description = "Updated"),
        (status = 404, description = "Not found or out of scope")
    )
)]
pub async fn update_sale(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSaleRequest>,
) -> Result<Json<Value>, ApiError> {
    payload.validate()?;

    let scope = scope_for(&claims, ScopedResource::Sales)?;
    let predicate = ScopedQuery::new(scope).id(id).build();
    state
        .repo
        .sales()
        .find_one(&predicate)
        .await?
        .ok_or(ApiError::NotFound)?;

    let updated = state
        .repo
        .update_sale(id, payload)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(ok(updated))
}

/// delete_sale
///
/// [Authenticated Route] Deletes a sale under scope; same 404 posture as update.
#[utoipa::path(
    delete,
    path = "/api/sales/{id}",
    params(("id" = Uuid, Path, description = "Sale ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not found or out of scope")
    )
)]
pub async fn delete_sale(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let scope = scope_for(&claims, ScopedResource::Sales)?;
    let predicate = ScopedQuery::new(scope).id(id).build();
    state
        .repo
        .sales()
        .find_one(&predicate)
        .await?
        .ok_or(ApiError::NotFound)?;

    if !state.repo.delete_sale(id).await? {
        return Err(ApiError::NotFound);
    }

    Ok(ok_message("Sale deleted successfully"))
}

/// sale_stats
///
/// [Authenticated Route] Aggregate counters for the dashboard, computed under
/// the caller's scope and an optional date window. All counts observe the same
/// base predicate.
#[utoipa::path(
    get,
    path = "/api/sales/stats",
    params(StatsQuery),
    responses((status = 200, description = "Sales statistics"))
)]
pub async fn sale_stats(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Query(window): Query<StatsQuery>,
) -> Result<Json<Value>, ApiError> {
    let scope = scope_for(&claims, ScopedResource::Sales)?;
    let base = ScopedQuery::new(scope).date_range("date", window.start_date, window.end_date);

    let all = base.clone().build();
    let posted = base.clone().eq_text("post_status", "Posted").build();
    let paid = base.eq_text("payment_status", "Paid").build();

    let total = state.repo.sales().count(&all).await?;
    let posted = state.repo.sales().count(&posted).await?;
    let paid = state.repo.sales().count(&paid).await?;
    let (total_sell_price, total_buying_price) = state.repo.sale_totals(&all).await?;

    Ok(ok(SaleStats {
        total,
        posted,
        paid,
        total_sell_price,
        total_buying_price,
        total_profit: total_sell_price - total_buying_price,
    }))
}

/// validate_document
///
/// [Authenticated Route] Checks whether a document number is already taken and
/// proposes the next RV (receipt voucher) number. The existence probe is
/// deliberately unscoped: document numbers are unique across offices.
#[utoipa::path(
    get,
    path = "/api/sales/validate-document",
    params(DocumentQuery),
    responses((status = 200, description = "Availability and next RV number"))
)]
pub async fn validate_document(
    _user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<DocumentQuery>,
) -> Result<Json<Value>, ApiError> {
    let exists = state
        .repo
        .sales()
        .find_one(
            &ScopedQuery::unscoped()
                .eq_text("document_number", query.document_number)
                .build(),
        )
        .await?
        .is_some();

    let latest = state
        .repo
        .sales()
        .find_many(
            &Predicate::default(),
            &Sort {
                field: "created_at",
                descending: true,
            },
            0,
            1,
        )
        .await?;

    let next_rv = next_rv_number(latest.first().and_then(|s| s.rv_number.as_deref()));

    Ok(Json(json!({
        "success": true,
        "exists": exists,
        "message": if exists {
            "Document number already exists"
        } else {
            "Document number is available"
        },
        "lastRVNumber": next_rv,
    })))
}

/// Next voucher number in the `RV-0001` sequence.
fn next_rv_number(last: Option<&str>) -> String {
    let last_number = last
        .and_then(|rv| rv.strip_prefix("RV-"))
        .and_then(|digits| digits.parse::<u32>().ok())
        .unwrap_or(0);
    format!("RV-{:04}", last_number + 1)
}

#[cfg(test)]
mod tests {
    use super::next_rv_number;

    #[test]
    fn rv_sequence_starts_at_one() {
        assert_eq!(next_rv_number(None), "RV-0001");
        assert_eq!(next_rv_number(Some("garbage")), "RV-0001");
    }

    #[test]
    fn rv_sequence_increments() {
        assert_eq!(next_rv_number(Some("RV-0041")), "RV-0042");
        assert_eq!(next_rv_number(Some("RV-9999")), "RV-10000");
    }
}
