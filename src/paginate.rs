use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};

use crate::{
    config::AppConfig,
    error::ApiError,
    query::{Predicate, Record, Sort},
    repository::RecordSet,
};

/// PageQuery
///
/// The pagination-related query parameters shared by every list endpoint.
/// Resource-specific filters are separate structs in the handler modules.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct PageQuery {
    /// 1-based page number. Absent or non-positive values fall back to 1.
    pub page: Option<i64>,
    /// Page size. Falls back to the resource's override or the configured
    /// default, capped at the configured maximum.
    pub limit: Option<i64>,
    /// Sort field, `-` prefix for descending. Must be a sortable field.
    pub sort: Option<String>,
    /// Free-text search term, matched across the resource's search fields.
    pub search: Option<String>,
}

/// PageMeta
///
/// Pagination metadata returned alongside every list response.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PageMeta {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

/// Page
///
/// One page of records plus metadata. Transient: recomputed on every request,
/// never persisted. Serializes directly into the standard list envelope.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: PageMeta,
}

impl<T: Serialize> IntoResponse for Page<T> {
    fn into_response(self) -> Response {
        Json(json!({
            "success": true,
            "data": self.data,
            "pagination": self.pagination,
        }))
        .into_response()
    }
}

/// paginate
///
/// Executes a scoped, sorted, paginated listing: one count and one bounded fetch
/// against the same predicate. Works for any record type via its `Record`
/// constants — there is no per-entity pagination code anywhere else.
///
/// The count and the fetch are two independent store calls with no transaction
/// around them; under concurrent writes the `total` and the returned page may be
/// mutually stale by a write or two. That drift is accepted, not corrected.
pub async fn paginate<T: Record>(
    records: &dyn RecordSet<T>,
    predicate: &Predicate,
    query: &PageQuery,
    config: &AppConfig,
) -> Result<Page<T>, ApiError> {
    let sort = Sort::parse::<T>(query.sort.as_deref())?;

    let page = query.page.filter(|p| *p > 0).unwrap_or(1);
    let limit = query
        .limit
        .filter(|l| *l > 0)
        .or(T::DEFAULT_PAGE_SIZE)
        .unwrap_or(config.default_page_size)
        .min(config.max_page_size);
    // A huge page number must saturate into an empty page, never overflow.
    let skip = (page - 1).saturating_mul(limit);

    let total = records.count(predicate).await?;
    let data = records.find_many(predicate, &sort, skip, limit).await?;

    let total_pages = if total == 0 { 0 } else { (total + limit - 1) / limit };

    Ok(Page {
        data,
        pagination: PageMeta {
            page,
            limit,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        },
    })
}
