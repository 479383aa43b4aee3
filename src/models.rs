use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::ApiError,
    query::{FieldValue, Record},
};

// --- Closed role / status enumerations ---

/// Role
///
/// The three-tier privilege hierarchy, as a closed enumeration rather than the
/// wire strings, so every policy decision is an exhaustive match. Wire values
/// are kept for API and storage compatibility: "sales" (agent), "admin"
/// (office admin), "super-admin".
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, TS, ToSchema, Default,
)]
#[ts(export)]
pub enum Role {
    /// A sales agent: sees only records they created themselves.
    #[default]
    #[serde(rename = "sales")]
    #[sqlx(rename = "sales")]
    Agent,
    /// An office administrator: sees every record belonging to their office.
    #[serde(rename = "admin")]
    #[sqlx(rename = "admin")]
    OfficeAdmin,
    /// Unrestricted access across all offices.
    #[serde(rename = "super-admin")]
    #[sqlx(rename = "super-admin")]
    SuperAdmin,
}

/// AccountStatus
///
/// Lifecycle state of an account. Anything other than `Active` denies every
/// operation regardless of role.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, TS, ToSchema, Default,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
#[ts(export)]
pub enum AccountStatus {
    #[default]
    Active,
    Inactive,
    Suspended,
}

// --- Domain value constants ---

pub const ACCOUNT_TYPES: &[&str] = &["Credit", "Cash"];
pub const PAYMENT_METHODS: &[&str] = &["Cash", "Bank", "Cheque", "Card", "Online"];
pub const POST_STATUSES: &[&str] = &["Draft", "Posted"];
pub const PAYMENT_STATUSES: &[&str] = &["Pending", "Paid", "Due", "Refunded"];
pub const RECORD_STATUSES: &[&str] = &["Active", "Inactive"];

// --- Core application schemas (mapped to database tables) ---

/// Account
///
/// A user account, keyed by email. Read by the login and refresh flows and by
/// the privileged middlewares; mutated only through the super-admin surface.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Account {
    /// Unique key and token subject.
    pub email: String,
    pub name: String,
    pub role: Role,
    /// Tenant boundary. Immutable after creation.
    pub office_id: String,
    pub status: AccountStatus,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// Sale
///
/// A ticket sale record. Office-scoped: agents reach only their own sales,
/// office admins their office's, super-admins everything.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Sale {
    pub id: Uuid,
    pub office_id: String,
    /// Email of the issuing agent. The agent-role scope key.
    pub created_by: String,
    #[ts(type = "string")]
    pub date: NaiveDate,
    pub document_number: String,
    pub rv_number: Option<String>,
    pub passenger_name: String,
    pub supplier_name: String,
    pub airline_code: String,
    pub sector: Option<String>,
    pub sell_price: f64,
    pub buying_price: f64,
    /// One of `ACCOUNT_TYPES`.
    pub account_type: String,
    /// One of `POST_STATUSES`.
    pub post_status: String,
    /// One of `PAYMENT_STATUSES`.
    pub payment_status: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// Payment
///
/// An office payment record. Agents are forbidden outright; office admins see
/// their office, super-admins everything.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Payment {
    pub id: Uuid,
    pub office_id: String,
    pub created_by: String,
    #[ts(type = "string")]
    pub date: NaiveDate,
    pub amount: f64,
    /// One of `PAYMENT_METHODS`.
    pub method: String,
    pub remarks: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// Supplier
///
/// Office-shared reference data: both agents and office admins are scoped to
/// their own office's suppliers.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Supplier {
    pub id: Uuid,
    pub office_id: String,
    pub created_by: String,
    pub supplier_name: String,
    /// One of `ACCOUNT_TYPES`.
    pub account_type: String,
    /// One of `RECORD_STATUSES`.
    pub status: String,
    pub total_due: f64,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// Airline
///
/// Global reference data, visible to every authenticated caller; writes are
/// gated behind the admin router.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Airline {
    pub id: Uuid,
    pub airline_name: String,
    pub iata_name: String,
    pub airline_code: String,
    /// One of `RECORD_STATUSES`.
    pub status: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

// --- Record capability implementations ---

impl Record for Sale {
    const TABLE: &'static str = "sales";
    const SORTABLE: &'static [&'static str] = &[
        "date",
        "created_at",
        "sell_price",
        "buying_price",
        "document_number",
        "passenger_name",
        "supplier_name",
    ];
    const DEFAULT_SORT: &'static str = "-date";
    const DEFAULT_PAGE_SIZE: Option<i64> = Some(25);
    const SEARCH_FIELDS: &'static [&'static str] = &[
        "document_number",
        "passenger_name",
        "supplier_name",
        "rv_number",
        "sector",
        "airline_code",
    ];

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(FieldValue::Id(self.id)),
            "office_id" => Some(FieldValue::Text(self.office_id.clone())),
            "created_by" => Some(FieldValue::Text(self.created_by.clone())),
            "date" => Some(FieldValue::Date(self.date)),
            "document_number" => Some(FieldValue::Text(self.document_number.clone())),
            "rv_number" => self.rv_number.clone().map(FieldValue::Text),
            "passenger_name" => Some(FieldValue::Text(self.passenger_name.clone())),
            "supplier_name" => Some(FieldValue::Text(self.supplier_name.clone())),
            "airline_code" => Some(FieldValue::Text(self.airline_code.clone())),
            "sector" => self.sector.clone().map(FieldValue::Text),
            "sell_price" => Some(FieldValue::Number(self.sell_price)),
            "buying_price" => Some(FieldValue::Number(self.buying_price)),
            "account_type" => Some(FieldValue::Text(self.account_type.clone())),
            "post_status" => Some(FieldValue::Text(self.post_status.clone())),
            "payment_status" => Some(FieldValue::Text(self.payment_status.clone())),
            "created_at" => Some(FieldValue::Timestamp(self.created_at)),
            _ => None,
        }
    }
}

impl Record for Payment {
    const TABLE: &'static str = "payments";
    const SORTABLE: &'static [&'static str] = &["date", "created_at", "amount", "method"];
    const DEFAULT_SORT: &'static str = "-created_at";
    const SEARCH_FIELDS: &'static [&'static str] = &["method", "remarks"];

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(FieldValue::Id(self.id)),
            "office_id" => Some(FieldValue::Text(self.office_id.clone())),
            "created_by" => Some(FieldValue::Text(self.created_by.clone())),
            "date" => Some(FieldValue::Date(self.date)),
            "amount" => Some(FieldValue::Number(self.amount)),
            "method" => Some(FieldValue::Text(self.method.clone())),
            "remarks" => self.remarks.clone().map(FieldValue::Text),
            "created_at" => Some(FieldValue::Timestamp(self.created_at)),
            _ => None,
        }
    }
}

impl Record for Supplier {
    const TABLE: &'static str = "suppliers";
    const SORTABLE: &'static [&'static str] =
        &["supplier_name", "created_at", "total_due", "status"];
    const DEFAULT_SORT: &'static str = "supplier_name";
    const SEARCH_FIELDS: &'static [&'static str] = &["supplier_name", "account_type"];

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(FieldValue::Id(self.id)),
            "office_id" => Some(FieldValue::Text(self.office_id.clone())),
            "created_by" => Some(FieldValue::Text(self.created_by.clone())),
            "supplier_name" => Some(FieldValue::Text(self.supplier_name.clone())),
            "account_type" => Some(FieldValue::Text(self.account_type.clone())),
            "status" => Some(FieldValue::Text(self.status.clone())),
            "total_due" => Some(FieldValue::Number(self.total_due)),
            "created_at" => Some(FieldValue::Timestamp(self.created_at)),
            _ => None,
        }
    }
}

impl Record for Airline {
    const TABLE: &'static str = "airlines";
    const SORTABLE: &'static [&'static str] =
        &["airline_name", "airline_code", "iata_name", "created_at"];
    const DEFAULT_SORT: &'static str = "airline_name";
    const SEARCH_FIELDS: &'static [&'static str] = &["airline_name", "iata_name", "airline_code"];

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(FieldValue::Id(self.id)),
            "airline_name" => Some(FieldValue::Text(self.airline_name.clone())),
            "iata_name" => Some(FieldValue::Text(self.iata_name.clone())),
            "airline_code" => Some(FieldValue::Text(self.airline_code.clone())),
            "status" => Some(FieldValue::Text(self.status.clone())),
            "created_at" => Some(FieldValue::Timestamp(self.created_at)),
            _ => None,
        }
    }
}

// --- Request payloads (input schemas) ---

/// LoginRequest
///
/// Input for POST /api/auth/login. Identity is email-based; credential checks
/// happen upstream of this service.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
}

/// RefreshRequest
///
/// Input for POST /api/auth/refresh: the old (possibly expired) token.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct RefreshRequest {
    pub token: String,
}

/// CreateSaleRequest
///
/// Input payload for submitting a new sale. `created_by` and `office_id` are
/// never accepted from the client — they are stamped from the caller's claims.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateSaleRequest {
    #[ts(type = "string")]
    pub date: NaiveDate,
    pub document_number: String,
    pub rv_number: Option<String>,
    pub passenger_name: String,
    pub supplier_name: String,
    pub airline_code: String,
    pub sector: Option<String>,
    pub sell_price: f64,
    pub buying_price: f64,
    pub account_type: Option<String>,
    pub post_status: Option<String>,
    pub payment_status: Option<String>,
    /// When true the sale is posted immediately instead of saved as a draft.
    #[serde(default)]
    pub save_and_post: bool,
}

impl CreateSaleRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.document_number.trim().is_empty() {
            return Err(ApiError::Validation("Document number is required".into()));
        }
        validate_amount("sellPrice", Some(self.sell_price))?;
        validate_amount("buyingPrice", Some(self.buying_price))?;
        validate_choice("account type", self.account_type.as_deref(), ACCOUNT_TYPES)?;
        validate_choice("post status", self.post_status.as_deref(), POST_STATUSES)?;
        validate_choice(
            "payment status",
            self.payment_status.as_deref(),
            PAYMENT_STATUSES,
        )?;
        Ok(())
    }
}

/// UpdateSaleRequest
///
/// Partial update payload; only supplied fields change. Ownership fields
/// (`created_by`, `office_id`) and the creation timestamp are not updatable.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateSaleRequest {
    #[ts(type = "string")]
    pub date: Option<NaiveDate>,
    pub document_number: Option<String>,
    pub rv_number: Option<String>,
    pub passenger_name: Option<String>,
    pub supplier_name: Option<String>,
    pub airline_code: Option<String>,
    pub sector: Option<String>,
    pub sell_price: Option<f64>,
    pub buying_price: Option<f64>,
    pub account_type: Option<String>,
    pub post_status: Option<String>,
    pub payment_status: Option<String>,
}

impl UpdateSaleRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        validate_amount("sellPrice", self.sell_price)?;
        validate_amount("buyingPrice", self.buying_price)?;
        validate_choice("account type", self.account_type.as_deref(), ACCOUNT_TYPES)?;
        validate_choice("post status", self.post_status.as_deref(), POST_STATUSES)?;
        validate_choice(
            "payment status",
            self.payment_status.as_deref(),
            PAYMENT_STATUSES,
        )?;
        Ok(())
    }
}

/// CreatePaymentRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreatePaymentRequest {
    #[ts(type = "string")]
    pub date: NaiveDate,
    pub amount: f64,
    pub method: String,
    pub remarks: Option<String>,
}

impl CreatePaymentRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        validate_amount("amount", Some(self.amount))?;
        validate_choice("payment method", Some(self.method.as_str()), PAYMENT_METHODS)?;
        Ok(())
    }
}

/// UpdatePaymentRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdatePaymentRequest {
    #[ts(type = "string")]
    pub date: Option<NaiveDate>,
    pub amount: Option<f64>,
    pub method: Option<String>,
    pub remarks: Option<String>,
}

impl UpdatePaymentRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        validate_amount("amount", self.amount)?;
        validate_choice("payment method", self.method.as_deref(), PAYMENT_METHODS)?;
        Ok(())
    }
}

/// CreateSupplierRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateSupplierRequest {
    pub supplier_name: String,
    pub account_type: String,
    pub total_due: Option<f64>,
}

impl CreateSupplierRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.supplier_name.trim().is_empty() {
            return Err(ApiError::Validation("Supplier name is required".into()));
        }
        validate_choice(
            "account type",
            Some(self.account_type.as_str()),
            ACCOUNT_TYPES,
        )?;
        validate_amount("totalDue", self.total_due)?;
        Ok(())
    }
}

/// UpdateSupplierRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateSupplierRequest {
    pub supplier_name: Option<String>,
    pub account_type: Option<String>,
    pub status: Option<String>,
    pub total_due: Option<f64>,
}

impl UpdateSupplierRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        validate_choice("account type", self.account_type.as_deref(), ACCOUNT_TYPES)?;
        validate_choice("status", self.status.as_deref(), RECORD_STATUSES)?;
        validate_amount("totalDue", self.total_due)?;
        Ok(())
    }
}

/// CreateAirlineRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateAirlineRequest {
    pub airline_name: String,
    pub iata_name: String,
    pub airline_code: String,
}

impl CreateAirlineRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.airline_name.trim().is_empty() || self.airline_code.trim().is_empty() {
            return Err(ApiError::Validation(
                "Airline name and code are required".into(),
            ));
        }
        Ok(())
    }
}

/// UpdateAirlineRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateAirlineRequest {
    pub airline_name: Option<String>,
    pub iata_name: Option<String>,
    pub airline_code: Option<String>,
    pub status: Option<String>,
}

impl UpdateAirlineRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        validate_choice("status", self.status.as_deref(), RECORD_STATUSES)?;
        Ok(())
    }
}

/// CreateAccountRequest
///
/// Super-admin only: provisions a new user account.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateAccountRequest {
    pub email: String,
    pub name: String,
    pub role: Role,
    pub office_id: String,
}

/// UpdateAccountStatusRequest
///
/// Super-admin only: the single mutable account field from this API.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateAccountStatusRequest {
    pub status: AccountStatus,
}

/// SaleStats
///
/// Aggregate figures for the sales dashboard, computed under the caller's scope.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleStats {
    pub total: i64,
    pub posted: i64,
    pub paid: i64,
    pub total_sell_price: f64,
    pub total_buying_price: f64,
    pub total_profit: f64,
}

// --- Validation helpers ---

fn validate_amount(label: &'static str, value: Option<f64>) -> Result<(), ApiError> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(ApiError::InvalidFilterValue(label)),
        _ => Ok(()),
    }
}

fn validate_choice(
    label: &str,
    value: Option<&str>,
    allowed: &[&str],
) -> Result<(), ApiError> {
    match value {
        Some(v) if !allowed.contains(&v) => {
            Err(ApiError::Validation(format!("Invalid {label}: {v}")))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_wire_strings_round_trip() {
        assert_eq!(serde_json::to_string(&Role::Agent).unwrap(), r#""sales""#);
        assert_eq!(
            serde_json::to_string(&Role::OfficeAdmin).unwrap(),
            r#""admin""#
        );
        assert_eq!(
            serde_json::to_string(&Role::SuperAdmin).unwrap(),
            r#""super-admin""#
        );
        let parsed: Role = serde_json::from_str(r#""super-admin""#).unwrap();
        assert_eq!(parsed, Role::SuperAdmin);
    }

    #[test]
    fn sale_rejects_negative_prices() {
        let request = CreateSaleRequest {
            document_number: "DOC-1".into(),
            sell_price: -10.0,
            ..Default::default()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn sale_rejects_unknown_post_status() {
        let request = CreateSaleRequest {
            document_number: "DOC-1".into(),
            post_status: Some("Archived".into()),
            ..Default::default()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn payment_rejects_unknown_method() {
        let request = CreatePaymentRequest {
            amount: 100.0,
            method: "Barter".into(),
            ..Default::default()
        };
        assert!(request.validate().is_err());
    }
}
