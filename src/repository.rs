use async_trait::async_trait;
use sqlx::{PgPool, Postgres, postgres::PgRow, query_builder::QueryBuilder};
use std::marker::PhantomData;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::StoreError,
    models::{
        Account, AccountStatus, Airline, Payment, Sale, Supplier, UpdateAirlineRequest,
        UpdatePaymentRequest, UpdateSaleRequest, UpdateSupplierRequest,
    },
    query::{Clause, FieldValue, Predicate, Record, Sort},
};

/// RecordSet
///
/// The read capability the pagination engine is parameterized over: a count and
/// a bounded fetch, plus a single-record probe, all observing the same
/// `Predicate`. There is one implementation per backing store, not per record
/// type — `PgRecords<T>` below covers every `Record` generically.
#[async_trait]
pub trait RecordSet<T>: Send + Sync {
    async fn count(&self, predicate: &Predicate) -> Result<i64, StoreError>;
    async fn find_many(
        &self,
        predicate: &Predicate,
        sort: &Sort,
        skip: i64,
        take: i64,
    ) -> Result<Vec<T>, StoreError>;
    async fn find_one(&self, predicate: &Predicate) -> Result<Option<T>, StoreError>;
}

/// Repository
///
/// The abstract persistence contract, following the Repository pattern: handlers
/// interact with this trait object and never see the concrete store. Reads on
/// scoped resources go through the generic `RecordSet` accessors so the
/// predicate semantics are identical for every record type; writes are
/// per-entity because their column sets differ.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Generic scoped reads ---
    fn sales(&self) -> &dyn RecordSet<Sale>;
    fn payments(&self) -> &dyn RecordSet<Payment>;
    fn suppliers(&self) -> &dyn RecordSet<Supplier>;
    fn airlines(&self) -> &dyn RecordSet<Airline>;

    // --- Accounts ---
    async fn find_account(&self, email: &str) -> Result<Option<Account>, StoreError>;
    async fn list_accounts(&self) -> Result<Vec<Account>, StoreError>;
    async fn create_account(&self, account: Account) -> Result<Account, StoreError>;
    async fn set_account_status(
        &self,
        email: &str,
        status: AccountStatus,
    ) -> Result<Option<Account>, StoreError>;

    // --- Sales writes ---
    async fn insert_sale(&self, sale: Sale) -> Result<Sale, StoreError>;
    async fn update_sale(
        &self,
        id: Uuid,
        patch: UpdateSaleRequest,
    ) -> Result<Option<Sale>, StoreError>;
    async fn delete_sale(&self, id: Uuid) -> Result<bool, StoreError>;
    /// Summed sell/buying prices under the given predicate.
    async fn sale_totals(&self, predicate: &Predicate) -> Result<(f64, f64), StoreError>;

    // --- Payment writes ---
    async fn insert_payment(&self, payment: Payment) -> Result<Payment, StoreError>;
    async fn update_payment(
        &self,
        id: Uuid,
        patch: UpdatePaymentRequest,
    ) -> Result<Option<Payment>, StoreError>;
    async fn delete_payment(&self, id: Uuid) -> Result<bool, StoreError>;

    // --- Supplier writes ---
    async fn insert_supplier(&self, supplier: Supplier) -> Result<Supplier, StoreError>;
    async fn update_supplier(
        &self,
        id: Uuid,
        patch: UpdateSupplierRequest,
    ) -> Result<Option<Supplier>, StoreError>;
    async fn delete_supplier(&self, id: Uuid) -> Result<bool, StoreError>;

    // --- Airline writes ---
    async fn insert_airline(&self, airline: Airline) -> Result<Airline, StoreError>;
    async fn update_airline(
        &self,
        id: Uuid,
        patch: UpdateAirlineRequest,
    ) -> Result<Option<Airline>, StoreError>;
    async fn delete_airline(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

// --- SQL rendering for predicates ---

/// Renders a predicate as a `WHERE` clause. Field names come from `&'static str`
/// constants in this crate (never from the caller), so they are pushed verbatim;
/// every value goes through a bind parameter.
fn push_predicate(builder: &mut QueryBuilder<'_, Postgres>, predicate: &Predicate) {
    if predicate.clauses.is_empty() {
        return;
    }

    builder.push(" WHERE ");
    for (i, clause) in predicate.clauses.iter().enumerate() {
        if i > 0 {
            builder.push(" AND ");
        }
        match clause {
            Clause::Eq { field, value } => {
                builder.push(*field);
                builder.push(" = ");
                push_value(builder, value);
            }
            Clause::DateRange { field, from, to } => {
                builder.push("(");
                let mut bound = false;
                if let Some(from) = from {
                    builder.push(*field);
                    builder.push(" >= ");
                    builder.push_bind(*from);
                    bound = true;
                }
                if let Some(to) = to {
                    if bound {
                        builder.push(" AND ");
                    }
                    builder.push(*field);
                    builder.push(" <= ");
                    builder.push_bind(*to);
                }
                builder.push(")");
            }
            Clause::Search { term, fields } => {
                let pattern = format!("%{}%", term);
                builder.push("(");
                for (j, field) in fields.iter().enumerate() {
                    if j > 0 {
                        builder.push(" OR ");
                    }
                    builder.push(*field);
                    builder.push(" ILIKE ");
                    builder.push_bind(pattern.clone());
                }
                builder.push(")");
            }
        }
    }
}

fn push_value(builder: &mut QueryBuilder<'_, Postgres>, value: &FieldValue) {
    match value {
        FieldValue::Text(v) => builder.push_bind(v.clone()),
        FieldValue::Number(v) => builder.push_bind(*v),
        FieldValue::Date(v) => builder.push_bind(*v),
        FieldValue::Timestamp(v) => builder.push_bind(*v),
        FieldValue::Id(v) => builder.push_bind(*v),
    };
}

/// PgRecords
///
/// The generic Postgres `RecordSet`: one implementation serving every record
/// type via its `Record` constants. Queries are built with `QueryBuilder` and
/// checked at runtime, so no live database is needed to compile the crate.
pub struct PgRecords<T> {
    pool: PgPool,
    _record: PhantomData<T>,
}

impl<T> PgRecords<T> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _record: PhantomData,
        }
    }
}

#[async_trait]
impl<T> RecordSet<T> for PgRecords<T>
where
    T: Record + for<'r> sqlx::FromRow<'r, PgRow>,
{
    async fn count(&self, predicate: &Predicate) -> Result<i64, StoreError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT COUNT(*) FROM {}", T::TABLE));
        push_predicate(&mut builder, predicate);

        let total = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    async fn find_many(
        &self,
        predicate: &Predicate,
        sort: &Sort,
        skip: i64,
        take: i64,
    ) -> Result<Vec<T>, StoreError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT * FROM {}", T::TABLE));
        push_predicate(&mut builder, predicate);

        // The sort field was validated against T::SORTABLE, so it is safe to splice.
        builder.push(format!(
            " ORDER BY {} {}",
            sort.field,
            if sort.descending { "DESC" } else { "ASC" }
        ));
        builder.push(" LIMIT ");
        builder.push_bind(take);
        builder.push(" OFFSET ");
        builder.push_bind(skip);

        let rows = builder.build_query_as::<T>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn find_one(&self, predicate: &Predicate) -> Result<Option<T>, StoreError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT * FROM {}", T::TABLE));
        push_predicate(&mut builder, predicate);
        builder.push(" LIMIT 1");

        let row = builder
            .build_query_as::<T>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}

/// PostgresRepository
///
/// The concrete `Repository`, backed by a shared PostgreSQL connection pool.
pub struct PostgresRepository {
    pool: PgPool,
    sales: PgRecords<Sale>,
    payments: PgRecords<Payment>,
    suppliers: PgRecords<Supplier>,
    airlines: PgRecords<Airline>,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            sales: PgRecords::new(pool.clone()),
            payments: PgRecords::new(pool.clone()),
            suppliers: PgRecords::new(pool.clone()),
            airlines: PgRecords::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    fn sales(&self) -> &dyn RecordSet<Sale> {
        &self.sales
    }

    fn payments(&self) -> &dyn RecordSet<Payment> {
        &self.payments
    }

    fn suppliers(&self) -> &dyn RecordSet<Supplier> {
        &self.suppliers
    }

    fn airlines(&self) -> &dyn RecordSet<Airline> {
        &self.airlines
    }

    async fn find_account(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(account)
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, StoreError> {
        let accounts =
            sqlx::query_as::<_, Account>("SELECT * FROM accounts ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;
        Ok(accounts)
    }

    async fn create_account(&self, account: Account) -> Result<Account, StoreError> {
        let created = sqlx::query_as::<_, Account>(
            r#"INSERT INTO accounts (email, name, role, office_id, status, created_at)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING *"#,
        )
        .bind(account.email)
        .bind(account.name)
        .bind(account.role)
        .bind(account.office_id)
        .bind(account.status)
        .bind(account.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn set_account_status(
        &self,
        email: &str,
        status: AccountStatus,
    ) -> Result<Option<Account>, StoreError> {
        let updated = sqlx::query_as::<_, Account>(
            "UPDATE accounts SET status = $2 WHERE email = $1 RETURNING *",
        )
        .bind(email)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn insert_sale(&self, sale: Sale) -> Result<Sale, StoreError> {
        let created = sqlx::query_as::<_, Sale>(
            r#"INSERT INTO sales
               (id, office_id, created_by, date, document_number, rv_number, passenger_name,
                supplier_name, airline_code, sector, sell_price, buying_price, account_type,
                post_status, payment_status, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
               RETURNING *"#,
        )
        .bind(sale.id)
        .bind(sale.office_id)
        .bind(sale.created_by)
        .bind(sale.date)
        .bind(sale.document_number)
        .bind(sale.rv_number)
        .bind(sale.passenger_name)
        .bind(sale.supplier_name)
        .bind(sale.airline_code)
        .bind(sale.sector)
        .bind(sale.sell_price)
        .bind(sale.buying_price)
        .bind(sale.account_type)
        .bind(sale.post_status)
        .bind(sale.payment_status)
        .bind(sale.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    /// Partial update via COALESCE: only columns whose patch field is `Some`
    /// change. Ownership columns are deliberately not part of the statement.
    async fn update_sale(
        &self,
        id: Uuid,
        patch: UpdateSaleRequest,
    ) -> Result<Option<Sale>, StoreError> {
        let updated = sqlx::query_as::<_, Sale>(
            r#"UPDATE sales SET
                 date = COALESCE($2, date),
                 document_number = COALESCE($3, document_number),
                 rv_number = COALESCE($4, rv_number),
                 passenger_name = COALESCE($5, passenger_name),
                 supplier_name = COALESCE($6, supplier_name),
                 airline_code = COALESCE($7, airline_code),
                 sector = COALESCE($8, sector),
                 sell_price = COALESCE($9, sell_price),
                 buying_price = COALESCE($10, buying_price),
                 account_type = COALESCE($11, account_type),
                 post_status = COALESCE($12, post_status),
                 payment_status = COALESCE($13, payment_status)
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(patch.date)
        .bind(patch.document_number)
        .bind(patch.rv_number)
        .bind(patch.passenger_name)
        .bind(patch.supplier_name)
        .bind(patch.airline_code)
        .bind(patch.sector)
        .bind(patch.sell_price)
        .bind(patch.buying_price)
        .bind(patch.account_type)
        .bind(patch.post_status)
        .bind(patch.payment_status)
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn delete_sale(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM sales WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn sale_totals(&self, predicate: &Predicate) -> Result<(f64, f64), StoreError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT COALESCE(SUM(sell_price), 0)::float8, COALESCE(SUM(buying_price), 0)::float8 FROM sales",
        );
        push_predicate(&mut builder, predicate);

        let totals = builder
            .build_query_as::<(f64, f64)>()
            .fetch_one(&self.pool)
            .await?;
        Ok(totals)
    }

    async fn insert_payment(&self, payment: Payment) -> Result<Payment, StoreError> {
        let created = sqlx::query_as::<_, Payment>(
            r#"INSERT INTO payments
               (id, office_id, created_by, date, amount, method, remarks, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING *"#,
        )
        .bind(payment.id)
        .bind(payment.office_id)
        .bind(payment.created_by)
        .bind(payment.date)
        .bind(payment.amount)
        .bind(payment.method)
        .bind(payment.remarks)
        .bind(payment.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update_payment(
        &self,
        id: Uuid,
        patch: UpdatePaymentRequest,
    ) -> Result<Option<Payment>, StoreError> {
        let updated = sqlx::query_as::<_, Payment>(
            r#"UPDATE payments SET
                 date = COALESCE($2, date),
                 amount = COALESCE($3, amount),
                 method = COALESCE($4, method),
                 remarks = COALESCE($5, remarks)
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(patch.date)
        .bind(patch.amount)
        .bind(patch.method)
        .bind(patch.remarks)
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn delete_payment(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM payments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_supplier(&self, supplier: Supplier) -> Result<Supplier, StoreError> {
        let created = sqlx::query_as::<_, Supplier>(
            r#"INSERT INTO suppliers
               (id, office_id, created_by, supplier_name, account_type, status, total_due, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING *"#,
        )
        .bind(supplier.id)
        .bind(supplier.office_id)
        .bind(supplier.created_by)
        .bind(supplier.supplier_name)
        .bind(supplier.account_type)
        .bind(supplier.status)
        .bind(supplier.total_due)
        .bind(supplier.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update_supplier(
        &self,
        id: Uuid,
        patch: UpdateSupplierRequest,
    ) -> Result<Option<Supplier>, StoreError> {
        let updated = sqlx::query_as::<_, Supplier>(
            r#"UPDATE suppliers SET
                 supplier_name = COALESCE($2, supplier_name),
                 account_type = COALESCE($3, account_type),
                 status = COALESCE($4, status),
                 total_due = COALESCE($5, total_due)
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(patch.supplier_name)
        .bind(patch.account_type)
        .bind(patch.status)
        .bind(patch.total_due)
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn delete_supplier(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM suppliers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_airline(&self, airline: Airline) -> Result<Airline, StoreError> {
        let created = sqlx::query_as::<_, Airline>(
            r#"INSERT INTO airlines
               (id, airline_name, iata_name, airline_code, status, created_at)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING *"#,
        )
        .bind(airline.id)
        .bind(airline.airline_name)
        .bind(airline.iata_name)
        .bind(airline.airline_code)
        .bind(airline.status)
        .bind(airline.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update_airline(
        &self,
        id: Uuid,
        patch: UpdateAirlineRequest,
    ) -> Result<Option<Airline>, StoreError> {
        let updated = sqlx::query_as::<_, Airline>(
            r#"UPDATE airlines SET
                 airline_name = COALESCE($2, airline_name),
                 iata_name = COALESCE($3, iata_name),
                 airline_code = COALESCE($4, airline_code),
                 status = COALESCE($5, status)
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(patch.airline_name)
        .bind(patch.iata_name)
        .bind(patch.airline_code)
        .bind(patch.status)
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn delete_airline(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM airlines WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
