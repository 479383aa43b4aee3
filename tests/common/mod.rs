use async_trait::async_trait;
use axum::serve;
use quickway_api::{
    AppConfig, AppState, create_router,
    auth::TokenCodec,
    error::StoreError,
    models::{
        Account, AccountStatus, Airline, Payment, Role, Sale, Supplier, UpdateAirlineRequest,
        UpdatePaymentRequest, UpdateSaleRequest, UpdateSupplierRequest,
    },
    query::{FieldValue, Predicate, Record, Sort},
    repository::{RecordSet, Repository},
};
use std::cmp::Ordering;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use uuid::Uuid;

// --- In-memory record set ---

/// A `RecordSet` over a shared vector, evaluating predicates with the same
/// reference semantics the SQL rendering must reproduce. Lets the scoping,
/// search and pagination behavior be exercised without a database.
pub struct MemoryRecords<T> {
    rows: Arc<Mutex<Vec<T>>>,
}

impl<T> MemoryRecords<T> {
    fn new(rows: Arc<Mutex<Vec<T>>>) -> Self {
        Self { rows }
    }
}

fn cmp_values(a: &FieldValue, b: &FieldValue) -> Ordering {
    match (a, b) {
        (FieldValue::Text(x), FieldValue::Text(y)) => x.cmp(y),
        (FieldValue::Number(x), FieldValue::Number(y)) => {
            x.partial_cmp(y).unwrap_or(Ordering::Equal)
        }
        (FieldValue::Date(x), FieldValue::Date(y)) => x.cmp(y),
        (FieldValue::Timestamp(x), FieldValue::Timestamp(y)) => x.cmp(y),
        (FieldValue::Id(x), FieldValue::Id(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

#[async_trait]
impl<T> RecordSet<T> for MemoryRecords<T>
where
    T: Record + Clone,
{
    async fn count(&self, predicate: &Predicate) -> Result<i64, StoreError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().filter(|r| predicate.matches(*r)).count() as i64)
    }

    async fn find_many(
        &self,
        predicate: &Predicate,
        sort: &Sort,
        skip: i64,
        take: i64,
    ) -> Result<Vec<T>, StoreError> {
        let rows = self.rows.lock().unwrap();
        let mut matched: Vec<T> = rows
            .iter()
            .filter(|r| predicate.matches(*r))
            .cloned()
            .collect();

        matched.sort_by(|a, b| {
            let ordering = match (a.field(sort.field), b.field(sort.field)) {
                (Some(x), Some(y)) => cmp_values(&x, &y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            if sort.descending {
                ordering.reverse()
            } else {
                ordering
            }
        });

        Ok(matched
            .into_iter()
            .skip(skip.max(0) as usize)
            .take(take.max(0) as usize)
            .collect())
    }

    async fn find_one(&self, predicate: &Predicate) -> Result<Option<T>, StoreError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|r| predicate.matches(*r)).cloned())
    }
}

// --- In-memory repository ---

/// A full in-memory `Repository`, used to stand the router up without
/// Postgres. Partial updates follow the same only-supplied-fields-change
/// semantics as the SQL COALESCE statements.
pub struct MemoryRepository {
    sales_rows: Arc<Mutex<Vec<Sale>>>,
    payments_rows: Arc<Mutex<Vec<Payment>>>,
    suppliers_rows: Arc<Mutex<Vec<Supplier>>>,
    airlines_rows: Arc<Mutex<Vec<Airline>>>,
    accounts_rows: Arc<Mutex<Vec<Account>>>,
    sales: MemoryRecords<Sale>,
    payments: MemoryRecords<Payment>,
    suppliers: MemoryRecords<Supplier>,
    airlines: MemoryRecords<Airline>,
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRepository {
    pub fn new() -> Self {
        let sales_rows = Arc::new(Mutex::new(Vec::new()));
        let payments_rows = Arc::new(Mutex::new(Vec::new()));
        let suppliers_rows = Arc::new(Mutex::new(Vec::new()));
        let airlines_rows = Arc::new(Mutex::new(Vec::new()));
        Self {
            sales: MemoryRecords::new(sales_rows.clone()),
            payments: MemoryRecords::new(payments_rows.clone()),
            suppliers: MemoryRecords::new(suppliers_rows.clone()),
            airlines: MemoryRecords::new(airlines_rows.clone()),
            sales_rows,
            payments_rows,
            suppliers_rows,
            airlines_rows,
            accounts_rows: Arc::new(Mutex::new(Vec::new())),
        }
    }

    // Direct seeding helpers for test arrangement.
    pub fn seed_account(&self, account: Account) {
        self.accounts_rows.lock().unwrap().push(account);
    }

    pub fn seed_sale(&self, sale: Sale) {
        self.sales_rows.lock().unwrap().push(sale);
    }

    pub fn seed_payment(&self, payment: Payment) {
        self.payments_rows.lock().unwrap().push(payment);
    }

    pub fn seed_supplier(&self, supplier: Supplier) {
        self.suppliers_rows.lock().unwrap().push(supplier);
    }

    pub fn seed_airline(&self, airline: Airline) {
        self.airlines_rows.lock().unwrap().push(airline);
    }

    pub fn set_account(&self, email: &str, role: Role, status: AccountStatus) {
        let mut accounts = self.accounts_rows.lock().unwrap();
        if let Some(account) = accounts.iter_mut().find(|a| a.email == email) {
            account.role = role;
            account.status = status;
        }
    }
}

#[async_trait]
impl Repository for MemoryRepository {
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
        let accounts = self.accounts_rows.lock().unwrap();
        Ok(accounts.iter().find(|a| a.email == email).cloned())
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, StoreError> {
        Ok(self.accounts_rows.lock().unwrap().clone())
    }

    async fn create_account(&self, account: Account) -> Result<Account, StoreError> {
        self.accounts_rows.lock().unwrap().push(account.clone());
        Ok(account)
    }

    async fn set_account_status(
        &self,
        email: &str,
        status: AccountStatus,
    ) -> Result<Option<Account>, StoreError> {
        let mut accounts = self.accounts_rows.lock().unwrap();
        match accounts.iter_mut().find(|a| a.email == email) {
            Some(account) => {
                account.status = status;
                Ok(Some(account.clone()))
            }
            None => Ok(None),
        }
    }

    async fn insert_sale(&self, sale: Sale) -> Result<Sale, StoreError> {
        self.sales_rows.lock().unwrap().push(sale.clone());
        Ok(sale)
    }

    async fn update_sale(
        &self,
        id: Uuid,
        patch: UpdateSaleRequest,
    ) -> Result<Option<Sale>, StoreError> {
        let mut rows = self.sales_rows.lock().unwrap();
        match rows.iter_mut().find(|s| s.id == id) {
            Some(sale) => {
                if let Some(v) = patch.date {
                    sale.date = v;
                }
                if let Some(v) = patch.document_number {
                    sale.document_number = v;
                }
                if let Some(v) = patch.rv_number {
                    sale.rv_number = Some(v);
                }
                if let Some(v) = patch.passenger_name {
                    sale.passenger_name = v;
                }
                if let Some(v) = patch.supplier_name {
                    sale.supplier_name = v;
                }
                if let Some(v) = patch.airline_code {
                    sale.airline_code = v;
                }
                if let Some(v) = patch.sector {
                    sale.sector = Some(v);
                }
                if let Some(v) = patch.sell_price {
                    sale.sell_price = v;
                }
                if let Some(v) = patch.buying_price {
                    sale.buying_price = v;
                }
                if let Some(v) = patch.account_type {
                    sale.account_type = v;
                }
                if let Some(v) = patch.post_status {
                    sale.post_status = v;
                }
                if let Some(v) = patch.payment_status {
                    sale.payment_status = v;
                }
                Ok(Some(sale.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_sale(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut rows = self.sales_rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|s| s.id != id);
        Ok(rows.len() < before)
    }

    async fn sale_totals(&self, predicate: &Predicate) -> Result<(f64, f64), StoreError> {
        let rows = self.sales_rows.lock().unwrap();
        let (mut sell, mut buy) = (0.0, 0.0);
        for sale in rows.iter().filter(|s| predicate.matches(*s)) {
            sell += sale.sell_price;
            buy += sale.buying_price;
        }
        Ok((sell, buy))
    }

    async fn insert_payment(&self, payment: Payment) -> Result<Payment, StoreError> {
        self.payments_rows.lock().unwrap().push(payment.clone());
        Ok(payment)
    }

    async fn update_payment(
        &self,
        id: Uuid,
        patch: UpdatePaymentRequest,
    ) -> Result<Option<Payment>, StoreError> {
        let mut rows = self.payments_rows.lock().unwrap();
        match rows.iter_mut().find(|p| p.id == id) {
            Some(payment) => {
                if let Some(v) = patch.date {
                    payment.date = v;
                }
                if let Some(v) = patch.amount {
                    payment.amount = v;
                }
                if let Some(v) = patch.method {
                    payment.method = v;
                }
                if let Some(v) = patch.remarks {
                    payment.remarks = Some(v);
                }
                Ok(Some(payment.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_payment(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut rows = self.payments_rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|p| p.id != id);
        Ok(rows.len() < before)
    }

    async fn insert_supplier(&self, supplier: Supplier) -> Result<Supplier, StoreError> {
        self.suppliers_rows.lock().unwrap().push(supplier.clone());
        Ok(supplier)
    }

    async fn update_supplier(
        &self,
        id: Uuid,
        patch: UpdateSupplierRequest,
    ) -> Result<Option<Supplier>, StoreError> {
        let mut rows = self.suppliers_rows.lock().unwrap();
        match rows.iter_mut().find(|s| s.id == id) {
            Some(supplier) => {
                if let Some(v) = patch.supplier_name {
                    supplier.supplier_name = v;
                }
                if let Some(v) = patch.account_type {
                    supplier.account_type = v;
                }
                if let Some(v) = patch.status {
                    supplier.status = v;
                }
                if let Some(v) = patch.total_due {
                    supplier.total_due = v;
                }
                Ok(Some(supplier.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_supplier(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut rows = self.suppliers_rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|s| s.id != id);
        Ok(rows.len() < before)
    }

    async fn insert_airline(&self, airline: Airline) -> Result<Airline, StoreError> {
        self.airlines_rows.lock().unwrap().push(airline.clone());
        Ok(airline)
    }

    async fn update_airline(
        &self,
        id: Uuid,
        patch: UpdateAirlineRequest,
    ) -> Result<Option<Airline>, StoreError> {
        let mut rows = self.airlines_rows.lock().unwrap();
        match rows.iter_mut().find(|a| a.id == id) {
            Some(airline) => {
                if let Some(v) = patch.airline_name {
                    airline.airline_name = v;
                }
                if let Some(v) = patch.iata_name {
                    airline.iata_name = v;
                }
                if let Some(v) = patch.airline_code {
                    airline.airline_code = v;
                }
                if let Some(v) = patch.status {
                    airline.status = v;
                }
                Ok(Some(airline.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_airline(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut rows = self.airlines_rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|a| a.id != id);
        Ok(rows.len() < before)
    }
}

// --- Test application harness ---

pub struct TestApp {
    pub address: String,
    pub repo: Arc<MemoryRepository>,
    pub config: AppConfig,
}

impl TestApp {
    /// Issues a valid token for the given seeded account.
    pub fn token_for(&self, account: &Account) -> String {
        TokenCodec::from_config(&self.config)
            .issue(account)
            .expect("token issue failed")
    }

    /// Issues a token that is already expired but otherwise valid.
    pub fn expired_token_for(&self, account: &Account) -> String {
        TokenCodec::new(&self.config.token_secret, -1)
            .issue(account)
            .expect("token issue failed")
    }
}

/// Starts the full router on an ephemeral port, backed by the in-memory
/// repository, and returns the harness.
pub async fn spawn_app() -> TestApp {
    let repo = Arc::new(MemoryRepository::new());
    let config = AppConfig::default();

    let state = AppState {
        repo: repo.clone(),
        config: config.clone(),
    };
    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        serve(listener, router).await.unwrap();
    });

    TestApp {
        address,
        repo,
        config,
    }
}

// --- Fixtures ---

pub fn account(email: &str, role: Role, office_id: &str) -> Account {
    Account {
        email: email.to_string(),
        name: "Test User".to_string(),
        role,
        office_id: office_id.to_string(),
        status: AccountStatus::Active,
        ..Default::default()
    }
}

pub fn sale(office_id: &str, created_by: &str, document_number: &str) -> Sale {
    Sale {
        id: Uuid::new_v4(),
        office_id: office_id.to_string(),
        created_by: created_by.to_string(),
        document_number: document_number.to_string(),
        passenger_name: "A Traveller".to_string(),
        supplier_name: "Skyline Travels".to_string(),
        airline_code: "EK".to_string(),
        sell_price: 1000.0,
        buying_price: 900.0,
        account_type: "Cash".to_string(),
        post_status: "Draft".to_string(),
        payment_status: "Pending".to_string(),
        ..Default::default()
    }
}

pub fn payment(office_id: &str, created_by: &str, amount: f64) -> Payment {
    Payment {
        id: Uuid::new_v4(),
        office_id: office_id.to_string(),
        created_by: created_by.to_string(),
        amount,
        method: "Bank".to_string(),
        ..Default::default()
    }
}
