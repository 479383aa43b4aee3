mod common;

use chrono::NaiveDate;
use common::{account, sale, spawn_app};
use quickway_api::models::Role;
use serde_json::Value;

#[tokio::test]
async fn stats_reflect_scope_and_date_window() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    app.repo
        .seed_account(account("boss@qw.com", Role::OfficeAdmin, "DXB-01"));

    let jan = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
    let mar = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();

    let mut a = sale("DXB-01", "alice@qw.com", "DOC-001");
    a.date = jan;
    a.post_status = "Posted".into();
    a.payment_status = "Paid".into();
    a.sell_price = 1000.0;
    a.buying_price = 800.0;
    app.repo.seed_sale(a);

    let mut b = sale("DXB-01", "amir@qw.com", "DOC-002");
    b.date = jan;
    b.sell_price = 500.0;
    b.buying_price = 450.0;
    app.repo.seed_sale(b);

    // Outside the window.
    let mut c = sale("DXB-01", "alice@qw.com", "DOC-003");
    c.date = mar;
    app.repo.seed_sale(c);

    // Another office entirely.
    let mut d = sale("KHI-02", "karim@qw.com", "DOC-004");
    d.date = jan;
    app.repo.seed_sale(d);

    let token = app.token_for(&account("boss@qw.com", Role::OfficeAdmin, "DXB-01"));
    let body: Value = client
        .get(format!(
            "{}/api/sales/stats?startDate=2026-01-01&endDate=2026-01-31",
            app.address
        ))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["data"]["total"], 2);
    assert_eq!(body["data"]["posted"], 1);
    assert_eq!(body["data"]["paid"], 1);
    assert_eq!(body["data"]["totalSellPrice"], 1500.0);
    assert_eq!(body["data"]["totalBuyingPrice"], 1250.0);
    assert_eq!(body["data"]["totalProfit"], 250.0);
}

#[tokio::test]
async fn document_validation_reports_duplicates_and_next_voucher() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    app.repo
        .seed_account(account("alice@qw.com", Role::Agent, "DXB-01"));

    let mut existing = sale("KHI-02", "karim@qw.com", "DOC-100");
    existing.rv_number = Some("RV-0007".into());
    app.repo.seed_sale(existing);

    let token = app.token_for(&account("alice@qw.com", Role::Agent, "DXB-01"));

    // The duplicate check crosses office boundaries on purpose.
    let body: Value = client
        .get(format!(
            "{}/api/sales/validate-document?documentNumber=DOC-100",
            app.address
        ))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["exists"], true);
    assert_eq!(body["lastRVNumber"], "RV-0008");

    let body: Value = client
        .get(format!(
            "{}/api/sales/validate-document?documentNumber=DOC-999",
            app.address
        ))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["exists"], false);
}

#[tokio::test]
async fn partial_update_changes_only_supplied_fields() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    app.repo
        .seed_account(account("alice@qw.com", Role::Agent, "DXB-01"));

    let mut original = sale("DXB-01", "alice@qw.com", "DOC-200");
    original.passenger_name = "Old Name".into();
    original.sell_price = 1000.0;
    let id = original.id;
    app.repo.seed_sale(original);

    let token = app.token_for(&account("alice@qw.com", Role::Agent, "DXB-01"));
    let body: Value = client
        .put(format!("{}/api/sales/{}", app.address, id))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "passengerName": "New Name" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["data"]["passengerName"], "New Name");
    // Untouched fields keep their values.
    assert_eq!(body["data"]["sellPrice"], 1000.0);
    assert_eq!(body["data"]["documentNumber"], "DOC-200");
}

#[tokio::test]
async fn invalid_payloads_are_rejected_with_400() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    app.repo
        .seed_account(account("alice@qw.com", Role::Agent, "DXB-01"));
    let token = app.token_for(&account("alice@qw.com", Role::Agent, "DXB-01"));

    // Negative price.
    let response = client
        .post(format!("{}/api/sales", app.address))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "date": "2026-08-15",
            "documentNumber": "DOC-300",
            "passengerName": "X",
            "supplierName": "Y",
            "airlineCode": "EK",
            "sellPrice": -1.0,
            "buyingPrice": 100.0
        }))
        .send()
        .await
        .expect("request failed");
    assert_eq!(response.status(), 400);

    // Unknown post status.
    let response = client
        .post(format!("{}/api/sales", app.address))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "date": "2026-08-15",
            "documentNumber": "DOC-301",
            "passengerName": "X",
            "supplierName": "Y",
            "airlineCode": "EK",
            "sellPrice": 100.0,
            "buyingPrice": 90.0,
            "postStatus": "Archived"
        }))
        .send()
        .await
        .expect("request failed");
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn delete_removes_the_sale() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    app.repo
        .seed_account(account("alice@qw.com", Role::Agent, "DXB-01"));

    let target = sale("DXB-01", "alice@qw.com", "DOC-400");
    let id = target.id;
    app.repo.seed_sale(target);

    let token = app.token_for(&account("alice@qw.com", Role::Agent, "DXB-01"));

    let response = client
        .delete(format!("{}/api/sales/{}", app.address, id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("request failed");
    assert_eq!(response.status(), 200);

    let response = client
        .get(format!("{}/api/sales/{}", app.address, id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("request failed");
    assert_eq!(response.status(), 404);
}
