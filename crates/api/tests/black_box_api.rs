use std::sync::Arc;

use chrono::{Days, Local, NaiveDate};
use pharmatrack_api::app::{build_app, services::AppServices};
use reqwest::StatusCode;
use serde_json::{json, Value};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Build app (same router as prod), but bind to an ephemeral port.
        let app = build_app(Arc::new(AppServices::in_memory()));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn drugs(&self, path: &str) -> String {
        format!("{}/api/v1/drugs{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn in_days(days: u64) -> String {
    let today: NaiveDate = Local::now().date_naive();
    today
        .checked_add_days(Days::new(days))
        .unwrap()
        .format("%Y-%m-%d")
        .to_string()
}

fn drug_body(sku: &str) -> Value {
    json!({
        "sku": sku,
        "name": "Test Medication",
        "generic_name": "test_medication",
        "dosage": "10mg",
        "quantity": 100,
        "expiration_date": in_days(365),
        "manufacturer": "Test Pharma",
        "price": 29.99,
        "category": "Pain Relief",
        "description": "Test medication for testing"
    })
}

async fn create(client: &reqwest::Client, srv: &TestServer, body: Value) -> Value {
    let res = client.post(srv.drugs("")).json(&body).send().await.unwrap();
    if res.status() != StatusCode::CREATED {
        let status = res.status();
        let body = res.text().await.unwrap_or_default();
        panic!("expected 201 Created, got {status} body={body}");
    }
    res.json().await.unwrap()
}

#[tokio::test]
async fn health_reports_healthy() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(format!("{}/health", srv.base_url)).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "status": "healthy" }));
}

#[tokio::test]
async fn drug_lifecycle_create_read_update_delete() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let created = create(&client, &srv, drug_body("TEST-001")).await;
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["sku"], "TEST-001");
    assert_eq!(created["price"], 29.99);
    assert!(created["updated_at"].is_null());
    assert!(created["created_at"].is_string());

    let res = client.get(srv.drugs(&format!("/{id}"))).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let fetched: Value = res.json().await.unwrap();
    assert_eq!(fetched, created);

    let res = client
        .put(srv.drugs(&format!("/{id}")))
        .json(&json!({ "quantity": 150 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await.unwrap();
    assert_eq!(updated["quantity"], 150);
    assert_eq!(updated["name"], created["name"]);
    assert_eq!(updated["description"], created["description"]);
    assert!(updated["updated_at"].is_string());

    let res = client.delete(srv.drugs(&format!("/{id}"))).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let ack: Value = res.json().await.unwrap();
    assert_eq!(ack, json!({ "message": "Drug deleted successfully" }));

    let res = client.get(srv.drugs(&format!("/{id}"))).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "not_found");
    assert_eq!(body["message"], "Drug not found");

    let res = client.delete(srv.drugs(&format!("/{id}"))).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_sku_is_a_bad_request() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    create(&client, &srv, drug_body("A-1")).await;
    let res = client
        .post(srv.drugs(""))
        .json(&drug_body("A-1"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "duplicate_sku");
    assert_eq!(body["message"], "Drug with SKU 'A-1' already exists");

    let all: Vec<Value> = client.get(srv.drugs("")).send().await.unwrap().json().await.unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn invalid_fields_return_every_message() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.drugs(""))
        .json(&json!({
            "sku": "V-1",
            "name": "   ",
            "generic_name": "x",
            "dosage": "10mg",
            "quantity": 0,
            "expiration_date": "31/12/2030",
            "manufacturer": "Acme",
            "price": 0,
            "category": "General"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");
    assert_eq!(
        body["detail"],
        json!([
            "Drug Name is required",
            "Quantity must be at least 1",
            "Please select a valid expiration date",
            "Price must be greater than $0.00"
        ])
    );
}

#[tokio::test]
async fn wrong_typed_numbers_are_reported_per_field() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let mut body = drug_body("T-1");
    body["name"] = json!("");
    body["quantity"] = json!(1.5);
    body["price"] = json!("abc");
    let res = client.post(srv.drugs("")).json(&body).send().await.unwrap();

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");
    assert_eq!(
        body["detail"],
        json!([
            "Drug Name is required",
            "Quantity must be a whole number",
            "Price must be a valid number"
        ])
    );
}

#[tokio::test]
async fn prices_beyond_cents_or_range_are_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let mut body = drug_body("C-1");
    body["price"] = json!(0.001);
    let res = client.post(srv.drugs("")).json(&body).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let detail: Value = res.json().await.unwrap();
    assert_eq!(detail["detail"], json!(["Price must have at most 2 decimal places"]));

    let created = create(&client, &srv, drug_body("C-1")).await;
    let res = client
        .put(srv.drugs(&format!("/{}", created["id"])))
        .json(&json!({ "price": 1e9 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let detail: Value = res.json().await.unwrap();
    assert_eq!(detail["detail"], json!(["Price must be less than $100,000,000.00"]));
}

#[tokio::test]
async fn past_expiration_date_is_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let mut body = drug_body("P-1");
    body["expiration_date"] = json!("2020-01-01");
    let res = client.post(srv.drugs("")).json(&body).send().await.unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "expired_date");
    assert_eq!(body["message"], "Expiration date cannot be in the past");
}

#[tokio::test]
async fn malformed_json_and_ids_are_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.drugs(""))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert!(res.status().is_client_error());
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");

    let res = client.get(srv.drugs("/abc")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_id");
}

#[tokio::test]
async fn batch_is_all_or_nothing() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.drugs("/batch"))
        .json(&json!([drug_body("B-1"), drug_body("B-2"), drug_body("B-1")]))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "duplicate_in_batch");
    assert_eq!(body["message"], "Duplicate SKU 'B-1' in batch data");

    let res = client.post(srv.drugs("/batch")).json(&json!([])).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "No drug data provided");

    let mut second = drug_body("B-2");
    second["quantity"] = json!(0);
    let res = client
        .post(srv.drugs("/batch"))
        .json(&json!([drug_body("B-1"), second]))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["detail"], json!(["Item 2: Quantity must be at least 1"]));

    let all: Vec<Value> = client.get(srv.drugs("")).send().await.unwrap().json().await.unwrap();
    assert!(all.is_empty());

    let res = client
        .post(srv.drugs("/batch"))
        .json(&json!([drug_body("B-1"), drug_body("B-2")]))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Vec<Value> = res.json().await.unwrap();
    assert_eq!(created.len(), 2);
    assert_eq!(created[0]["sku"], "B-1");

    let res = client
        .post(srv.drugs("/batch"))
        .json(&json!([drug_body("B-3"), drug_body("B-2"), drug_body("B-1")]))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "skus_already_exist");
    assert_eq!(body["message"], "SKUs already exist in database: B-2, B-1");
}

#[tokio::test]
async fn read_views_filter_and_aggregate() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let rows = [
        ("R-1", "Aspirin", "Bayer", "Pain Relief", 10, 10),
        ("R-2", "Amoxil", "GSK", "Antibiotics", 500, 60),
        ("R-3", "Vitamin D", "Nature Made", "Vitamins", 99, 365),
    ];
    for (sku, name, manufacturer, category, quantity, days) in rows {
        let mut body = drug_body(sku);
        body["name"] = json!(name);
        body["manufacturer"] = json!(manufacturer);
        body["category"] = json!(category);
        body["quantity"] = json!(quantity);
        body["expiration_date"] = json!(in_days(days));
        create(&client, &srv, body).await;
    }

    let skus = |list: Vec<Value>| -> Vec<String> {
        let mut skus: Vec<String> = list
            .iter()
            .map(|d| d["sku"].as_str().unwrap().to_string())
            .collect();
        skus.sort();
        skus
    };

    let found: Vec<Value> = client
        .get(srv.drugs("?search=bayer"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(skus(found), ["R-1"]);

    let found: Vec<Value> = client
        .get(srv.drugs("?category=Antibiotics"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(skus(found), ["R-2"]);

    let found: Vec<Value> = client
        .get(srv.drugs("?category=All"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(found.len(), 3);

    let categories: Vec<String> = client
        .get(srv.drugs("/categories"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(categories, ["Antibiotics", "Pain Relief", "Vitamins"]);

    let low: Vec<Value> = client
        .get(srv.drugs("/low-stock"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(skus(low), ["R-1", "R-3"]);

    let low: Vec<Value> = client
        .get(srv.drugs("/low-stock?threshold=50"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(skus(low), ["R-1"]);

    let expiring: Vec<Value> = client
        .get(srv.drugs("/expiring-soon"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(skus(expiring), ["R-1", "R-2"]);

    let expiring: Vec<Value> = client
        .get(srv.drugs("/expiring-soon?days=30"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(skus(expiring), ["R-1"]);
}

#[tokio::test]
async fn paged_listing_reports_totals() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let batch: Vec<Value> = (0..5).map(|i| drug_body(&format!("PG-{i}"))).collect();
    let res = client.post(srv.drugs("/batch")).json(&batch).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let page: Value = client
        .get(srv.drugs("/paged?page=2&page_size=2"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(page["total"], 5);
    assert_eq!(page["page"], 2);
    assert_eq!(page["page_size"], 2);
    assert_eq!(page["total_pages"], 3);
    assert_eq!(page["items"].as_array().unwrap().len(), 2);

    let res = client.get(srv.drugs("/paged?page=0")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_pagination");

    let res = client.get(srv.drugs("/paged?page_size=lots")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
