use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use migration::MigratorTrait;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;
use server::{ServerState, router, run_with_listener};

async fn engine() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build().await.unwrap()
}

async fn app() -> Router {
    router(ServerState {
        engine: Arc::new(engine().await),
    })
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    call(app, Method::POST, uri, Some(body)).await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    call(app, Method::GET, uri, None).await
}

fn id(value: &Value) -> String {
    value["id"].as_str().unwrap().to_string()
}

/// Member holding "Resident", which entails "Maintenance" (Q50.00).
async fn resident(app: &Router) -> (String, String) {
    let (status, member) = post(
        app,
        "/api/members",
        json!({"national_id": "1234567890123", "name": "Ana López"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, right) = post(app, "/api/rights", json!({"name": "Resident"})).await;
    let (_, due) = post(
        app,
        "/api/dues",
        json!({"description": "Maintenance", "amount": "50.00", "limit_date": "2025-12-31"}),
    )
    .await;
    let (member_id, right_id, due_id) = (id(&member), id(&right), id(&due));

    let (status, _) = call(
        app,
        Method::PUT,
        &format!("/api/rights/{right_id}/dues/{due_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, assignment) = post(
        app,
        "/api/assignments",
        json!({"member_id": member_id, "right_id": right_id, "start_date": "2025-01-01"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(assignment["created"], json!([due_id]));

    (member_id, due_id)
}

#[tokio::test]
async fn payment_flow_updates_status_and_funds() {
    let app = app().await;
    let (member_id, due_id) = resident(&app).await;

    let (status, receipt) = post(
        &app,
        "/api/payments",
        json!({"member_id": member_id, "due_id": due_id, "date": "2025-02-01", "amount": "20.00"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(receipt["balance"]["amount_remaining"], "30.00");
    assert_eq!(receipt["balance"]["status"], "pending");

    let (status, receipt) = post(
        &app,
        "/api/payments",
        json!({"member_id": member_id, "due_id": due_id, "date": "2025-02-02", "amount": "30.00"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(receipt["balance"]["status"], "completed");

    let (status, balance) = get(&app, &format!("/api/obligations/{member_id}/{due_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(balance["amount_paid"], "50.00");

    let (_, funds) = get(&app, "/api/funds").await;
    assert_eq!(funds["total_income"], "50.00");
    assert_eq!(funds["available"], "50.00");
}

#[tokio::test]
async fn settled_obligation_rejects_payment() {
    let app = app().await;
    let (member_id, due_id) = resident(&app).await;
    post(
        &app,
        "/api/payments",
        json!({"member_id": member_id, "due_id": due_id, "date": "2025-02-01", "amount": "50.00"}),
    )
    .await;

    let (status, body) = post(
        &app,
        "/api/payments",
        json!({"member_id": member_id, "due_id": due_id, "date": "2025-02-02", "amount": "1.00"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "already_settled");
}

#[tokio::test]
async fn expense_beyond_funds_is_rejected() {
    let app = app().await;
    let (status, _) = post(
        &app,
        "/api/incomes",
        json!({"date": "2025-03-01", "amount": "100.00", "source": "donation"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = post(
        &app,
        "/api/expenses",
        json!({"date": "2025-03-02", "amount": "150.00", "description": "Repairs"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "insufficient_funds");

    let (status, expense) = post(
        &app,
        "/api/expenses",
        json!({"date": "2025-03-02", "amount": "40.00", "description": "Repairs"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(expense["amount"], "40.00");

    let (_, funds) = get(&app, "/api/funds").await;
    assert_eq!(funds["available"], "60.00");
}

#[tokio::test]
async fn malformed_input_reports_every_violation() {
    let app = app().await;
    let (status, body) = post(
        &app,
        "/api/expenses",
        json!({"date": "03/02/2025", "amount": "-5", "description": ""}),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"].as_array().unwrap().len() >= 3);
}

#[tokio::test]
async fn unknown_member_is_404() {
    let app = app().await;
    let (status, body) = get(
        &app,
        "/api/members/6f1c2f4e-4f6b-4d8e-9a65-0d8b1f0e2a11",
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");
}

#[tokio::test]
async fn duplicate_link_is_409() {
    let app = app().await;
    let (_, right) = post(&app, "/api/rights", json!({"name": "Owner"})).await;
    let (_, due) = post(
        &app,
        "/api/dues",
        json!({"description": "Water", "amount": "10.00", "limit_date": "2025-06-30"}),
    )
    .await;
    let uri = format!("/api/rights/{}/dues/{}", id(&right), id(&due));

    let (status, _) = call(&app, Method::PUT, &uri, None).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = call(&app, Method::PUT, &uri, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "duplicate_link");
}

#[tokio::test]
async fn deleting_a_paid_due_is_409() {
    let app = app().await;
    let (member_id, due_id) = resident(&app).await;
    post(
        &app,
        "/api/payments",
        json!({"member_id": member_id, "due_id": due_id, "date": "2025-02-01", "amount": "10.00"}),
    )
    .await;

    let (status, body) = call(&app, Method::DELETE, &format!("/api/dues/{due_id}"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "in_use");
}

async fn patch(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    call(app, Method::PATCH, uri, Some(body)).await
}

#[tokio::test]
async fn served_listener_answers_over_tcp() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(run_with_listener(engine().await, listener));

    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /api/funds HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    assert!(response.starts_with("HTTP/1.1 200"), "{response}");
    assert!(response.contains("\"available\":\"0.00\""), "{response}");
}

#[tokio::test]
async fn ledger_entries_are_editable() {
    let app = app().await;
    let (_, income) = post(
        &app,
        "/api/incomes",
        json!({"date": "2025-03-01", "amount": "100.00", "source": "donation"}),
    )
    .await;
    let (_, expense) = post(
        &app,
        "/api/expenses",
        json!({"date": "2025-03-02", "amount": "40.00", "description": "Repairs"}),
    )
    .await;

    let (status, body) = patch(
        &app,
        &format!("/api/incomes/{}", id(&income)),
        json!({"amount": "30.00"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "insufficient_funds");

    let (status, body) = patch(
        &app,
        &format!("/api/expenses/{}", id(&expense)),
        json!({"amount": "60.00", "description": "Roof repairs"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["amount"], "60.00");
    assert_eq!(body["description"], "Roof repairs");

    let (_, funds) = get(&app, "/api/funds").await;
    assert_eq!(funds["available"], "40.00");
}

#[tokio::test]
async fn malformed_body_gets_structured_error() {
    let app = app().await;
    let (status, body) = post(
        &app,
        "/api/expenses",
        json!({"date": "2025-03-02", "amount": 30.00, "description": "Repairs"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "bad_request");
    assert_eq!(body["errors"].as_array().unwrap().len(), 1);
}
