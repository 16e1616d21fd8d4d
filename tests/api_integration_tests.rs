use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::Service;

use beneficiary_registry::api::{handlers::AppStateInner, routes::create_router};
use beneficiary_registry::db::{Database, MemoryBackend};
use beneficiary_registry::engine::QueryEngine;
use beneficiary_registry::models::Record;
use beneficiary_registry::query::QueryLimits;

fn record(family: &str, member: &str, name: &str, block: &str, village: &str, status: &str) -> Record {
    Record {
        family_id: Some(family.to_string()),
        member_id: Some(member.to_string()),
        name: Some(name.to_string()),
        block: Some(block.to_string()),
        village_code: Some(village.to_string()),
        member_card_status: Some(status.to_string()),
        district: Some("Agra".to_string()),
        ..Default::default()
    }
}

fn fixture() -> Vec<Record> {
    vec![
        record("F1", "M1", "Sita Devi", "Bichpuri", "120034", "Approved"),
        record("F1", "M2", "Ram Lal", "Bichpuri", "120034", "Pending"),
        record("F2", "M3", "Geeta Kumari", "Fatehabad", "881230", "Approved"),
    ]
}

// Helper to create test app over an in-memory record source
fn create_test_app() -> axum::Router {
    let db = Arc::new(MemoryBackend::new(fixture())) as Database;
    let limits = QueryLimits {
        max_page_size: 100,
        default_page_size: 2,
        max_filter_length: 64,
    };

    let state = Arc::new(AppStateInner {
        engine: QueryEngine::new(db, limits),
        instance_id: "test-instance".to_string(),
    });

    create_router(state)
}

// Helper to send request and parse JSON response
async fn send_json_request(app: &mut axum::Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.call(request).await.unwrap();
    let status = response.status();

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap_or(json!({}));

    (status, json)
}

fn member_ids(rows: &Value, key: &str) -> Vec<String> {
    rows.as_array()
        .expect("rows should be an array")
        .iter()
        .map(|row| row[key].as_str().unwrap_or_default().to_string())
        .collect()
}

#[tokio::test]
async fn test_health_endpoint() {
    let mut app = create_test_app();
    let (status, body) = send_json_request(&mut app, "GET", "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "beneficiary-registry");
    assert_eq!(body["database"], "memory");
    assert_eq!(body["instance_id"], "test-instance");
}

#[tokio::test]
async fn test_health_ready_endpoint() {
    let mut app = create_test_app();
    let (status, body) = send_json_request(&mut app, "GET", "/health/ready").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["checks"]["database"], "ok");
}

#[tokio::test]
async fn test_total_endpoint() {
    let mut app = create_test_app();
    let (status, body) = send_json_request(&mut app, "GET", "/records/total?block=nowhere").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["total"], 3);
}

#[tokio::test]
async fn test_records_default_page_size() {
    let mut app = create_test_app();
    let (status, body) = send_json_request(&mut app, "GET", "/records").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["page"], 1);
    assert_eq!(body["data"]["page_size"], 2);
    assert_eq!(body["data"]["returned"], 2);
    assert_eq!(member_ids(&body["data"]["data"], "src_member_id"), vec!["M1", "M2"]);
}

#[tokio::test]
async fn test_records_rows_use_column_names() {
    let mut app = create_test_app();
    let (_, body) = send_json_request(&mut app, "GET", "/records?page_size=1").await;

    let row = &body["data"]["data"][0];
    assert_eq!(row["src_family_id"], "F1");
    assert_eq!(row["blockname"], "Bichpuri");
    assert_eq!(row["card_status_member"], "Approved");
    assert!(row["relation"].is_null());
    assert_eq!(row.as_object().unwrap().len(), 15);
}

#[tokio::test]
async fn test_records_second_page() {
    let mut app = create_test_app();
    let (status, body) = send_json_request(&mut app, "GET", "/records?page=2&page_size=2").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(member_ids(&body["data"]["data"], "src_member_id"), vec!["M3"]);
}

#[tokio::test]
async fn test_records_past_last_page_is_empty() {
    let mut app = create_test_app();
    let (status, body) = send_json_request(&mut app, "GET", "/records?page=5&page_size=10").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["returned"], 0);
    assert!(body["data"]["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_records_invalid_paging() {
    let mut app = create_test_app();

    for uri in [
        "/records?page=0",
        "/records?page=-1",
        "/records?page_size=0",
        "/records/typed?page_size=101",
    ] {
        let (status, body) = send_json_request(&mut app, "GET", uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn test_filter_too_long_is_rejected() {
    let mut app = create_test_app();
    let uri = format!("/records/summary?search={}", "a".repeat(65));
    let (status, body) = send_json_request(&mut app, "GET", &uri).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_typed_records_with_filters() {
    let mut app = create_test_app();
    let (status, body) = send_json_request(
        &mut app,
        "GET",
        "/records/typed?member_status=approved&page_size=10",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(member_ids(&body["data"]["data"], "member_id"), vec!["M1", "M3"]);
    assert_eq!(body["data"]["data"][0]["family_id"], "F1");
}

#[tokio::test]
async fn test_village_and_search_filters() {
    let mut app = create_test_app();

    let (_, body) = send_json_request(&mut app, "GET", "/records?village=123&page_size=10").await;
    assert_eq!(member_ids(&body["data"]["data"], "src_member_id"), vec!["M3"]);

    let (_, body) = send_json_request(&mut app, "GET", "/records?search=f1&page_size=10").await;
    assert_eq!(
        member_ids(&body["data"]["data"], "src_member_id"),
        vec!["M1", "M2"]
    );

    let (_, body) = send_json_request(&mut app, "GET", "/records?search=%20%20&page_size=10").await;
    assert_eq!(body["data"]["returned"], 3);
}

#[tokio::test]
async fn test_summary_endpoint() {
    let mut app = create_test_app();

    let (status, body) = send_json_request(&mut app, "GET", "/records/summary").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"],
        json!({
            "total_members": 3,
            "total_families": 2,
            "covered_members": 2,
            "covered_families": 2
        })
    );

    let (_, body) = send_json_request(&mut app, "GET", "/records/summary?block=BICHPURI").await;
    assert_eq!(
        body["data"],
        json!({
            "total_members": 2,
            "total_families": 1,
            "covered_members": 1,
            "covered_families": 1
        })
    );
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let mut app = create_test_app();
    let request = Request::builder()
        .uri("/health/live")
        .header("x-request-id", "req-42")
        .body(Body::empty())
        .unwrap();

    let response = app.call(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "req-42");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let mut app = create_test_app();
    send_json_request(&mut app, "GET", "/records/total").await;

    let request = Request::builder()
        .uri("/metrics")
        .body(Body::empty())
        .unwrap();
    let response = app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("engine_requests_total"));
    assert!(text.contains("http_requests_total"));
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let mut app = create_test_app();
    let (status, body) = send_json_request(&mut app, "GET", "/api-docs/openapi.json").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/records/summary"].is_object());
}
