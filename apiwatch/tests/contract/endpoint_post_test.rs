//! Contract Test: POST /api/endpoint

use crate::support::{build_app, post_json, send, TWO_ENDPOINTS};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;

fn new_endpoint() -> Value {
    json!({
        "name": "relay-c",
        "apiBase": "https://relay-c.example.com",
        "apiKey": "sk-relay-c",
        "testInterval": "15",
        "inviteLink": "https://relay-c.example.com/invite"
    })
}

#[tokio::test]
async fn test_register_appends_and_persists() {
    let t = build_app(TWO_ENDPOINTS).await;
    let (status, body) = send(&t.app, post_json("/api/endpoint", &new_endpoint())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["message"].is_string());
    assert_eq!(
        body["data"],
        json!({
            "name": "relay-c",
            "apiBase": "https://relay-c.example.com",
            "testInterval": 15,
            "inviteLink": "https://relay-c.example.com/invite"
        })
    );

    let saved: Value = serde_json::from_str(&t.config_contents()).unwrap();
    let endpoints = saved["endpoints"].as_array().unwrap();
    assert_eq!(endpoints.len(), 3);
    assert_eq!(endpoints[2]["name"], "relay-c");
    assert_eq!(endpoints[2]["apiKey"], "sk-relay-c");
    assert_eq!(endpoints[2]["testInterval"], 15);
    assert_eq!(saved["defaultTestInterval"], 10);

    // the in-memory configuration was reloaded
    assert!(t.monitor.current_config().await.unwrap().contains("relay-c"));
}

#[tokio::test]
async fn test_register_triggers_background_test_of_all_endpoints() {
    let t = build_app(TWO_ENDPOINTS).await;
    let (status, _) = send(&t.app, post_json("/api/endpoint", &new_endpoint())).await;
    assert_eq!(status, StatusCode::OK);

    tokio::time::timeout(Duration::from_secs(5), async {
        while t.probe.calls() < 3 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("background test of all endpoints did not run");

    let results = t.monitor.get_results().await;
    assert_eq!(results.len(), 3);
    assert_eq!(results[2].name, "relay-c");
}

#[tokio::test]
async fn test_register_duplicate_name_is_rejected_without_writing() {
    let t = build_app(TWO_ENDPOINTS).await;
    let before = t.config_contents();

    let mut duplicate = new_endpoint();
    duplicate["name"] = json!("relay-a");
    let (status, body) = send(&t.app, post_json("/api/endpoint", &duplicate)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("relay-a"));
    assert_eq!(t.config_contents(), before);
    assert_eq!(t.probe.calls(), 0);
}

#[tokio::test]
async fn test_register_missing_fields_is_rejected() {
    let t = build_app(TWO_ENDPOINTS).await;
    let before = t.config_contents();

    let (status, body) = send(
        &t.app,
        post_json("/api/endpoint", &json!({"name": "relay-c", "apiKey": ""})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("apiBase"));
    assert!(error.contains("apiKey"));
    assert!(error.contains("testInterval"));
    assert_eq!(t.config_contents(), before);
}

#[tokio::test]
async fn test_register_non_numeric_interval_is_rejected() {
    let t = build_app(TWO_ENDPOINTS).await;
    let mut body = new_endpoint();
    body["testInterval"] = json!("every hour");

    let (status, response) = send(&t.app, post_json("/api/endpoint", &body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response["error"]
        .as_str()
        .unwrap()
        .contains("testInterval"));
}

#[tokio::test]
async fn test_register_malformed_json_is_rejected() {
    let t = build_app(TWO_ENDPOINTS).await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/endpoint")
        .header("content-type", "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();

    let (status, body) = send(&t.app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_register_response_never_echoes_api_key() {
    let t = build_app(TWO_ENDPOINTS).await;
    let (_, body) = send(&t.app, post_json("/api/endpoint", &new_endpoint())).await;
    assert!(!body.to_string().contains("sk-relay-c"));
}
