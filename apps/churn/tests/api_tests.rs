//! Integration tests for the churn HTTP API.
//!
//! Drives the router in-process with axum-test.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use axum::http::StatusCode;
use axum_test::TestServer;
use churn::api::{AppState, build_router};
use churn::config::ServerConfig;
use churn::form::FormSchema;
use churn_core::{
    Activation, ChurnAssets, DenseLayer, FeatureScaler, LabelEncoder, Network, OneHotEncoder,
    PredictionReport, Predictor, RiskBand, ScalingMethod,
};
use serde_json::{Value, json};
use std::sync::Arc;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Assets whose model only looks at age: p = sigmoid((age - 40) / 8).
fn assets() -> ChurnAssets {
    let mut weights = vec![0.0; 12];
    weights[2] = 1.0;
    ChurnAssets {
        model: Network::new(vec![DenseLayer::new(
            vec![weights],
            vec![0.0],
            Activation::Sigmoid,
        )])
        .unwrap(),
        gender_encoder: LabelEncoder::new(vec!["Female".into(), "Male".into()]).unwrap(),
        geography_encoder: OneHotEncoder::new(
            "Geography",
            vec!["France".into(), "Germany".into(), "Spain".into()],
        )
        .unwrap(),
        scaler: FeatureScaler::new(
            ScalingMethod::Standard {
                mean: vec![650.0, 0.5, 40.0, 5.0, 76000.0, 1.5, 0.7, 0.5, 100000.0, 0.5, 0.25, 0.25],
                scale: vec![97.0, 0.5, 8.0, 2.9, 62000.0, 0.6, 0.46, 0.5, 57500.0, 0.5, 0.43, 0.43],
            },
            None,
        )
        .unwrap(),
    }
}

fn server_with(config: ServerConfig) -> TestServer {
    let predictor = Arc::new(Predictor::new(assets()).unwrap());
    let state = AppState::shared(predictor, &config);
    TestServer::new(build_router(state)).unwrap()
}

fn server() -> TestServer {
    server_with(ServerConfig::default())
}

fn customer(age: u8) -> Value {
    json!({
        "geography": "Spain",
        "gender": "Female",
        "age": age,
        "tenure": 2,
        "credit_score": 700,
        "balance": 0.0,
        "estimated_salary": 40000.0,
        "num_of_products": 1,
        "has_credit_card": false,
        "is_active_member": true
    })
}

// =============================================================================
// HEALTH / SCHEMA
// =============================================================================

#[tokio::test]
async fn test_health() {
    let server = server();
    let response = server.get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_schema_lists_encoder_vocabularies() {
    let server = server();
    let response = server.get("/v1/schema").await;

    response.assert_status_ok();
    let schema: FormSchema = response.json();
    assert_eq!(schema.geography, vec!["France", "Germany", "Spain"]);
    assert_eq!(schema.gender, vec!["Female", "Male"]);
    assert_eq!(schema.columns.len(), 12);

    let age = schema.numeric.iter().find(|f| f.name == "age").unwrap();
    assert_eq!((age.min, age.max, age.default), (18.0, 92.0, 35.0));
}

// =============================================================================
// PREDICT
// =============================================================================

#[tokio::test]
async fn test_predict_returns_report() {
    let server = server();
    let response = server.post("/v1/predict").json(&customer(56)).await;

    response.assert_status_ok();
    let report: PredictionReport = response.json();
    // (56 - 40) / 8 = 2
    let expected = 1.0 / (1.0 + (-2.0f64).exp());
    assert!((report.probability - expected).abs() < 1e-9);
    assert!(report.churn);
    assert_eq!(report.risk, RiskBand::High);
    assert_eq!(report.percent, "88.1%");
}

#[tokio::test]
async fn test_predict_uses_form_defaults() {
    let server = server();
    let response = server
        .post("/v1/predict")
        .json(&json!({"geography": "France", "gender": "Male"}))
        .await;

    response.assert_status_ok();
    let report: PredictionReport = response.json();
    // Default age 35.
    assert!(!report.churn);
}

#[tokio::test]
async fn test_predict_unknown_category_is_unprocessable() {
    let server = server();
    let mut body = customer(40);
    body["geography"] = json!("Atlantis");

    let response = server.post("/v1/predict").json(&body).await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    let error: Value = response.json();
    assert!(error["error"].as_str().unwrap().contains("Atlantis"));
}

#[tokio::test]
async fn test_predict_out_of_range_is_unprocessable() {
    let server = server();
    let mut body = customer(40);
    body["credit_score"] = json!(900);

    let response = server.post("/v1/predict").json(&body).await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    let error: Value = response.json();
    assert!(error["error"].as_str().unwrap().contains("credit_score"));
}

// =============================================================================
// EXPLAIN
// =============================================================================

#[tokio::test]
async fn test_explain_without_prediction_is_not_found() {
    let server = server();
    let response = server.get("/v1/explain").await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_explain_follows_last_prediction() {
    let server = server();
    server.post("/v1/predict").json(&customer(30)).await.assert_status_ok();
    server.post("/v1/predict").json(&customer(64)).await.assert_status_ok();

    let response = server.get("/v1/explain").await;
    response.assert_status_ok();
    let report: PredictionReport = response.json();

    assert_eq!(
        report.explanation_method.as_deref(),
        Some("occlusion-heuristic")
    );
    // Age 64 is the last one scored: (64 - 40) / 8 = 3.
    let expected = 1.0 / (1.0 + (-3.0f64).exp());
    assert!((report.probability - expected).abs() < 1e-9);
    assert_eq!(report.impacts[0].feature, "Age");
    assert!(report.impacts[0].impact > 0.0);
}

// =============================================================================
// AUTH / RATE LIMIT
// =============================================================================

#[tokio::test]
async fn test_api_key_required_when_configured() {
    let server = server_with(ServerConfig {
        api_key: Some("s3cret".into()),
        ..ServerConfig::default()
    });

    let missing = server.get("/v1/schema").await;
    assert_eq!(missing.status_code(), StatusCode::UNAUTHORIZED);

    let wrong = server
        .get("/v1/schema")
        .authorization_bearer("nope")
        .await;
    assert_eq!(wrong.status_code(), StatusCode::UNAUTHORIZED);

    let ok = server
        .get("/v1/schema")
        .authorization_bearer("s3cret")
        .await;
    ok.assert_status_ok();

    // Health stays open.
    server.get("/health").await.assert_status_ok();
}

#[tokio::test]
async fn test_rate_limit_rejects_burst() {
    let server = server_with(ServerConfig {
        requests_per_second: 1,
        ..ServerConfig::default()
    });

    server.get("/health").await.assert_status_ok();
    let limited = server.get("/health").await;
    assert_eq!(limited.status_code(), StatusCode::TOO_MANY_REQUESTS);
}
