use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use speechact_api::{build_app, build_router, ApiConfig, ApiState};
use speechact_classifier::ClassifierStack;
use speechact_nlp::{Analysis, AnalysisError, TextAnalyzer};
use speechact_observability::AppMetrics;
use tower::ServiceExt;

fn app() -> Router {
    build_app(&ApiConfig::default())
}

fn degraded_app() -> Router {
    let metrics = AppMetrics::shared();
    let classifier = ClassifierStack::unavailable("fr_core_news_md", "not installed", metrics.clone());
    build_router(ApiState {
        classifier: Arc::new(classifier),
        metrics,
        allowed_origins: Arc::new(vec!["http://localhost:3000".to_string()]),
    })
}

struct BrokenAnalyzer;

impl TextAnalyzer for BrokenAnalyzer {
    fn model_name(&self) -> &str {
        "fr_broken"
    }

    fn analyze(&self, _text: &str) -> Result<Analysis, AnalysisError> {
        Err(AnalysisError::Failed("lexicon lookup failed".to_string()))
    }
}

fn broken_app() -> Router {
    let metrics = AppMetrics::shared();
    let classifier = ClassifierStack::with_analyzer(Arc::new(BrokenAnalyzer), metrics.clone());
    build_router(ApiState {
        classifier: Arc::new(classifier),
        metrics,
        allowed_origins: Arc::new(vec!["http://localhost:3000".to_string()]),
    })
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn health_reports_loaded_model() {
    let response = app().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let parsed = json_body(response).await;
    assert_eq!(parsed["status"], "healthy");
    assert_eq!(parsed["model_loaded"], true);
    assert_eq!(parsed["model_name"], "fr_core_news_md");
    assert!(parsed["version"].as_str().is_some());
}

#[tokio::test]
async fn categories_lists_the_seven_labels() {
    let response = app().oneshot(get("/categories")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let parsed = json_body(response).await;
    assert_eq!(parsed["total"], 7);
    assert_eq!(
        parsed["categories"],
        json!([
            "OUVERTURE",
            "ENGAGEMENT",
            "EXPLICATION",
            "REFLET",
            "REFLET_JE",
            "REFLET_VOUS",
            "REFLET_ACQ"
        ])
    );
}

#[tokio::test]
async fn classify_returns_prediction_and_features() {
    let response = app()
        .oneshot(post_json("/classify", json!({ "text": "Bonjour, comment allez-vous ?" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let parsed = json_body(response).await;
    assert_eq!(parsed["prediction"], "OUVERTURE");
    assert!((parsed["confidence"].as_f64().unwrap() - 0.8).abs() < 1e-6);

    let tokens = parsed["tokens_count"].as_u64().unwrap() as usize;
    assert!(tokens > 0);
    let features = &parsed["features"];
    assert_eq!(features["pos_tags"].as_array().unwrap().len(), tokens);
    assert_eq!(features["lemmas"].as_array().unwrap().len(), tokens);
    assert_eq!(features["dep_parse"].as_array().unwrap().len(), tokens);
    assert!(features["entities"].is_array());
}

#[tokio::test]
async fn classify_overrides_disallowed_label() {
    let response = app()
        .oneshot(post_json(
            "/classify",
            json!({
                "text": "bonjour",
                "available_categories": ["EXPLICATION"],
                "return_features": false
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let parsed = json_body(response).await;
    assert_eq!(parsed["prediction"], "EXPLICATION");
    assert!((parsed["confidence"].as_f64().unwrap() - 0.3).abs() < 1e-6);
    assert!(parsed["features"].is_null());
}

#[tokio::test]
async fn batch_skips_blank_texts() {
    let response = app()
        .oneshot(post_json(
            "/batch",
            json!({
                "texts": ["bonjour", "   ", "", "si je comprends bien, c'est annulé"]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let parsed = json_body(response).await;
    assert_eq!(parsed["total_processed"], 2);
    let predictions = parsed["predictions"].as_array().unwrap();
    assert_eq!(predictions.len(), 2);
    assert_eq!(predictions[0]["prediction"], "OUVERTURE");
    assert_eq!(predictions[1]["prediction"], "REFLET_JE");
}

#[tokio::test]
async fn empty_batch_returns_zero_predictions() {
    let response = app()
        .oneshot(post_json("/batch", json!({ "texts": [] })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let parsed = json_body(response).await;
    assert_eq!(parsed["total_processed"], 0);
    assert_eq!(parsed["predictions"], json!([]));
}

#[tokio::test]
async fn degraded_service_stays_healthy_but_refuses_work() {
    let app = degraded_app();

    let health = app.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(health.status(), StatusCode::OK);
    let parsed = json_body(health).await;
    assert_eq!(parsed["status"], "healthy");
    assert_eq!(parsed["model_loaded"], false);

    let response = app
        .clone()
        .oneshot(post_json("/classify", json!({ "text": "bonjour" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let parsed = json_body(response).await;
    assert_eq!(parsed["error"], "model_unavailable");
    assert_eq!(parsed["message"], "language analysis model is not available");

    let response = app
        .oneshot(post_json("/batch", json!({ "texts": ["bonjour"] })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn metrics_count_requests_and_overrides() {
    let app = app();

    app.clone()
        .oneshot(post_json(
            "/classify",
            json!({ "text": "bonjour", "available_categories": ["QUESTION"] }),
        ))
        .await
        .unwrap();
    app.clone()
        .oneshot(post_json("/batch", json!({ "texts": ["d'accord", " "] })))
        .await
        .unwrap();

    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let parsed = json_body(response).await;
    assert!(parsed["timestamp_utc"].as_str().is_some());
    let metrics = &parsed["metrics"];
    assert_eq!(metrics["classify_requests_total"], 1);
    assert_eq!(metrics["batch_requests_total"], 1);
    assert_eq!(metrics["texts_classified_total"], 2);
    assert_eq!(metrics["blank_texts_skipped_total"], 1);
    assert_eq!(metrics["constraint_overrides_total"], 1);
}

#[tokio::test]
async fn malformed_body_is_rejected() {
    let request = Request::builder()
        .method("POST")
        .uri("/classify")
        .header("content-type", "application/json")
        .body(Body::from("{\"text\": "))
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert!(response.status().is_client_error());

    let response = app()
        .oneshot(post_json("/classify", json!({ "texte": "bonjour" })))
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn analysis_failure_maps_to_classification_failed() {
    let app = broken_app();

    let response = app
        .clone()
        .oneshot(post_json("/classify", json!({ "text": "bonjour" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let parsed = json_body(response).await;
    assert_eq!(parsed["error"], "classification_failed");
    assert!(parsed["message"]
        .as_str()
        .unwrap()
        .contains("lexicon lookup failed"));

    let response = app
        .clone()
        .oneshot(post_json("/batch", json!({ "texts": ["bonjour", "merci"] })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let parsed = json_body(response).await;
    assert_eq!(parsed["error"], "classification_failed");

    let response = app.oneshot(get("/metrics")).await.unwrap();
    let parsed = json_body(response).await;
    assert_eq!(parsed["metrics"]["failures_total"], 2);
    assert_eq!(parsed["metrics"]["texts_classified_total"], 0);
}
