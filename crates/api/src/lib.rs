pub mod config;

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Json, State};
use axum::http::{header, HeaderValue, Method, Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{body::Body, Router};
use serde::Serialize;
use speechact_classifier::{ClassifierStack, ClassifyError};
use speechact_core::{BatchClassificationRequest, CategoryListing, ClassificationRequest};
use speechact_observability::{AppMetrics, MetricsSnapshot};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub use config::ApiConfig;

const MAX_BODY_BYTES: usize = 1024 * 1024;
const LOG_PREVIEW_CHARS: usize = 50;

#[derive(Clone)]
pub struct ApiState {
    pub classifier: Arc<ClassifierStack>,
    pub metrics: Arc<AppMetrics>,
    pub allowed_origins: Arc<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    model_loaded: bool,
    model_name: String,
    version: &'static str,
}

#[derive(Debug, Serialize)]
struct MetricsResponse {
    timestamp_utc: String,
    model_loaded: bool,
    metrics: MetricsSnapshot,
}

/// Loads the analysis model and wires the router. A model that fails to load
/// leaves the service up with `model_loaded: false`.
pub fn build_app(config: &ApiConfig) -> Router {
    let metrics = AppMetrics::shared();
    let classifier = ClassifierStack::load(&config.model, metrics.clone());
    if classifier.model_loaded() {
        tracing::info!(model = %classifier.model_name(), "language model loaded");
    }

    build_router(ApiState {
        classifier: Arc::new(classifier),
        metrics,
        allowed_origins: Arc::new(config.allowed_origins.clone()),
    })
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/classify", post(classify))
        .route("/batch", post(classify_batch))
        .route("/categories", get(categories))
        .route("/metrics", get(metrics))
        .layer(build_cors_layer(&state.allowed_origins))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}

async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    let payload = HealthResponse {
        status: "healthy",
        model_loaded: state.classifier.model_loaded(),
        model_name: state.classifier.model_name().to_string(),
        version: env!("CARGO_PKG_VERSION"),
    };
    (StatusCode::OK, Json(payload))
}

async fn categories() -> impl IntoResponse {
    (StatusCode::OK, Json(CategoryListing::supported()))
}

async fn metrics(State(state): State<ApiState>) -> impl IntoResponse {
    let payload = MetricsResponse {
        timestamp_utc: chrono::Utc::now().to_rfc3339(),
        model_loaded: state.classifier.model_loaded(),
        metrics: state.metrics.snapshot(),
    };
    (StatusCode::OK, Json(payload))
}

async fn classify(
    State(state): State<ApiState>,
    Json(request): Json<ClassificationRequest>,
) -> Response {
    let started = Instant::now();
    state.metrics.inc_classify_request();
    let text_preview = preview(&request.text);
    tracing::debug!(model = %request.model_name(), "classify request");

    let classifier = state.classifier.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        classifier.classify(
            &request.text,
            request.available_categories.as_deref(),
            request.wants_features(),
        )
    })
    .await;
    state.metrics.observe_latency(started.elapsed());

    match outcome {
        Ok(Ok(result)) => {
            tracing::info!(
                text = %text_preview,
                label = %result.prediction,
                confidence = result.confidence,
                "text classified"
            );
            (StatusCode::OK, Json(result)).into_response()
        }
        Ok(Err(error)) => classify_error_response(&state, error),
        Err(join_error) => worker_failure_response(&state, &join_error.to_string()),
    }
}

async fn classify_batch(
    State(state): State<ApiState>,
    Json(request): Json<BatchClassificationRequest>,
) -> Response {
    let started = Instant::now();
    state.metrics.inc_batch_request();
    let submitted = request.texts.len();
    tracing::debug!(model = %request.model_name(), submitted, "batch request");

    let classifier = state.classifier.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        classifier.classify_batch(
            &request.texts,
            request.available_categories.as_deref(),
            request.wants_features(),
        )
    })
    .await;
    state.metrics.observe_latency(started.elapsed());

    match outcome {
        Ok(Ok(result)) => {
            tracing::info!(
                submitted,
                processed = result.total_processed,
                "batch classified"
            );
            (StatusCode::OK, Json(result)).into_response()
        }
        Ok(Err(error)) => classify_error_response(&state, error),
        Err(join_error) => worker_failure_response(&state, &join_error.to_string()),
    }
}

fn classify_error_response(state: &ApiState, error: ClassifyError) -> Response {
    state.metrics.inc_failure();
    let code = match &error {
        ClassifyError::ModelUnavailable => "model_unavailable",
        ClassifyError::Analysis(_) => "classification_failed",
    };
    tracing::error!(error = %error, code, "classification failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({
            "error": code,
            "message": error.to_string()
        })),
    )
        .into_response()
}

fn worker_failure_response(state: &ApiState, reason: &str) -> Response {
    state.metrics.inc_failure();
    tracing::error!(error = %reason, "classification worker aborted");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({
            "error": "classification_failed",
            "message": reason
        })),
    )
        .into_response()
}

fn preview(text: &str) -> String {
    let mut preview = text.chars().take(LOG_PREVIEW_CHARS).collect::<String>();
    if text.chars().count() > LOG_PREVIEW_CHARS {
        preview.push_str("...");
    }
    preview
}

fn build_cors_layer(allowed_origins: &Arc<Vec<String>>) -> CorsLayer {
    let origins = allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect::<Vec<_>>();
    let origins = if origins.is_empty() {
        vec![HeaderValue::from_static("http://localhost:3000")]
    } else {
        origins
    };

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::HeaderName::from_static("x-request-id"),
        ])
        .allow_credentials(true)
}

async fn security_headers_middleware(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;
    response.headers_mut().insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    response.headers_mut().insert(
        header::HeaderName::from_static("x-frame-options"),
        HeaderValue::from_static("DENY"),
    );
    response
}
