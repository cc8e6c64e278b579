//! HTTP API.
//!
//! | Method | Path          | Purpose                                   |
//! |--------|---------------|-------------------------------------------|
//! | GET    | `/health`     | liveness                                  |
//! | GET    | `/v1/schema`  | form options, ranges, defaults, columns   |
//! | POST   | `/v1/predict` | score a form, remember it as the last one |
//! | GET    | `/v1/explain` | heuristic impacts of the last prediction  |
//!
//! The predictor is loaded once before the server starts and shared
//! read-only. The only mutable state is the last-prediction slot.

use crate::config::{ChurnConfig, ServerConfig};
use crate::form::{CustomerForm, FormError, FormSchema};
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Request, State},
    http::{StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use churn_core::{ChurnError, CustomerRecord, PredictionReport, Predictor, explain};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use serde::Serialize;
use serde_json::json;
use std::num::NonZeroU32;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Request body limit.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

// =============================================================================
// STATE
// =============================================================================

/// The last scored record, kept to drive `/v1/explain`.
#[derive(Debug, Clone, Serialize)]
pub struct LastPrediction {
    pub record: CustomerRecord,
    pub report: PredictionReport,
}

pub struct AppState {
    pub predictor: Arc<Predictor>,
    pub last: RwLock<Option<LastPrediction>>,
    api_key: Option<String>,
    limiter: DefaultDirectRateLimiter,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(predictor: Arc<Predictor>, server: &ServerConfig) -> Self {
        let rps = NonZeroU32::new(server.requests_per_second).unwrap_or(NonZeroU32::MIN);
        Self {
            predictor,
            last: RwLock::new(None),
            api_key: server.api_key.clone(),
            limiter: RateLimiter::direct(Quota::per_second(rps)),
        }
    }

    pub fn shared(predictor: Arc<Predictor>, server: &ServerConfig) -> SharedState {
        Arc::new(Self::new(predictor, server))
    }
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Form(#[from] FormError),

    #[error("{0}")]
    Churn(#[from] ChurnError),

    #[error("missing or invalid API key")]
    Unauthorized,

    #[error("rate limit exceeded")]
    RateLimited,

    #[error("no prediction has been made yet")]
    NoPrediction,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Form(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Churn(e) if e.is_input_error() => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Churn(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::NoPrediction => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(error = %self, "Request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

// =============================================================================
// ROUTER
// =============================================================================

/// Build the router with auth, rate limiting, body limit and tracing.
pub fn build_router(state: SharedState) -> Router {
    let v1 = Router::new()
        .route("/schema", get(schema_handler))
        .route("/predict", post(predict_handler))
        .route("/explain", get(explain_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_handler))
        .nest("/v1", v1)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn auth_middleware(State(state): State<SharedState>, req: Request, next: Next) -> Response {
    let Some(expected) = state.api_key.as_deref() else {
        return next.run(req).await;
    };

    let provided = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match provided {
        Some(token) if bool::from(token.as_bytes().ct_eq(expected.as_bytes())) => {
            next.run(req).await
        }
        _ => ApiError::Unauthorized.into_response(),
    }
}

async fn rate_limit_middleware(
    State(state): State<SharedState>,
    req: Request,
    next: Next,
) -> Response {
    if state.limiter.check().is_err() {
        return ApiError::RateLimited.into_response();
    }
    next.run(req).await
}

// =============================================================================
// HANDLERS
// =============================================================================

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn schema_handler(State(state): State<SharedState>) -> Json<FormSchema> {
    Json(FormSchema::from_assets(state.predictor.assets()))
}

async fn predict_handler(
    State(state): State<SharedState>,
    Json(form): Json<CustomerForm>,
) -> Result<Json<PredictionReport>, ApiError> {
    let record = form.into_record()?;
    let prediction = state.predictor.predict(&record)?;
    let report = PredictionReport::new(&prediction);

    info!(
        probability = prediction.probability,
        churn = prediction.churn,
        risk = prediction.risk.as_str(),
        "Prediction served"
    );

    *state.last.write().await = Some(LastPrediction {
        record,
        report: report.clone(),
    });
    Ok(Json(report))
}

async fn explain_handler(
    State(state): State<SharedState>,
) -> Result<Json<PredictionReport>, ApiError> {
    let last = state.last.read().await.clone().ok_or(ApiError::NoPrediction)?;
    let explanation = explain(&state.predictor, &last.record)?;
    Ok(Json(last.report.with_explanation(explanation)))
}

// =============================================================================
// SERVER
// =============================================================================

/// Start the HTTP server and run until Ctrl-C.
pub async fn serve(
    config: &ChurnConfig,
    predictor: Predictor,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::shared(Arc::new(predictor), &config.server);
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(
        addr = %addr,
        auth = config.server.api_key.is_some(),
        rps = config.server.requests_per_second,
        "Churn API listening"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Churn API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
    }
}
