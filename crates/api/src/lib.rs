//! Bandit allocation API library.

pub mod handlers;
pub mod middleware;
pub mod services;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    routing::{get, patch, post},
};
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use bandit_config::AppConfig;
use bandit_domain::{HealthResponse, ReadyResponse};
use bandit_storage::{
    AllocationHistoryRepository, ExperimentRepository, MetricsRepository, check_connection,
};
use sqlx::PgPool;

use handlers::allocation::{get_allocation, get_history};
use handlers::experiments::{create_experiment, get_experiment, update_experiment_status};
use handlers::metrics::record_metrics;
use middleware::rate_limit::{RateLimiter, rate_limit};
use middleware::request_log::request_log;
use services::allocation::AllocationService;

/// Application state shared across handlers.
pub struct AppState {
    pub pool: PgPool,
    pub experiments: ExperimentRepository,
    pub metrics: MetricsRepository,
    pub history: AllocationHistoryRepository,
    pub allocation: AllocationService,
    pub rate_limiter: RateLimiter,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(pool: PgPool, config: AppConfig) -> Self {
        Self {
            experiments: ExperimentRepository::new(pool.clone()),
            metrics: MetricsRepository::new(pool.clone()),
            history: AllocationHistoryRepository::new(pool.clone()),
            allocation: AllocationService::new(pool.clone(), &config),
            rate_limiter: RateLimiter::new(),
            pool,
            config,
        }
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/experiments", post(create_experiment))
        .route("/experiments/{experiment_id}", get(get_experiment))
        .route(
            "/experiments/{experiment_id}/status",
            patch(update_experiment_status),
        )
        .route("/experiments/{experiment_id}/metrics", post(record_metrics))
        .route(
            "/experiments/{experiment_id}/allocation",
            get(get_allocation),
        )
        .route("/experiments/{experiment_id}/history", get(get_history))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit,
        ))
        .layer(axum::middleware::from_fn(request_log))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Service banner.
async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Multi-Armed Bandit Optimization API",
        "docs": "/docs",
        "health": "/health",
    }))
}

/// Health check endpoint.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "bandit-api".to_string(),
    })
}

/// Readiness check endpoint.
async fn ready(State(state): State<Arc<AppState>>) -> Json<ReadyResponse> {
    let db_status = match check_connection(&state.pool).await {
        Ok(()) => "connected",
        Err(_) => "disconnected",
    };

    Json(ReadyResponse {
        status: if db_status == "connected" {
            "ok"
        } else {
            "degraded"
        }
        .to_string(),
        database: db_status.to_string(),
    })
}
