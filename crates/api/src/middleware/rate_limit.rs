//! Sliding-window rate limiting.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;

use bandit_domain::ErrorResponse;

use super::client_ip;
use crate::AppState;

/// Paths that are never rate limited.
const EXEMPT_PATHS: &[&str] = &["/", "/health", "/ready", "/docs", "/redoc", "/openapi.json"];

/// Outcome of a rate limit check.
#[derive(Debug, Clone, Copy)]
pub struct RateDecision {
    pub allowed: bool,
    pub limit: usize,
    pub remaining: usize,
    pub reset_seconds: u64,
}

/// In-memory sliding-window limiter.
///
/// One timestamp list per key; mutation happens under the map's
/// per-key entry lock, so concurrent checks for the same key are
/// serialized. Swap for a shared store with the same key/window
/// contract when scaling horizontally.
#[derive(Debug, Default)]
pub struct RateLimiter {
    requests: DashMap<String, Vec<Instant>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            requests: DashMap::new(),
        }
    }

    /// Check one request against the key's window, recording it when
    /// allowed. Returns the decision with the header values to expose.
    pub fn check(&self, key: &str, max_requests: usize, window: Duration) -> RateDecision {
        let now = Instant::now();
        let mut entry = self.requests.entry(key.to_string()).or_default();

        // Evict timestamps that fell out of the window.
        entry.retain(|ts| now.duration_since(*ts) < window);

        if entry.len() >= max_requests {
            let reset_seconds = entry
                .iter()
                .min()
                .map(|oldest| window.saturating_sub(now.duration_since(*oldest)).as_secs())
                .unwrap_or_else(|| window.as_secs());
            return RateDecision {
                allowed: false,
                limit: max_requests,
                remaining: 0,
                reset_seconds,
            };
        }

        entry.push(now);
        RateDecision {
            allowed: true,
            limit: max_requests,
            remaining: max_requests - entry.len(),
            reset_seconds: window.as_secs(),
        }
    }
}

/// Endpoint identity for the limits table: method plus the path with
/// UUID segments replaced by a placeholder.
fn endpoint_pattern(method: &Method, path: &str) -> String {
    let normalized: Vec<&str> = path
        .trim_matches('/')
        .split('/')
        .map(|segment| {
            if segment.len() == 36 && segment.contains('-') {
                "{experiment_id}"
            } else {
                segment
            }
        })
        .collect();

    format!("{} /{}", method, normalized.join("/"))
}

/// Per-endpoint limits; everything else gets the default.
fn limit_for(pattern: &str) -> (usize, Duration) {
    let (max_requests, window_seconds) = match pattern {
        "POST /experiments" => (10, 60),
        "POST /experiments/{experiment_id}/metrics" => (100, 60),
        "GET /experiments/{experiment_id}/allocation" => (60, 60),
        "GET /experiments/{experiment_id}/history" => (60, 60),
        "GET /experiments/{experiment_id}" => (120, 60),
        _ => (100, 60),
    };
    (max_requests, Duration::from_secs(window_seconds))
}

/// Middleware applying the per-(client, endpoint) sliding window.
pub async fn rate_limit(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();
    if EXEMPT_PATHS.contains(&path.as_str()) {
        return next.run(req).await;
    }

    let pattern = endpoint_pattern(req.method(), &path);
    let (max_requests, window) = limit_for(&pattern);
    let client = client_ip(&req);
    let key = format!("{client}:{pattern}");

    let decision = state.rate_limiter.check(&key, max_requests, window);

    if !decision.allowed {
        tracing::warn!(
            client_ip = %client,
            endpoint = %pattern,
            limit = max_requests,
            window_seconds = window.as_secs(),
            "Rate limit exceeded"
        );

        let mut response = (
            StatusCode::TOO_MANY_REQUESTS,
            Json(ErrorResponse {
                error: "Rate limit exceeded".to_string(),
                details: None,
            }),
        )
            .into_response();
        let headers = response.headers_mut();
        headers.insert("x-ratelimit-limit", HeaderValue::from(decision.limit));
        headers.insert("x-ratelimit-remaining", HeaderValue::from(0));
        headers.insert("x-ratelimit-reset", HeaderValue::from(decision.reset_seconds));
        headers.insert("retry-after", HeaderValue::from(decision.reset_seconds));
        return response;
    }

    let mut response = next.run(req).await;
    let headers = response.headers_mut();
    headers.insert("x-ratelimit-limit", HeaderValue::from(decision.limit));
    headers.insert("x-ratelimit-remaining", HeaderValue::from(decision.remaining));
    headers.insert("x-ratelimit-reset", HeaderValue::from(decision.reset_seconds));
    response
}
