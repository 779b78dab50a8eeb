//! Structured request logging.

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};

use super::client_ip;

/// Emit one structured log line per request.
///
/// Health probes are skipped to keep the log readable under frequent
/// orchestrator polling.
pub async fn request_log(req: Request, next: Next) -> Response {
    if req.uri().path() == "/health" {
        return next.run(req).await;
    }

    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(str::to_string);
    let client = client_ip(&req);
    let request_id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    let user_agent = req
        .headers()
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(|ua| ua.chars().take(100).collect::<String>())
        .unwrap_or_default();

    let response = next.run(req).await;

    let status = response.status().as_u16();
    let duration_ms = (started.elapsed().as_secs_f64() * 100_000.0).round() / 100.0;
    tracing::info!(
        method = %method,
        path = %path,
        status_code = status,
        duration_ms,
        client_ip = %client,
        request_id = %request_id,
        user_agent = %user_agent,
        query = query.as_deref(),
        "{method} {path} {status}"
    );

    response
}
