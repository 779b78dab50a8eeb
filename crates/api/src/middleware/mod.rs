//! HTTP middleware.

pub mod rate_limit;
pub mod request_log;

use axum::extract::{ConnectInfo, Request};
use std::net::SocketAddr;

/// Client identity for rate limiting and request logs.
///
/// First comma-separated token of `X-Forwarded-For` when present,
/// otherwise the transport peer address.
pub(crate) fn client_ip(req: &Request) -> String {
    if let Some(forwarded) = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
