// src/logging_middleware.rs
//! Request logging
//!
//! Every request gets one summary line. Bodies are only buffered and logged
//! when debug logging is enabled, with credentials masked.

use axum::{
    body::{to_bytes, Body, Bytes},
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{debug, info, Level};

use crate::common::helpers::mask_secrets;

/// Largest body that will be buffered for logging
const MAX_LOGGED_BODY: usize = 1024 * 1024;

fn masked_body(bytes: &Bytes) -> Option<String> {
    if bytes.is_empty() {
        return None;
    }
    let mut json = serde_json::from_slice::<serde_json::Value>(bytes).ok()?;
    mask_secrets(&mut json);
    serde_json::to_string_pretty(&json).ok()
}

/// Middleware logging method, path, status and latency of each request
pub async fn log_request_response(request: Request, next: Next) -> Result<Response, StatusCode> {
    let method = request.method().clone();
    // Path only: the query string may carry authorization codes
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = if tracing::enabled!(Level::DEBUG) {
        let (parts, body) = request.into_parts();
        let bytes = to_bytes(body, MAX_LOGGED_BODY)
            .await
            .map_err(|_| StatusCode::PAYLOAD_TOO_LARGE)?;
        if let Some(body) = masked_body(&bytes) {
            debug!(method = %method, path = %path, request_body = %body, "Request");
        }
        let response = next.run(Request::from_parts(parts, Body::from(bytes))).await;

        let (parts, body) = response.into_parts();
        let bytes = to_bytes(body, MAX_LOGGED_BODY)
            .await
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
        if let Some(body) = masked_body(&bytes) {
            debug!(status = %parts.status, response_body = %body, "Response");
        }
        Response::from_parts(parts, Body::from(bytes))
    } else {
        next.run(request).await
    };

    info!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        latency_ms = started.elapsed().as_millis() as u64,
        "Request completed"
    );

    Ok(response)
}
