// src/logging_middleware.rs
//! Middleware for logging request and response bodies in debug mode

use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use tracing::debug;

/// Buffers and logs request and response bodies, then reconstructs both.
/// Emits at debug level only, so production logs stay quiet by default.
pub async fn log_request_response(request: Request, next: Next) -> Result<Response, StatusCode> {
    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if !bytes.is_empty() {
        let context = format!("{} {}", parts.method, parts.uri);
        log_body("request", &context, &bytes);
    }

    let request = Request::from_parts(parts, Body::from(bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if !bytes.is_empty() {
        let context = parts.status.to_string();
        log_body("response", &context, &bytes);
    }

    Ok(Response::from_parts(parts, Body::from(bytes)))
}

fn log_body(direction: &str, context: &str, bytes: &[u8]) {
    if let Ok(body_str) = std::str::from_utf8(bytes) {
        // Pretty-print JSON bodies, pass anything else through as-is
        match serde_json::from_str::<serde_json::Value>(body_str) {
            Ok(json) => debug!(
                %context,
                body = %serde_json::to_string_pretty(&json).unwrap_or_else(|_| body_str.to_string()),
                "{}",
                direction
            ),
            Err(_) => debug!(%context, body = %body_str, "{}", direction),
        }
    }
}
