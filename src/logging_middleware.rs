// src/logging_middleware.rs
//! Middleware for logging request and response bodies in debug mode
//!
//! Bearer token fields (`accessToken`, `sessionToken`) are masked before
//! anything reaches the log output.

use axum::body::to_bytes;
use axum::{
    body::Body, extract::Request, http::StatusCode, middleware::Next, response::Response,
};
use tracing::debug;

use crate::common::safe_token_log;

/// JSON body fields whose values must never appear in logs
const REDACTED_FIELDS: &[&str] = &["accessToken", "sessionToken"];

/// Middleware to log request and response bodies in debug mode
pub async fn log_request_response(request: Request, next: Next) -> Result<Response, StatusCode> {
    let (parts, body) = request.into_parts();

    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if !bytes.is_empty() {
        if let Ok(body_str) = std::str::from_utf8(&bytes) {
            debug!(
                method = %parts.method,
                uri = %parts.uri,
                request_body = %loggable_body(body_str),
                "Request"
            );
        }
    }

    let request = Request::from_parts(parts, Body::from(bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();

    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if !bytes.is_empty() {
        if let Ok(body_str) = std::str::from_utf8(&bytes) {
            debug!(
                status = %parts.status,
                response_body = %loggable_body(body_str),
                "Response"
            );
        }
    }

    Ok(Response::from_parts(parts, Body::from(bytes)))
}

/// Render a body for logging: JSON bodies are pretty-printed with token
/// fields masked; anything else is logged as-is.
fn loggable_body(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(mut json) => {
            redact_tokens(&mut json);
            serde_json::to_string_pretty(&json).unwrap_or_else(|_| body.to_string())
        }
        Err(_) => body.to_string(),
    }
}

fn redact_tokens(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, entry) in map.iter_mut() {
                if REDACTED_FIELDS.contains(&key.as_str()) {
                    if let serde_json::Value::String(s) = entry {
                        *entry = serde_json::Value::String(safe_token_log(s));
                    }
                } else {
                    redact_tokens(entry);
                }
            }
        }
        serde_json::Value::Array(items) => {
            for item in items.iter_mut() {
                redact_tokens(item);
            }
        }
        _ => {}
    }
}
