//! Middleware for logging requests and responses.

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;

/// The number of bytes of a body that are logged at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// The largest request body the server will read, in bytes.
pub const MAX_BODY_SIZE: usize = 2 * 1024 * 1024;

/// JSON fields whose values are never written to the logs.
const REDACTED_FIELDS: [&str; 4] = ["password", "currentPassword", "newPassword", "token"];

const REDACTED_VALUE: &str = "********";

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is
/// truncated and the full body is logged at the `debug` level.
/// Passwords and tokens in JSON bodies are redacted.
///
/// Request bodies larger than [MAX_BODY_SIZE] are rejected with
/// `413 Payload Too Large` before they reach any handler.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match axum::body::to_bytes(body, MAX_BODY_SIZE).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::warn!("Could not read request body: {error}");
            return StatusCode::PAYLOAD_TOO_LARGE.into_response();
        }
    };

    log_body(
        &format!("Received request: {} {}", parts.method, parts.uri),
        &loggable_body(&parts.headers, &body_bytes),
    );

    let request = Request::from_parts(parts, Body::from(body_bytes));
    let response = next.run(request).await;

    // Responses are built by the server, so their size is not limited here.
    let (parts, body) = response.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read response body: {error}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    log_body(
        &format!("Sending response: {}", parts.status),
        &loggable_body(&parts.headers, &body_bytes),
    );

    Response::from_parts(parts, Body::from(body_bytes))
}

/// The text of a body as it may appear in the logs.
fn loggable_body(headers: &HeaderMap, body: &Bytes) -> String {
    let is_json = headers
        .get(CONTENT_TYPE)
        .and_then(|content_type| content_type.to_str().ok())
        .is_some_and(|content_type| content_type.starts_with("application/json"));

    if is_json {
        redact_secrets(body)
    } else {
        String::from_utf8_lossy(body).to_string()
    }
}

/// Replace the values of password and token fields anywhere in a JSON document.
///
/// Bodies that are not valid JSON are returned as they are.
fn redact_secrets(body: &Bytes) -> String {
    match serde_json::from_slice::<Value>(body) {
        Ok(mut value) => {
            redact_value(&mut value);
            value.to_string()
        }
        Err(_) => String::from_utf8_lossy(body).to_string(),
    }
}

fn redact_value(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, field) in map.iter_mut() {
                if REDACTED_FIELDS.contains(&key.as_str()) {
                    *field = Value::String(REDACTED_VALUE.to_owned());
                } else {
                    redact_value(field);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact_value),
        _ => {}
    }
}

/// The longest prefix of `text` that fits in `limit` bytes without splitting a character.
fn truncate(text: &str, limit: usize) -> &str {
    if text.len() <= limit {
        return text;
    }

    let mut end = limit;

    while !text.is_char_boundary(end) {
        end -= 1;
    }

    &text[..end]
}

fn log_body(message: &str, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "{message}\nbody: {}...",
            truncate(body, LOG_BODY_LENGTH_LIMIT)
        );
        tracing::debug!("Full body: {body:?}");
    } else {
        tracing::info!("{message}\nbody: {body:?}");
    }
}
