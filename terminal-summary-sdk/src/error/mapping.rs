//! Error mapping for model service HTTP responses
//!
//! Converts error bodies returned by OpenAI-compatible endpoints into
//! normalized `SummaryError` variants.

use reqwest::StatusCode;
use serde_json::Value;

use super::{ErrorContext, SummaryError};

/// Map an OpenAI-style `{"error": {...}}` body to a SummaryError
pub fn map_openai_error(
    status: StatusCode,
    json: &Value,
    context: &mut ErrorContext,
) -> SummaryError {
    let message = match json.get("error") {
        Some(error) => {
            if let Some(error_type) = error.get("type").and_then(|t| t.as_str()) {
                context.add("error_type", error_type);
            }

            if let Some(code) = error.get("code").and_then(|c| c.as_str()) {
                context.error_code = Some(code.to_string());
            }

            // Some proxies send `"error": "text"` instead of an object
            error
                .get("message")
                .and_then(|m| m.as_str())
                .or_else(|| error.as_str())
                .unwrap_or("Unknown model service error")
        }
        None => json
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown model service error"),
    };

    map_status(status, message)
}

/// Map a generic HTTP error to a SummaryError
pub fn map_http_error(status: StatusCode, body: &str, context: &mut ErrorContext) -> SummaryError {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        return map_openai_error(status, &json, context);
    }

    let message = if body.is_empty() {
        status.to_string()
    } else {
        format!("{}: {}", status, crate::util::truncate_string(body, 100))
    };

    map_status(status, message)
}

fn map_status(status: StatusCode, message: impl Into<String>) -> SummaryError {
    let message = message.into();
    match status {
        StatusCode::UNAUTHORIZED => SummaryError::authentication(message),
        StatusCode::FORBIDDEN => SummaryError::authorization(message),
        StatusCode::TOO_MANY_REQUESTS => SummaryError::rate_limit(message),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            SummaryError::validation(message)
        }
        StatusCode::NOT_FOUND => SummaryError::model_unavailable(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => SummaryError::timeout(message),
        _ => SummaryError::service(message),
    }
}

/// Helper function to classify HTTP errors by category
pub fn classify_http_error(status: StatusCode) -> &'static str {
    match status.as_u16() {
        400 | 422 => "validation",
        401 => "authentication",
        403 => "authorization",
        404 => "not_found",
        408 | 504 => "timeout",
        429 => "rate_limit",
        500..=599 => "server",
        _ => "unknown",
    }
}
