//! Tests for error handling functionality
//!
//! These tests verify that the error system in the SDK works correctly.

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;
    use serde_json::json;

    use crate::error::{mapping, ErrorContext, SummaryError};
    use crate::schema::ValidationError;

    #[test]
    fn test_summary_error_creation() {
        let network_err = SummaryError::network("Connection failed");
        let auth_err = SummaryError::authentication("Invalid credentials");
        let prompt_err = SummaryError::prompt_resolution("missing parameters: cwd");

        assert_eq!(network_err.to_string(), "Network error: Connection failed");
        assert_eq!(auth_err.to_string(), "Authentication error: Invalid credentials");
        assert_eq!(
            prompt_err.to_string(),
            "Prompt resolution error: missing parameters: cwd"
        );
        assert_eq!(SummaryError::NoActiveTerminal.to_string(), "No active terminal found");

        assert!(network_err.is_retryable());
        assert!(!auth_err.is_retryable());
        assert!(!prompt_err.is_retryable());
    }

    #[test]
    fn test_error_context() {
        let context = ErrorContext::for_service("openai")
            .status_code(504)
            .request_id("req-123")
            .endpoint("chat/completions")
            .with("attempt", 1);

        let err = SummaryError::timeout("Gateway timeout").with_context(context);

        assert_eq!(err.service_name(), Some("openai"));
        assert_eq!(err.status_code(), Some(504));
        assert_eq!(err.request_id(), Some("req-123"));
        assert!(err.is_retryable());
        assert!(err.to_string().contains("Gateway timeout"));
        assert!(matches!(err.root(), SummaryError::Timeout(_)));
    }

    #[test]
    fn test_nested_context_keeps_inner_details() {
        let inner = SummaryError::service("boom")
            .with_context(ErrorContext::for_service("openai").status_code(500));
        let outer = inner.with_context(ErrorContext::for_service("openai").request_id("req-9"));

        assert_eq!(outer.status_code(), Some(500));
        assert_eq!(outer.request_id(), Some("req-9"));
        assert!(matches!(outer.root(), SummaryError::Service(_)));
    }

    #[test]
    fn test_schema_errors_convert() {
        let err: SummaryError = ValidationError::MissingField {
            path: "$.errors".to_string(),
        }
        .into();
        assert!(matches!(err, SummaryError::Schema(_)));
        assert!(err.to_string().contains("$.errors"));
    }

    #[test]
    fn test_openai_error_mapping() {
        let mut context = ErrorContext::for_service("openai");
        let body = json!({
            "error": {
                "message": "Incorrect API key provided",
                "type": "invalid_request_error",
                "code": "invalid_api_key"
            }
        });

        let err = mapping::map_openai_error(StatusCode::UNAUTHORIZED, &body, &mut context);
        assert!(matches!(err, SummaryError::Authentication(ref m) if m == "Incorrect API key provided"));
        assert_eq!(context.error_code.as_deref(), Some("invalid_api_key"));
        assert_eq!(context.data.get("error_type").map(String::as_str), Some("invalid_request_error"));
    }

    #[test]
    fn test_string_error_body_mapping() {
        let mut context = ErrorContext::new();
        let body = json!({ "error": "model 'llama9' not found" });

        let err = mapping::map_openai_error(StatusCode::NOT_FOUND, &body, &mut context);
        assert!(matches!(err, SummaryError::ModelUnavailable(ref m) if m.contains("llama9")));
    }

    #[test]
    fn test_http_error_mapping() {
        let mut context = ErrorContext::new();

        let err = mapping::map_http_error(StatusCode::TOO_MANY_REQUESTS, "slow down", &mut context);
        assert!(matches!(err, SummaryError::RateLimit(_)));

        let err = mapping::map_http_error(StatusCode::BAD_GATEWAY, "", &mut context);
        assert!(matches!(err, SummaryError::Service(_)));

        let long_body = "x".repeat(500);
        let err = mapping::map_http_error(StatusCode::INTERNAL_SERVER_ERROR, &long_body, &mut context);
        assert!(err.to_string().len() < 200);
    }

    #[test]
    fn test_classify_http_error() {
        assert_eq!(mapping::classify_http_error(StatusCode::UNAUTHORIZED), "authentication");
        assert_eq!(mapping::classify_http_error(StatusCode::GATEWAY_TIMEOUT), "timeout");
        assert_eq!(mapping::classify_http_error(StatusCode::SERVICE_UNAVAILABLE), "server");
    }
}
