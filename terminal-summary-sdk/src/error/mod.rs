//! Error handling for the terminal summary SDK
//!
//! Every fallible step of the pipeline reports a `SummaryError`:
//! - Categorizes errors by type (prompt, schema, network, auth, etc.)
//! - Adds request context (service, status code, request id) for logging
//! - Maps HTTP error bodies of model backends to normalized variants
//!
//! The summary agent itself never surfaces these to its caller; they exist
//! so the failure cause can be logged before it degrades to "no summary".

use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

use crate::schema::ValidationError;

pub mod mapping;

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, SummaryError>;

/// Main error type for the SDK
#[derive(Error, Debug)]
pub enum SummaryError {
    /// A prompt template could not be found or fully resolved
    #[error("Prompt resolution error: {0}")]
    PromptResolution(String),

    /// No language model satisfies the agent's requirement
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// There is no terminal to gather context from
    #[error("No active terminal found")]
    NoActiveTerminal,

    /// Candidate data did not match the summary schema
    #[error("Schema validation error: {0}")]
    Schema(#[from] ValidationError),

    /// Connection failures before any response arrived
    #[error("Network error: {0}")]
    Network(String),

    /// Authentication errors
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// The credentials lack access to the model
    #[error("Authorization error: {0}")]
    Authorization(String),

    /// Rate limiting errors reported by the model service
    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    /// Model service errors
    #[error("Service error: {0}")]
    Service(String),

    /// The model service rejected the request body
    #[error("Validation error: {0}")]
    Validation(String),

    /// A response could not be decoded
    #[error("Parsing error: {0}")]
    Parsing(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Timeout errors
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// Anything else
    #[error("Internal error: {0}")]
    Internal(String),

    /// An error wrapped with request context
    #[error("{inner}")]
    WithContext {
        inner: Box<SummaryError>,
        context: ErrorContext,
    },
}

impl SummaryError {
    pub fn prompt_resolution(message: impl Into<String>) -> Self {
        SummaryError::PromptResolution(message.into())
    }

    pub fn model_unavailable(message: impl Into<String>) -> Self {
        SummaryError::ModelUnavailable(message.into())
    }

    pub fn network(message: impl Into<String>) -> Self {
        SummaryError::Network(message.into())
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        SummaryError::Authentication(message.into())
    }

    pub fn authorization(message: impl Into<String>) -> Self {
        SummaryError::Authorization(message.into())
    }

    pub fn rate_limit(message: impl Into<String>) -> Self {
        SummaryError::RateLimit(message.into())
    }

    pub fn service(message: impl Into<String>) -> Self {
        SummaryError::Service(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        SummaryError::Validation(message.into())
    }

    pub fn parsing(message: impl Into<String>) -> Self {
        SummaryError::Parsing(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        SummaryError::Configuration(message.into())
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        SummaryError::Timeout(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        SummaryError::Internal(message.into())
    }

    /// Wrap with request context
    pub fn with_context(self, context: ErrorContext) -> Self {
        SummaryError::WithContext {
            inner: Box::new(self),
            context,
        }
    }

    /// Wrap with a single context entry
    pub fn with_context_value(self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        let mut context = ErrorContext::new();
        context.add(key, value);
        self.with_context(context)
    }

    /// The error without any context wrappers
    pub fn root(&self) -> &SummaryError {
        match self {
            SummaryError::WithContext { inner, .. } => inner.root(),
            other => other,
        }
    }

    /// Service of the outermost context
    pub fn service_name(&self) -> Option<&str> {
        match self {
            SummaryError::WithContext { context, .. } => Some(&context.service),
            _ => None,
        }
    }

    /// First HTTP status found in the context chain
    pub fn status_code(&self) -> Option<u16> {
        match self {
            SummaryError::WithContext { context, inner } => {
                context.status_code.or_else(|| inner.status_code())
            }
            _ => None,
        }
    }

    /// Get the request ID if available
    pub fn request_id(&self) -> Option<&str> {
        match self {
            SummaryError::WithContext { context, inner } => {
                context.request_id.as_deref().or_else(|| inner.request_id())
            }
            _ => None,
        }
    }

    /// Check whether a later, independent attempt could succeed.
    ///
    /// Only used for log classification: the agent never retries.
    pub fn is_retryable(&self) -> bool {
        match self {
            SummaryError::Network(_) => true,
            SummaryError::Timeout(_) => true,
            SummaryError::RateLimit(_) => true,
            SummaryError::ModelUnavailable(_) => true,
            SummaryError::WithContext { inner, .. } => inner.is_retryable(),
            _ => false,
        }
    }
}

/// Where and when an error happened
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// Backend that produced the error
    pub service: String,

    /// When the error was recorded
    pub timestamp: Option<chrono::DateTime<chrono::Utc>>,

    pub status_code: Option<u16>,

    /// Error code reported by the backend, e.g. `invalid_api_key`
    pub error_code: Option<String>,

    /// Correlation id of the failed request
    pub request_id: Option<String>,

    pub endpoint: Option<String>,

    /// Free-form entries, e.g. the prompt being resolved
    pub data: HashMap<String, String>,
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self {
            service: "unknown".to_string(),
            timestamp: Some(chrono::Utc::now()),
            status_code: None,
            error_code: None,
            request_id: None,
            endpoint: None,
            data: HashMap::new(),
        }
    }
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context attributed to a backend
    pub fn for_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            ..Self::default()
        }
    }

    pub fn status_code(mut self, code: u16) -> Self {
        self.status_code = Some(code);
        self
    }

    /// Add an error code
    pub fn error_code(mut self, code: impl Into<String>) -> Self {
        self.error_code = Some(code.into());
        self
    }

    /// Add a request ID
    pub fn request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    /// Add an endpoint
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Add a context value
    pub fn add<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: fmt::Display,
    {
        self.data.insert(key.into(), value.to_string());
    }

    pub fn with<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: fmt::Display,
    {
        self.add(key, value);
        self
    }
}

/// Convert reqwest errors to SummaryError
impl From<reqwest::Error> for SummaryError {
    fn from(err: reqwest::Error) -> Self {
        let context = ErrorContext::for_service("http_client");

        let summary_error = if err.is_timeout() {
            SummaryError::timeout(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            SummaryError::network(format!("Connection error: {}", err))
        } else if err.is_request() {
            SummaryError::network(format!("Request failed: {}", err))
        } else if err.is_decode() {
            SummaryError::parsing(format!("Response decode error: {}", err))
        } else {
            SummaryError::internal(format!("HTTP client error: {}", err))
        };

        if let Some(status) = err.status() {
            summary_error.with_context(context.status_code(status.as_u16()))
        } else {
            summary_error.with_context(context)
        }
    }
}

/// Convert serde_json errors to SummaryError
impl From<serde_json::Error> for SummaryError {
    fn from(err: serde_json::Error) -> Self {
        SummaryError::parsing(format!("JSON error: {}", err))
            .with_context(ErrorContext::for_service("json"))
    }
}
