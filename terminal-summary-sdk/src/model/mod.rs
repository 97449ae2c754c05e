//! Language model boundary
//!
//! The summary agent talks to models only through these traits:
//!
//! - `LanguageModel`: sends one request, returns one `ModelResponse`
//! - `LanguageModelRegistry`: picks a model for a `LanguageModelRequirement`
//!
//! `openai` provides an OpenAI-compatible chat completion backend and
//! `StaticModelRegistry` a fixed list of models to choose from.

mod common;
pub mod openai;

pub use common::{build_http_client, parse_error_response, UserAgent};

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::schema::ResponseFormat;

/// Author of a request message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A text message of an outbound request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequestMessage {
    pub role: Role,
    pub text: String,
}

impl RequestMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            text: text.into(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }
}

/// One request/response exchange with a model
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LanguageModelRequest {
    pub messages: Vec<RequestMessage>,

    /// Output format the model service should enforce, if it can
    pub response_format: Option<ResponseFormat>,

    pub agent_id: String,

    /// Correlation id of this request, for logs only
    pub request_id: String,

    /// Correlation id of the (single-request) session, for logs only
    pub session_id: String,
}

/// Stream of text chunks from a streaming backend
pub type TextStream = BoxStream<'static, Result<String>>;

/// What a model service returned
pub enum ModelResponse {
    /// The service already parsed its output against the requested schema
    Parsed {
        parsed: Value,
        /// Raw text the structured data was parsed from, when available
        text: Option<String>,
    },

    /// Plain text that may merely resemble the requested schema
    Text(String),

    /// Text delivered in chunks
    Stream(TextStream),
}

impl ModelResponse {
    pub fn parsed(parsed: Value) -> Self {
        ModelResponse::Parsed { parsed, text: None }
    }

    pub fn text(text: impl Into<String>) -> Self {
        ModelResponse::Text(text.into())
    }

    /// Short label for log lines
    pub fn kind(&self) -> &'static str {
        match self {
            ModelResponse::Parsed { .. } => "parsed",
            ModelResponse::Text(_) => "text",
            ModelResponse::Stream(_) => "stream",
        }
    }
}

impl fmt::Debug for ModelResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelResponse::Parsed { parsed, text } => f
                .debug_struct("Parsed")
                .field("parsed", parsed)
                .field("text", text)
                .finish(),
            ModelResponse::Text(text) => f.debug_tuple("Text").field(text).finish(),
            ModelResponse::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// What an agent needs from a model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageModelRequirement {
    pub agent_id: String,

    pub purpose: String,

    /// Preferred model identifier, e.g. `openai/gpt-4o`
    pub identifier: Option<String>,

    /// Accept any model when the preferred one is not registered
    pub allow_fallback: bool,
}

/// A model that can answer requests
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Identifier the registry matches requirements against
    fn id(&self) -> &str;

    /// Send a single request; any transport or service failure is an error
    async fn send_request(&self, request: &LanguageModelRequest) -> Result<ModelResponse>;
}

/// Chooses the model serving a requirement
#[async_trait]
pub trait LanguageModelRegistry: Send + Sync {
    /// `None` when no registered model fits
    async fn select_language_model(
        &self,
        requirement: &LanguageModelRequirement,
    ) -> Option<Arc<dyn LanguageModel>>;
}

/// Registry over a fixed, ordered list of models
#[derive(Default, Clone)]
pub struct StaticModelRegistry {
    models: Vec<Arc<dyn LanguageModel>>,
}

impl StaticModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model; earlier registrations win fallback selection
    pub fn register(&mut self, model: Arc<dyn LanguageModel>) {
        self.models.push(model);
    }

    /// Register a model and return self (builder pattern)
    pub fn with_model(mut self, model: Arc<dyn LanguageModel>) -> Self {
        self.register(model);
        self
    }

    pub fn model_ids(&self) -> Vec<String> {
        self.models.iter().map(|m| m.id().to_string()).collect()
    }
}

#[async_trait]
impl LanguageModelRegistry for StaticModelRegistry {
    async fn select_language_model(
        &self,
        requirement: &LanguageModelRequirement,
    ) -> Option<Arc<dyn LanguageModel>> {
        if let Some(ref identifier) = requirement.identifier {
            if let Some(model) = self.models.iter().find(|m| m.id() == identifier.as_str()) {
                return Some(Arc::clone(model));
            }

            if !requirement.allow_fallback {
                debug!(
                    "No model {} registered for {} ({})",
                    identifier, requirement.agent_id, requirement.purpose
                );
                return None;
            }
        }

        self.models.first().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NamedModel(&'static str);

    #[async_trait]
    impl LanguageModel for NamedModel {
        fn id(&self) -> &str {
            self.0
        }

        async fn send_request(&self, _request: &LanguageModelRequest) -> Result<ModelResponse> {
            Ok(ModelResponse::text(self.0))
        }
    }

    fn requirement(identifier: Option<&str>, allow_fallback: bool) -> LanguageModelRequirement {
        LanguageModelRequirement {
            agent_id: "Terminal Summary".to_string(),
            purpose: "summarize-terminal-output".to_string(),
            identifier: identifier.map(str::to_string),
            allow_fallback,
        }
    }

    #[tokio::test]
    async fn test_registry_prefers_exact_identifier() {
        let registry = StaticModelRegistry::new()
            .with_model(Arc::new(NamedModel("ollama/llama3")))
            .with_model(Arc::new(NamedModel("openai/gpt-4o")));

        let model = registry
            .select_language_model(&requirement(Some("openai/gpt-4o"), true))
            .await
            .unwrap();
        assert_eq!(model.id(), "openai/gpt-4o");
    }

    #[tokio::test]
    async fn test_registry_fallback() {
        let registry = StaticModelRegistry::new().with_model(Arc::new(NamedModel("ollama/llama3")));

        let fallback = registry
            .select_language_model(&requirement(Some("openai/gpt-4o"), true))
            .await;
        assert_eq!(fallback.map(|m| m.id().to_string()), Some("ollama/llama3".to_string()));

        let strict = registry
            .select_language_model(&requirement(Some("openai/gpt-4o"), false))
            .await;
        assert!(strict.is_none());
    }

    #[tokio::test]
    async fn test_empty_registry_selects_nothing() {
        let registry = StaticModelRegistry::new();
        assert!(registry
            .select_language_model(&requirement(None, true))
            .await
            .is_none());
    }

    #[test]
    fn test_model_response_kind() {
        assert_eq!(ModelResponse::parsed(serde_json::json!({})).kind(), "parsed");
        assert_eq!(ModelResponse::text("hi").kind(), "text");
        assert_eq!(format!("{:?}", ModelResponse::text("hi")), "Text(\"hi\")");
    }
}
