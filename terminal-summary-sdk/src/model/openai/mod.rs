//! OpenAI-compatible chat completion backend
//!
//! Sends the agent's messages to `{base_url}/chat/completions` together with
//! the requested `response_format`. When the service honours a JSON schema
//! the returned content is valid JSON and comes back as
//! `ModelResponse::Parsed`; anything else is handed on as text.

mod models;
pub use models::*;

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;

use crate::config::{ConfigProvider, ModelConfig, ServiceConfig};
use crate::error::{ErrorContext, Result, SummaryError};
use crate::model::{
    build_http_client, parse_error_response, LanguageModel, LanguageModelRequest, ModelResponse,
    UserAgent,
};
use crate::schema::ResponseFormat;

const SERVICE_NAME: &str = "openai";
const CHAT_COMPLETIONS: &str = "chat/completions";

/// Chat completion model served by an OpenAI-compatible endpoint
pub struct OpenAIModel {
    http_client: Client,
    config: ModelConfig,
    id: String,
}

impl OpenAIModel {
    /// Create a model from a validated configuration
    pub fn new(config: ModelConfig) -> Result<Self> {
        config.validate()?;

        let http_client = build_http_client(
            Some(UserAgent {
                extra: Some("openai".to_string()),
                ..UserAgent::default()
            }),
            Some(Duration::from_secs(config.timeout_seconds)),
        )?;

        Ok(Self {
            http_client,
            id: config.identifier(),
            config,
        })
    }

    /// Create a model from a config provider
    pub fn from_provider<P: ConfigProvider + ?Sized>(provider: &P) -> Result<Self> {
        Self::new(ModelConfig::from_provider(provider)?)
    }

    /// Create a new builder
    pub fn builder() -> OpenAIModelBuilder {
        OpenAIModelBuilder::default()
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), endpoint)
    }

    /// Translate an agent request into the chat completion wire format
    pub fn to_chat_request(&self, request: &LanguageModelRequest) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: request
                .messages
                .iter()
                .map(|m| ChatMessage {
                    role: m.role.as_str().to_string(),
                    content: m.text.clone(),
                })
                .collect(),
            temperature: self.config.temperature,
            response_format: request.response_format.clone(),
            user: None,
        }
    }

    /// Send a raw chat completion request
    pub async fn chat_completion(
        &self,
        request: &ChatCompletionRequest,
        request_id: &str,
    ) -> Result<ChatCompletionResponse> {
        let url = self.endpoint_url(CHAT_COMPLETIONS);
        debug!("Sending request {} to {}: POST {}", request_id, SERVICE_NAME, url);

        let mut builder = self
            .http_client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(request);

        if let Some(ref org) = self.config.org_id {
            builder = builder.header("OpenAI-Organization", org);
        }

        let response = builder.send().await.map_err(|e| {
            SummaryError::from(e).with_context(
                ErrorContext::for_service(SERVICE_NAME)
                    .endpoint(CHAT_COMPLETIONS)
                    .request_id(request_id),
            )
        })?;

        if !response.status().is_success() {
            let error = parse_error_response(SERVICE_NAME, CHAT_COMPLETIONS, response).await;
            return Err(error.with_context(
                ErrorContext::for_service(SERVICE_NAME).request_id(request_id),
            ));
        }

        response.json::<ChatCompletionResponse>().await.map_err(|e| {
            SummaryError::parsing(format!("Failed to parse chat completion: {}", e))
                .with_context(ErrorContext::for_service(SERVICE_NAME).request_id(request_id))
        })
    }
}

/// Decide how the content of a completion is handed to the normalizer
fn into_model_response(content: String, requested: Option<&ResponseFormat>) -> ModelResponse {
    let wants_json = matches!(
        requested,
        Some(ResponseFormat::JsonSchema { .. }) | Some(ResponseFormat::JsonObject)
    );

    if wants_json {
        if let Ok(parsed) = serde_json::from_str(content.trim()) {
            return ModelResponse::Parsed {
                parsed,
                text: Some(content),
            };
        }
        debug!("Structured output requested but content is not plain JSON");
    }

    ModelResponse::Text(content)
}

#[async_trait]
impl LanguageModel for OpenAIModel {
    fn id(&self) -> &str {
        &self.id
    }

    async fn send_request(&self, request: &LanguageModelRequest) -> Result<ModelResponse> {
        let chat_request = self.to_chat_request(request);
        let response = self.chat_completion(&chat_request, &request.request_id).await?;

        if let Some(ref usage) = response.usage {
            debug!(
                "Request {} used {} tokens ({} prompt, {} completion)",
                request.request_id, usage.total_tokens, usage.prompt_tokens, usage.completion_tokens
            );
        }

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| SummaryError::parsing("No completion choices returned"))?;

        if let Some(refusal) = choice.message.refusal {
            warn!("Model {} refused request {}", self.id, request.request_id);
            return Err(SummaryError::service(format!("Model refused: {}", refusal)));
        }

        let content = choice
            .message
            .content
            .ok_or_else(|| SummaryError::parsing("Empty completion response"))?;

        Ok(into_model_response(content, request.response_format.as_ref()))
    }
}

/// Builder for an OpenAI-compatible model
#[derive(Default)]
pub struct OpenAIModelBuilder {
    api_key: Option<String>,
    org_id: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    timeout_seconds: Option<u64>,
    temperature: Option<f32>,
}

impl OpenAIModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API key
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the organization ID
    pub fn org_id(mut self, org_id: impl Into<String>) -> Self {
        self.org_id = Some(org_id.into());
        self
    }

    /// Set the base URL
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the model name
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the timeout in seconds
    pub fn timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = Some(seconds);
        self
    }

    /// Set the sampling temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Build the model; the resulting configuration must validate
    pub fn build(self) -> Result<OpenAIModel> {
        let mut config = ModelConfig::default();

        if let Some(api_key) = self.api_key {
            config.api_key = api_key;
        }

        config.org_id = self.org_id;

        if let Some(base_url) = self.base_url {
            config.base_url = base_url;
        }

        if let Some(model) = self.model {
            config.model = model;
        }

        if let Some(timeout) = self.timeout_seconds {
            config.timeout_seconds = timeout;
        }

        config.temperature = self.temperature;

        OpenAIModel::new(config)
    }
}
