//! Configuration management
//!
//! Configuration is read through `ConfigProvider`s (environment, memory,
//! or a chain of both) and loaded into `ModelConfig` and `AgentConfig`,
//! which validate themselves.

use std::collections::HashMap;
use std::env;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SummaryError};
use crate::util::parse_duration;

/// Upper bound on terminal lines handed to the agent
pub const MAX_TERMINAL_LINES: usize = 50;

/// Source of string configuration values
pub trait ConfigProvider: Send + Sync {
    /// Value of `key`; a missing key is a configuration error
    fn get_string(&self, key: &str) -> Result<String>;
}

/// Typed getters on top of `get_string`
pub trait ConfigProviderExt: ConfigProvider {
    fn get_int(&self, key: &str) -> Result<i64> {
        let value = self.get_string(key)?;
        value.parse::<i64>().map_err(|e| {
            SummaryError::configuration(format!("Invalid integer for key {}: {}", key, e))
        })
    }

    fn get_float(&self, key: &str) -> Result<f64> {
        let value = self.get_string(key)?;
        value.parse::<f64>().map_err(|e| {
            SummaryError::configuration(format!("Invalid float for key {}: {}", key, e))
        })
    }

    /// Accepts true/false, yes/no, 1/0, on/off
    fn get_bool(&self, key: &str) -> Result<bool> {
        let value = self.get_string(key)?;
        match value.to_lowercase().as_str() {
            "true" | "yes" | "1" | "on" => Ok(true),
            "false" | "no" | "0" | "off" => Ok(false),
            _ => Err(SummaryError::configuration(format!(
                "Invalid boolean value for key {}: {}",
                key, value
            ))),
        }
    }

    /// Get a duration such as `30s` or `2m`; bare numbers are seconds
    fn get_duration(&self, key: &str) -> Result<Duration> {
        let value = self.get_string(key)?;
        parse_duration(&value).ok_or_else(|| {
            SummaryError::configuration(format!("Invalid duration for key {}: {}", key, value))
        })
    }

    fn get_string_or(&self, key: &str, default: &str) -> String {
        self.get_string(key).unwrap_or_else(|_| default.to_string())
    }

    fn get_int_or(&self, key: &str, default: i64) -> i64 {
        self.get_int(key).unwrap_or(default)
    }

    fn get_float_or(&self, key: &str, default: f64) -> f64 {
        self.get_float(key).unwrap_or(default)
    }

    fn get_bool_or(&self, key: &str, default: bool) -> bool {
        self.get_bool(key).unwrap_or(default)
    }

    /// Get a duration configuration value with a default
    fn get_duration_or(&self, key: &str, default: Duration) -> Duration {
        self.get_duration(key).unwrap_or(default)
    }
}

impl<T: ConfigProvider + ?Sized> ConfigProviderExt for T {}

/// Reads `PREFIX_NAMESPACE_KEY` environment variables
#[derive(Debug, Clone, Default)]
pub struct EnvConfigProvider {
    /// e.g. `TERMINAL_SUMMARY`
    prefix: Option<String>,

    /// Optional namespace for variables (e.g., "MODEL", "AGENT")
    namespace: Option<String>,
}

impl EnvConfigProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// `model_base_url` becomes `PREFIX_NAMESPACE_MODEL_BASE_URL`
    fn format_key(&self, key: &str) -> String {
        let mut env_key = String::new();

        if let Some(ref prefix) = self.prefix {
            env_key.push_str(prefix);
            env_key.push('_');
        }

        if let Some(ref namespace) = self.namespace {
            env_key.push_str(namespace);
            env_key.push('_');
        }

        env_key.push_str(&key.to_uppercase().replace(|c: char| !c.is_ascii_alphanumeric(), "_"));

        env_key
    }
}

impl ConfigProvider for EnvConfigProvider {
    fn get_string(&self, key: &str) -> Result<String> {
        let env_key = self.format_key(key);

        env::var(&env_key).map_err(|e| match e {
            env::VarError::NotPresent => {
                SummaryError::configuration(format!("Environment variable not set: {}", env_key))
            }
            env::VarError::NotUnicode(_) => SummaryError::configuration(format!(
                "Environment variable is not valid unicode: {}",
                env_key
            )),
        })
    }
}

/// Fixed key/value configuration
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigProvider {
    values: HashMap<String, String>,
}

impl MemoryConfigProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values(values: HashMap<String, String>) -> Self {
        Self { values }
    }

    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: ToString,
    {
        self.values.insert(key.into(), value.to_string());
    }
}

impl ConfigProvider for MemoryConfigProvider {
    fn get_string(&self, key: &str) -> Result<String> {
        self.values.get(key).cloned().ok_or_else(|| {
            SummaryError::configuration(format!("Configuration key not found: {}", key))
        })
    }
}

/// Chain of providers; the first one knowing a key wins
#[derive(Default)]
pub struct CompositeConfigProvider {
    providers: Vec<Box<dyn ConfigProvider>>,
}

impl CompositeConfigProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_provider(&mut self, provider: impl ConfigProvider + 'static) {
        self.providers.push(Box::new(provider));
    }

    /// Add a provider and return self (builder pattern)
    pub fn with_provider(mut self, provider: impl ConfigProvider + 'static) -> Self {
        self.add_provider(provider);
        self
    }
}

impl ConfigProvider for CompositeConfigProvider {
    fn get_string(&self, key: &str) -> Result<String> {
        for provider in &self.providers {
            if let Ok(value) = provider.get_string(key) {
                return Ok(value);
            }
        }

        Err(SummaryError::configuration(format!(
            "Configuration key not found in any provider: {}",
            key
        )))
    }
}

/// Environment provider with the `TERMINAL_SUMMARY` prefix
pub static DEFAULT_PROVIDER: Lazy<Arc<EnvConfigProvider>> =
    Lazy::new(|| Arc::new(EnvConfigProvider::new().with_prefix("TERMINAL_SUMMARY")));

/// Trait for self-validating configuration sections
pub trait ServiceConfig: Debug + Send + Sync {
    /// Reject values the pipeline cannot work with
    fn validate(&self) -> Result<()>;

    /// Section name
    fn service_name(&self) -> &str;
}

/// Configuration of an OpenAI-compatible chat completion backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// API key
    pub api_key: String,

    /// Organization ID (optional)
    pub org_id: Option<String>,

    /// Base URL (can be changed for proxies and local servers)
    pub base_url: String,

    /// Model name sent to the backend
    pub model: String,

    /// Request timeout in seconds
    pub timeout_seconds: u64,

    /// Sampling temperature
    pub temperature: Option<f32>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            org_id: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
            timeout_seconds: 60,
            temperature: None,
        }
    }
}

impl ModelConfig {
    /// Load from a provider; only the API key is mandatory
    pub fn from_provider<P: ConfigProvider + ?Sized>(provider: &P) -> Result<Self> {
        let defaults = Self::default();

        let config = Self {
            api_key: provider.get_string("model_api_key")?,
            org_id: provider.get_string("model_org_id").ok(),
            base_url: provider.get_string_or("model_base_url", &defaults.base_url),
            model: provider.get_string_or("model_name", &defaults.model),
            timeout_seconds: provider
                .get_duration_or("model_timeout", Duration::from_secs(defaults.timeout_seconds))
                .as_secs(),
            temperature: provider.get_float("model_temperature").ok().map(|t| t as f32),
        };

        config.validate()?;
        Ok(config)
    }

    /// The identifier a registry matches requirements against, e.g. `openai/gpt-4o`
    pub fn identifier(&self) -> String {
        format!("openai/{}", self.model)
    }
}

impl ServiceConfig for ModelConfig {
    fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(SummaryError::configuration("Model API key is required"));
        }

        if self.model.is_empty() {
            return Err(SummaryError::configuration("Model name is required"));
        }

        url::Url::parse(&self.base_url).map_err(|e| {
            SummaryError::configuration(format!("Invalid model base URL {}: {}", self.base_url, e))
        })?;

        if self.timeout_seconds == 0 {
            return Err(SummaryError::configuration("Model timeout must be positive"));
        }

        if let Some(temperature) = self.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(SummaryError::configuration(format!(
                    "Model temperature out of range: {}",
                    temperature
                )));
            }
        }

        Ok(())
    }

    fn service_name(&self) -> &str {
        "model"
    }
}

/// Configuration of the terminal summary agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Agent identifier attached to every outbound request
    pub agent_id: String,

    /// Purpose of the agent's language model requirement
    pub purpose: String,

    /// Preferred model identifier
    pub model_identifier: String,

    /// Whether any registered model may serve the agent when the preferred one is missing
    pub allow_fallback_model: bool,

    /// How many terminal lines the context gatherer hands over
    pub max_terminal_lines: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            agent_id: "Terminal Summary".to_string(),
            purpose: "summarize-terminal-output".to_string(),
            model_identifier: "openai/gpt-4o".to_string(),
            allow_fallback_model: true,
            max_terminal_lines: MAX_TERMINAL_LINES,
        }
    }
}

impl AgentConfig {
    /// Load from a provider, falling back to defaults
    pub fn from_provider<P: ConfigProvider + ?Sized>(provider: &P) -> Result<Self> {
        let defaults = Self::default();

        let max_terminal_lines = provider.get_int_or(
            "agent_max_terminal_lines",
            defaults.max_terminal_lines as i64,
        );

        let config = Self {
            agent_id: provider.get_string_or("agent_id", &defaults.agent_id),
            purpose: provider.get_string_or("agent_purpose", &defaults.purpose),
            model_identifier: provider
                .get_string_or("agent_model_identifier", &defaults.model_identifier),
            allow_fallback_model: provider
                .get_bool_or("agent_allow_fallback_model", defaults.allow_fallback_model),
            max_terminal_lines: usize::try_from(max_terminal_lines).map_err(|_| {
                SummaryError::configuration(format!(
                    "Invalid terminal line count: {}",
                    max_terminal_lines
                ))
            })?,
        };

        config.validate()?;
        Ok(config)
    }
}

impl ServiceConfig for AgentConfig {
    fn validate(&self) -> Result<()> {
        if self.agent_id.is_empty() {
            return Err(SummaryError::configuration("Agent id is required"));
        }

        if self.max_terminal_lines > MAX_TERMINAL_LINES {
            return Err(SummaryError::configuration(format!(
                "At most {} terminal lines may be sent, got {}",
                MAX_TERMINAL_LINES, self.max_terminal_lines
            )));
        }

        Ok(())
    }

    fn service_name(&self) -> &str {
        "agent"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_config_provider_key_format() {
        let provider = EnvConfigProvider::new()
            .with_prefix("TERMINAL_SUMMARY")
            .with_namespace("TEST");

        assert_eq!(provider.format_key("model_api_key"), "TERMINAL_SUMMARY_TEST_MODEL_API_KEY");
        assert_eq!(provider.format_key("base-url"), "TERMINAL_SUMMARY_TEST_BASE_URL");
    }

    #[test]
    fn test_model_config_identifier() {
        let config = ModelConfig {
            model: "gpt-4o-mini".to_string(),
            ..ModelConfig::default()
        };
        assert_eq!(config.identifier(), "openai/gpt-4o-mini");
    }
}
