//! Tests for configuration management
//!
//! These tests verify provider chaining and loading of the model and agent
//! configuration sections.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use crate::config::{
        AgentConfig, CompositeConfigProvider, ConfigProvider, ConfigProviderExt,
        MemoryConfigProvider, ModelConfig, ServiceConfig, MAX_TERMINAL_LINES,
    };
    use crate::error::SummaryError;

    fn provider(values: &[(&str, &str)]) -> MemoryConfigProvider {
        let values: HashMap<String, String> = values
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        MemoryConfigProvider::with_values(values)
    }

    #[test]
    fn test_typed_getters() {
        let provider = provider(&[
            ("count", "42"),
            ("ratio", "0.5"),
            ("enabled", "yes"),
            ("timeout", "2m"),
            ("broken", "maybe"),
        ]);

        assert_eq!(provider.get_int("count").unwrap(), 42);
        assert_eq!(provider.get_float("ratio").unwrap(), 0.5);
        assert!(provider.get_bool("enabled").unwrap());
        assert_eq!(provider.get_duration("timeout").unwrap(), Duration::from_secs(120));
        assert!(provider.get_bool("broken").is_err());
        assert_eq!(provider.get_int_or("missing", 7), 7);
        assert_eq!(provider.get_string_or("missing", "fallback"), "fallback");
    }

    #[test]
    fn test_composite_provider_order() {
        let mut first = MemoryConfigProvider::new();
        first.set("model_name", "gpt-4o-mini");

        let mut second = MemoryConfigProvider::new();
        second.set("model_name", "gpt-4o");
        second.set("model_api_key", "sk-second");

        let composite = CompositeConfigProvider::new()
            .with_provider(first)
            .with_provider(second);

        assert_eq!(composite.get_string("model_name").unwrap(), "gpt-4o-mini");
        assert_eq!(composite.get_string("model_api_key").unwrap(), "sk-second");

        let err = composite.get_string("missing").unwrap_err();
        assert!(matches!(err, SummaryError::Configuration(_)));
    }

    #[test]
    fn test_model_config_from_provider() {
        let config = ModelConfig::from_provider(&provider(&[
            ("model_api_key", "sk-test"),
            ("model_base_url", "http://localhost:11434/v1"),
            ("model_timeout", "15s"),
            ("model_temperature", "0.2"),
        ]))
        .unwrap();

        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.base_url, "http://localhost:11434/v1");
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.timeout_seconds, 15);
        assert_eq!(config.temperature, Some(0.2));
        assert_eq!(config.org_id, None);
    }

    #[test]
    fn test_overflowing_timeout_uses_default() {
        let config = ModelConfig::from_provider(&provider(&[
            ("model_api_key", "sk-test"),
            ("model_timeout", "999999999999999999h"),
        ]))
        .unwrap();

        assert_eq!(config.timeout_seconds, 60);
    }

    #[test]
    fn test_model_config_requires_api_key() {
        let err = ModelConfig::from_provider(&provider(&[])).unwrap_err();
        assert!(matches!(err, SummaryError::Configuration(_)));
    }

    #[test]
    fn test_model_config_validation() {
        let valid = ModelConfig {
            api_key: "sk-test".to_string(),
            ..ModelConfig::default()
        };
        assert!(valid.validate().is_ok());

        let bad_url = ModelConfig {
            base_url: "not a url".to_string(),
            ..valid.clone()
        };
        assert!(bad_url.validate().is_err());

        let bad_temperature = ModelConfig {
            temperature: Some(3.0),
            ..valid.clone()
        };
        assert!(bad_temperature.validate().is_err());

        let no_timeout = ModelConfig {
            timeout_seconds: 0,
            ..valid
        };
        assert!(no_timeout.validate().is_err());
    }

    #[test]
    fn test_agent_config_defaults() {
        let config = AgentConfig::from_provider(&provider(&[])).unwrap();
        assert_eq!(config.agent_id, "Terminal Summary");
        assert_eq!(config.purpose, "summarize-terminal-output");
        assert_eq!(config.model_identifier, "openai/gpt-4o");
        assert!(config.allow_fallback_model);
        assert_eq!(config.max_terminal_lines, MAX_TERMINAL_LINES);
    }

    #[test]
    fn test_agent_config_line_bound() {
        let config = AgentConfig::from_provider(&provider(&[
            ("agent_max_terminal_lines", "20"),
            ("agent_allow_fallback_model", "false"),
        ]))
        .unwrap();
        assert_eq!(config.max_terminal_lines, 20);
        assert!(!config.allow_fallback_model);

        assert!(AgentConfig::from_provider(&provider(&[("agent_max_terminal_lines", "51")])).is_err());
        assert!(AgentConfig::from_provider(&provider(&[("agent_max_terminal_lines", "-1")])).is_err());
    }
}
