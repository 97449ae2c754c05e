//! # Terminal Summary SDK
//!
//! Structured summaries of terminal output, produced by a language model.
//!
//! This crate provides:
//!
//! - A prompt template store with named variants and `{{placeholder}}` rendering
//! - The `Summary` schema and a validator that never panics on model output
//! - A two-tier response normalizer (structured data first, then JSON
//!   extracted from free text)
//! - `TerminalSummaryAgent`, the orchestrator behind `get_summary`
//! - Terminal activity tracking and a summary service for the UI layer
//! - An OpenAI-compatible model backend
//!
//! ## Architecture
//!
//! - `PromptService`: resolves prompt ids to final text
//! - `LanguageModelRegistry` / `LanguageModel`: select and call a model
//! - `normalize`: turns any `ModelResponse` into `Option<Summary>`
//! - `TerminalHost`: port to whatever owns the terminals
//! - `SummaryError`: error type of every fallible step

// Prompt templates
pub mod prompt;
pub use prompt::{PromptService, PromptTemplateStore};

// Summary schema
pub mod schema;
pub use schema::{validate, ErrorCategory, ErrorDetail, Summary, ValidationError};

// Response normalization
pub mod normalizer;
pub use normalizer::normalize;

// Model abstraction and backends
pub mod model;
pub use model::{openai, LanguageModel, LanguageModelRegistry, ModelResponse, StaticModelRegistry};

// Orchestration
pub mod agent;
pub use agent::TerminalSummaryAgent;

// Terminal side
pub mod terminal;
pub use terminal::{SummaryRequest, SummaryService, SummarySignal, TerminalActivityTracker, TerminalHost};

// Re-export error handling
pub mod error;
pub use error::{ErrorContext, Result, SummaryError};

// Re-export configuration management
pub mod config;
pub use config::{AgentConfig, ConfigProvider, ModelConfig, ServiceConfig};

// Utility module for common functionality
mod util;

#[cfg(test)]
mod tests;
