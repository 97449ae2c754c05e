//! Terminal summary agent
//!
//! `TerminalSummaryAgent::get_summary` is the single entry point of the
//! pipeline: select a model, resolve the system and user prompts, send one
//! request carrying the summary schema, and normalize the answer.
//!
//! Every failure (no model, unresolved prompts, transport error, invalid
//! answer) ends in `None`. Causes are only visible in the logs.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use log::{debug, error, info, warn};

use crate::config::AgentConfig;
use crate::error::Result;
use crate::model::{
    LanguageModel, LanguageModelRegistry, LanguageModelRequest, LanguageModelRequirement,
    RequestMessage,
};
use crate::normalizer::normalize;
use crate::prompt::{PromptParams, PromptService, SYSTEM_PROMPT_ID, USER_PROMPT_ID};
use crate::schema::{ResponseFormat, Summary};
use crate::util::{generate_request_id, measure_time_async};

/// Agent producing structured summaries of terminal output
pub struct TerminalSummaryAgent {
    config: AgentConfig,
    models: Arc<dyn LanguageModelRegistry>,
    prompts: Arc<dyn PromptService>,
    exchanges: AtomicU64,
}

impl TerminalSummaryAgent {
    pub fn new(
        config: AgentConfig,
        models: Arc<dyn LanguageModelRegistry>,
        prompts: Arc<dyn PromptService>,
    ) -> Self {
        Self {
            config,
            models,
            prompts,
            exchanges: AtomicU64::new(0),
        }
    }

    /// Identifier attached to every outbound request
    pub fn id(&self) -> &str {
        &self.config.agent_id
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// The requirement used to select a model
    pub fn language_model_requirement(&self) -> LanguageModelRequirement {
        LanguageModelRequirement {
            agent_id: self.config.agent_id.clone(),
            purpose: self.config.purpose.clone(),
            identifier: Some(self.config.model_identifier.clone()),
            allow_fallback: self.config.allow_fallback_model,
        }
    }

    /// Build the request for one exchange; prompt failures are errors
    pub fn build_request(
        &self,
        cwd: &str,
        shell: &str,
        recent_terminal_contents: &[String],
    ) -> Result<LanguageModelRequest> {
        let params = PromptParams::new()
            .with("shell", shell)
            .with("cwd", cwd)
            .with("recentTerminalContents", recent_terminal_contents);

        let system = self.prompts.resolve(SYSTEM_PROMPT_ID, &params)?;
        let user = self.prompts.resolve(USER_PROMPT_ID, &params)?;

        // no conversation is kept, so every request is its own session
        Ok(LanguageModelRequest {
            messages: vec![
                RequestMessage::system(system.text),
                RequestMessage::user(user.text),
            ],
            response_format: Some(ResponseFormat::terminal_summary()),
            agent_id: self.config.agent_id.clone(),
            request_id: generate_request_id(),
            session_id: generate_request_id(),
        })
    }

    /// Summarize the last command of a terminal.
    ///
    /// `recent_terminal_contents` is passed through as given, most recent
    /// line first; bounding it is the caller's job.
    pub async fn get_summary(
        &self,
        cwd: &str,
        shell: &str,
        recent_terminal_contents: &[String],
    ) -> Option<Summary> {
        let exchange = self.exchanges.fetch_add(1, Ordering::Relaxed) + 1;

        let requirement = self.language_model_requirement();
        let Some(model) = self.models.select_language_model(&requirement).await else {
            error!("No language model available for the {} agent", self.config.agent_id);
            return None;
        };

        let request = match self.build_request(cwd, shell, recent_terminal_contents) {
            Ok(request) => request,
            Err(e) => {
                error!("Prompts for the {} agent could not be resolved: {}", self.config.agent_id, e);
                return None;
            }
        };

        info!(
            "Exchange #{} (session {}, request {}): summarizing {} terminal lines with {}",
            exchange,
            request.session_id,
            request.request_id,
            recent_terminal_contents.len(),
            model.id()
        );

        self.send(model.as_ref(), &request).await
    }

    async fn send(&self, model: &dyn LanguageModel, request: &LanguageModelRequest) -> Option<Summary> {
        let (result, elapsed) = measure_time_async(|| model.send_request(request)).await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                error!(
                    "Error obtaining the command output summary for request {}: {} (retryable: {})",
                    request.request_id,
                    e,
                    e.is_retryable()
                );
                return None;
            }
        };

        debug!(
            "Request {} answered with a {} response in {:?}",
            request.request_id,
            response.kind(),
            elapsed
        );

        let summary = normalize(response).await;
        if summary.is_none() {
            warn!(
                "Response to request {} did not match the summary schema",
                request.request_id
            );
        }
        summary
    }
}
