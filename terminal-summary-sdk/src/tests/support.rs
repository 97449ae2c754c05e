//! Test doubles shared by the test modules

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::agent::TerminalSummaryAgent;
use crate::config::AgentConfig;
use crate::error::Result;
use crate::model::{LanguageModel, LanguageModelRequest, ModelResponse, StaticModelRegistry};
use crate::prompt::PromptTemplateStore;

type Reply = Box<dyn Fn(&LanguageModelRequest) -> Result<ModelResponse> + Send + Sync>;

/// Model answering every request with the same scripted reply
pub struct ScriptedModel {
    id: String,
    reply: Reply,
    requests: Mutex<Vec<LanguageModelRequest>>,
}

impl ScriptedModel {
    pub fn new<F>(reply: F) -> Arc<Self>
    where
        F: Fn(&LanguageModelRequest) -> Result<ModelResponse> + Send + Sync + 'static,
    {
        Self::with_id("openai/gpt-4o", reply)
    }

    pub fn with_id<F>(id: &str, reply: F) -> Arc<Self>
    where
        F: Fn(&LanguageModelRequest) -> Result<ModelResponse> + Send + Sync + 'static,
    {
        Arc::new(Self {
            id: id.to_string(),
            reply: Box::new(reply),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Model whose every answer is this structured value
    pub fn parsed(value: Value) -> Arc<Self> {
        Self::new(move |_| Ok(ModelResponse::parsed(value.clone())))
    }

    /// Model whose every answer is this text
    pub fn text(text: &str) -> Arc<Self> {
        let text = text.to_string();
        Self::new(move |_| Ok(ModelResponse::text(text.clone())))
    }

    pub fn requests(&self) -> Vec<LanguageModelRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    fn id(&self) -> &str {
        &self.id
    }

    async fn send_request(&self, request: &LanguageModelRequest) -> Result<ModelResponse> {
        self.requests.lock().unwrap().push(request.clone());
        (self.reply)(request)
    }
}

/// Agent with the built-in prompts and a single model
pub fn agent_with(model: Arc<ScriptedModel>) -> TerminalSummaryAgent {
    TerminalSummaryAgent::new(
        AgentConfig::default(),
        Arc::new(StaticModelRegistry::new().with_model(model)),
        Arc::new(PromptTemplateStore::with_defaults()),
    )
}

/// Terminal lines of a failed Java run, most recent first
pub fn java_failure_lines() -> Vec<String> {
    [
        "        at de.Client.main(Client.java:41)",
        "        at de.Context.sort(Context.java:31)",
        "        at de.BubbleSort.performSort(BubbleSort.java:17)",
        "        at java.base/java.util.ArrayList.get(ArrayList.java:427)",
        "Exception in thread \"main\" java.lang.IndexOutOfBoundsException: Index 8 out of bounds for length 8",
        "cd '/home/user/project/bar' && java -cp '/home/user/project/bar/bin/main' 'de.Client'",
    ]
    .iter()
    .map(|line| line.to_string())
    .collect()
}

/// Summary a model would give for `java_failure_lines`
pub fn java_failure_summary() -> Value {
    json!({
        "isBuildSuccessful": false,
        "outputSummary": "Run of project bar failed with 1 error.",
        "errors": [{
            "type": "Runtime error: IndexOutOfBoundsException",
            "location": "Client.java:41",
            "description": "Index 8 out of bounds for length 8",
            "fix": "Check the index being accessed and ensure it is within the valid range of the list."
        }]
    })
}
