//! Prompt template store
//!
//! Holds prompt variant sets keyed by prompt id and resolves `{{name}}`
//! placeholders against a parameter record. Interpolation is purely
//! textual; `{{!-- ... --}}` comments are removed before rendering.

mod templates;

pub use templates::{terminal_prompts, SYSTEM_PROMPT_ID, USER_PROMPT_ID};

use std::collections::{BTreeSet, HashMap};

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::error::{Result, SummaryError};

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_\-]*)\s*\}\}").expect("placeholder pattern is valid")
});

static COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{\{!--.*?--\}\}\n?").expect("comment pattern is valid"));

/// A value bound to a placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptValue {
    Text(String),
    /// Interpolated one entry per line
    Lines(Vec<String>),
}

impl PromptValue {
    fn render(&self) -> String {
        match self {
            PromptValue::Text(text) => text.clone(),
            PromptValue::Lines(lines) => lines.join("\n"),
        }
    }
}

impl From<&str> for PromptValue {
    fn from(value: &str) -> Self {
        PromptValue::Text(value.to_string())
    }
}

impl From<String> for PromptValue {
    fn from(value: String) -> Self {
        PromptValue::Text(value)
    }
}

impl From<Vec<String>> for PromptValue {
    fn from(value: Vec<String>) -> Self {
        PromptValue::Lines(value)
    }
}

impl From<&[String]> for PromptValue {
    fn from(value: &[String]) -> Self {
        PromptValue::Lines(value.to_vec())
    }
}

/// Named parameters for template resolution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptParams {
    values: HashMap<String, PromptValue>,
}

impl PromptParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a placeholder
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<PromptValue>) {
        self.values.insert(name.into(), value.into());
    }

    /// Bind a placeholder and return self (builder pattern)
    pub fn with(mut self, name: impl Into<String>, value: impl Into<PromptValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&PromptValue> {
        self.values.get(name)
    }
}

/// One concrete template of a prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    /// Variant id, e.g. `terminal-summary-system-default`
    pub id: String,
    pub template: String,
}

impl PromptTemplate {
    pub fn new(id: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            template: template.into(),
        }
    }

    /// Placeholder names used by this template, sorted and deduplicated
    pub fn placeholders(&self) -> BTreeSet<String> {
        let body = COMMENT.replace_all(&self.template, "");
        PLACEHOLDER
            .captures_iter(&body)
            .map(|caps| caps[1].to_string())
            .collect()
    }
}

/// All variants registered for one prompt id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptVariantSet {
    pub id: String,
    pub default_variant: PromptTemplate,
    pub variants: Vec<PromptTemplate>,
}

impl PromptVariantSet {
    pub fn new(id: impl Into<String>, default_variant: PromptTemplate) -> Self {
        Self {
            id: id.into(),
            default_variant,
            variants: Vec::new(),
        }
    }

    /// Add an alternative variant
    pub fn with_variant(mut self, variant: PromptTemplate) -> Self {
        self.variants.push(variant);
        self
    }

    fn variant(&self, variant_id: &str) -> Option<&PromptTemplate> {
        std::iter::once(&self.default_variant)
            .chain(self.variants.iter())
            .find(|v| v.id == variant_id)
    }
}

/// Final prompt text produced by a resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPrompt {
    pub id: String,
    pub variant_id: String,
    pub text: String,
}

/// Resolves prompt ids to final text
pub trait PromptService: Send + Sync {
    /// Resolve a prompt; unknown ids and unbound placeholders are errors
    fn resolve(&self, prompt_id: &str, params: &PromptParams) -> Result<ResolvedPrompt>;
}

/// Render a template against parameters.
///
/// Fails when any placeholder has no binding; no partial text is returned.
pub fn render(template: &str, params: &PromptParams) -> Result<String> {
    let body = COMMENT.replace_all(template, "");

    let missing: BTreeSet<&str> = PLACEHOLDER
        .captures_iter(&body)
        .filter_map(|caps| caps.get(1))
        .map(|name| name.as_str())
        .filter(|name| params.get(name).is_none())
        .collect();

    if !missing.is_empty() {
        return Err(SummaryError::prompt_resolution(format!(
            "missing parameters: {}",
            missing.into_iter().collect::<Vec<_>>().join(", ")
        )));
    }

    let rendered = PLACEHOLDER.replace_all(&body, |caps: &Captures| {
        params
            .get(&caps[1])
            .map(PromptValue::render)
            .unwrap_or_default()
    });

    Ok(rendered.into_owned())
}

/// In-memory prompt store with per-prompt variant selection
#[derive(Debug, Clone, Default)]
pub struct PromptTemplateStore {
    sets: HashMap<String, PromptVariantSet>,
    selected: HashMap<String, String>,
}

impl PromptTemplateStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the built-in terminal summary prompts
    pub fn with_defaults() -> Self {
        let mut store = Self::new();
        for set in terminal_prompts() {
            store.register(set);
        }
        store
    }

    /// Register (or replace) a prompt variant set
    pub fn register(&mut self, set: PromptVariantSet) {
        self.selected.remove(&set.id);
        self.sets.insert(set.id.clone(), set);
    }

    /// Make a non-default variant the active one for a prompt
    pub fn select_variant(&mut self, prompt_id: &str, variant_id: &str) -> Result<()> {
        let set = self.sets.get(prompt_id).ok_or_else(|| {
            SummaryError::prompt_resolution(format!("unknown prompt: {}", prompt_id))
        })?;

        if set.variant(variant_id).is_none() {
            return Err(SummaryError::prompt_resolution(format!(
                "unknown variant {} of prompt {}",
                variant_id, prompt_id
            )));
        }

        self.selected
            .insert(prompt_id.to_string(), variant_id.to_string());
        Ok(())
    }

    /// The variant currently used for a prompt
    pub fn active_template(&self, prompt_id: &str) -> Option<&PromptTemplate> {
        let set = self.sets.get(prompt_id)?;
        match self.selected.get(prompt_id) {
            Some(variant_id) => set.variant(variant_id),
            None => Some(&set.default_variant),
        }
    }
}

impl PromptService for PromptTemplateStore {
    fn resolve(&self, prompt_id: &str, params: &PromptParams) -> Result<ResolvedPrompt> {
        let template = self.active_template(prompt_id).ok_or_else(|| {
            SummaryError::prompt_resolution(format!("unknown prompt: {}", prompt_id))
        })?;

        let text = render(&template.template, params).map_err(|e| {
            e.with_context_value("prompt", format!("{}/{}", prompt_id, template.id))
        })?;

        Ok(ResolvedPrompt {
            id: prompt_id.to_string(),
            variant_id: template.id.clone(),
            text,
        })
    }
}
