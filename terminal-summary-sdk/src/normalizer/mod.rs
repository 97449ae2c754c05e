//! Response normalizer
//!
//! Model services sometimes honour the requested output schema and return
//! structured data, and sometimes return text that only resembles it. The
//! normalizer accepts both, first success wins:
//!
//! 1. validate pre-parsed structured data, if any
//! 2. extract a JSON object from the raw text and validate that
//! 3. give up with `None`
//!
//! Nothing here returns an error; a failed attempt is logged and skipped.

use futures::StreamExt;
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::model::{ModelResponse, TextStream};
use crate::schema::{validate, Summary};
use crate::util::{sanitize_for_logging, truncate_string};

static FENCE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*```[\w.+-]*[ \t]*(?:\n|$)").expect("fence line pattern is valid")
});

static INLINE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```[\w.+-]*").expect("inline fence pattern is valid"));

/// Remove Markdown code fences, keeping their contents.
///
/// The info string after an opening fence (e.g. `json`) is dropped with it.
/// Fences sharing a line with content lose only the marker.
pub fn strip_code_fences(text: &str) -> String {
    let without_lines = FENCE_LINE.replace_all(text, "");
    INLINE_FENCE.replace_all(&without_lines, "").into_owned()
}

/// All top-level balanced `{...}` spans, in order of appearance.
///
/// Braces inside JSON strings (including escaped quotes) do not count. A
/// `{` that never closes is skipped and the scan resumes right after it.
pub fn balanced_objects(text: &str) -> Vec<&str> {
    let mut objects = Vec::new();
    let mut offset = 0;

    while let Some(found) = text[offset..].find('{') {
        let begin = offset + found;
        match object_len(&text[begin..]) {
            Some(len) => {
                objects.push(&text[begin..begin + len]);
                offset = begin + len;
            }
            None => offset = begin + 1,
        }
    }

    objects
}

/// Byte length of the balanced object opening at the start of `text`
fn object_len(text: &str) -> Option<usize> {
    let mut depth: usize = 0;
    let mut in_string = false;
    let mut escape = false;

    for (index, ch) in text.char_indices() {
        if in_string {
            if escape {
                escape = false;
            } else if ch == '\\' {
                escape = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(index + ch.len_utf8());
                }
            }
            _ => {}
        }
    }

    None
}

/// Locate and parse the first JSON object embedded in free text.
///
/// Surrounding prose and code fences are tolerated. Returns `None` when no
/// balanced object parses as JSON.
pub fn extract_json(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(trimmed) {
        return Some(value);
    }

    let unfenced = strip_code_fences(trimmed);
    let found = balanced_objects(&unfenced)
        .into_iter()
        .find_map(|candidate| serde_json::from_str::<Value>(candidate).ok());
    found.filter(Value::is_object)
}

fn validate_logged(candidate: &Value, tier: &str) -> Option<Summary> {
    match validate(candidate) {
        Ok(summary) => {
            debug!("Summary accepted from {}", tier);
            Some(summary)
        }
        Err(e) => {
            debug!("Summary rejected from {}: {}", tier, e);
            None
        }
    }
}

fn from_text(text: &str) -> Option<Summary> {
    match extract_json(text) {
        Some(candidate) => validate_logged(&candidate, "extracted text"),
        None => {
            debug!(
                "No JSON object found in model text: {}",
                sanitize_for_logging(&truncate_string(text, 200))
            );
            None
        }
    }
}

async fn collect_stream(mut stream: TextStream) -> Option<String> {
    let mut text = String::new();
    while let Some(chunk) = stream.next().await {
        match chunk {
            Ok(chunk) => text.push_str(&chunk),
            Err(e) => {
                warn!("Model response stream failed after {} bytes: {}", text.len(), e);
                return None;
            }
        }
    }
    Some(text)
}

/// Coerce a model response into a `Summary`, or `None` when both tiers fail
pub async fn normalize(response: ModelResponse) -> Option<Summary> {
    let text = match response {
        ModelResponse::Parsed { parsed, text } => {
            if let Some(summary) = validate_logged(&parsed, "structured output") {
                return Some(summary);
            }
            // a bare string in the parsed slot is raw text, not a failed object
            match (text, parsed) {
                (Some(text), _) => text,
                (None, Value::String(text)) => text,
                (None, _) => return None,
            }
        }
        ModelResponse::Text(text) => text,
        ModelResponse::Stream(stream) => collect_stream(stream).await?,
    };

    from_text(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_balanced_objects_ignores_braces_in_strings() {
        let text = r#"prefix {"a": "}{", "b": {"c": "\"}"}} middle {"d": 1} tail {"#;
        let objects = balanced_objects(text);
        assert_eq!(objects, vec![r#"{"a": "}{", "b": {"c": "\"}"}}"#, r#"{"d": 1}"#]);
    }

    #[test]
    fn test_strip_single_line_fence() {
        assert_eq!(strip_code_fences("```json {\"a\": 1} ```"), " {\"a\": 1} ");
    }

    #[test]
    fn test_extract_json_from_single_line_fence() {
        let text = "```json {\"isBuildSuccessful\": true, \"outputSummary\": \"ok\", \"errors\": []} ```";
        assert_eq!(
            extract_json(text),
            Some(json!({"isBuildSuccessful": true, "outputSummary": "ok", "errors": []}))
        );
    }

    #[test]
    fn test_unclosed_brace_does_not_hide_later_object() {
        let text = "The compiler expected '{' on line 3. Summary: {\"isBuildSuccessful\": true, \"outputSummary\": \"ok\", \"errors\": []}";
        assert_eq!(
            balanced_objects(text),
            vec![r#"{"isBuildSuccessful": true, "outputSummary": "ok", "errors": []}"#]
        );
        assert_eq!(
            extract_json(text),
            Some(json!({"isBuildSuccessful": true, "outputSummary": "ok", "errors": []}))
        );
    }

    #[test]
    fn test_strip_code_fences() {
        let text = "Here you go:\n```json\n{\"a\": 1}\n```\nDone.";
        assert_eq!(strip_code_fences(text), "Here you go:\n{\"a\": 1}\nDone.");
    }

    #[test]
    fn test_extract_json_plain_object() {
        assert_eq!(extract_json("  {\"a\": [1, 2]}  "), Some(json!({"a": [1, 2]})));
    }

    #[test]
    fn test_extract_json_from_prose_and_fences() {
        let text = "Sure! Here is the summary:\n```json\n{\n  \"ok\": true\n}\n```\nLet me know.";
        assert_eq!(extract_json(text), Some(json!({"ok": true})));
    }

    #[test]
    fn test_extract_json_skips_unparseable_candidates() {
        let text = "template {placeholder} then {\"real\": 1}";
        assert_eq!(extract_json(text), Some(json!({"real": 1})));
    }

    #[test]
    fn test_normalize_prose_without_runtime_setup() {
        let summary = tokio_test::block_on(normalize(ModelResponse::text("The build passed.")));
        assert!(summary.is_none());
    }

    #[test]
    fn test_extract_json_without_object() {
        assert_eq!(extract_json("The build passed."), None);
        assert_eq!(extract_json("[1, 2, 3]"), None);
        assert_eq!(extract_json("{ unterminated"), None);
    }
}
