//! Summary schema
//!
//! The contract a model response must satisfy before it reaches the UI:
//! a build-success flag, a short free-text summary and an ordered list of
//! error records. `validate` checks shape only. It never corrects data and
//! never checks cross-field consistency: a successful build may still list
//! errors (warnings), and a failed one may list none.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;

/// Name under which the schema is advertised to model services
pub const SUMMARY_SCHEMA_NAME: &str = "terminal-output-summary";

/// Structured summary of the last command or build in a terminal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Whether the last command/build succeeded
    pub is_build_successful: bool,

    /// One or two sentence description of what happened
    pub output_summary: String,

    /// Errors in the order they were detected
    pub errors: Vec<ErrorDetail>,
}

/// A single error reported in a summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Category prefix followed by a subtype, e.g. `Runtime error: IndexOutOfBoundsException`
    #[serde(rename = "type")]
    pub error_type: String,

    /// File and line reference, or empty when unknown
    pub location: String,

    pub description: String,

    /// Generic remediation, free of caller-specific paths or values
    pub fix: String,
}

impl ErrorDetail {
    /// The taxonomy category of this error
    pub fn category(&self) -> Option<ErrorCategory> {
        ErrorCategory::of(&self.error_type)
    }

    /// The subtype following the category prefix, if any
    pub fn subtype(&self) -> Option<&str> {
        let category = self.category()?;
        let rest = self.error_type[category.prefix().len()..]
            .trim_start_matches(|c: char| c == ':' || c.is_whitespace());
        if rest.is_empty() {
            None
        } else {
            Some(rest)
        }
    }
}

/// Fixed taxonomy every `ErrorDetail::error_type` starts with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Compilation,
    Runtime,
    Other,
}

impl ErrorCategory {
    pub const ALL: [ErrorCategory; 3] = [
        ErrorCategory::Compilation,
        ErrorCategory::Runtime,
        ErrorCategory::Other,
    ];

    /// The literal prefix of this category
    pub fn prefix(self) -> &'static str {
        match self {
            ErrorCategory::Compilation => "Compilation error",
            ErrorCategory::Runtime => "Runtime error",
            ErrorCategory::Other => "Other error",
        }
    }

    /// Find the category an error type string is prefixed with
    pub fn of(error_type: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|category| error_type.starts_with(category.prefix()))
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Why a candidate value is not a `Summary`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{path}: missing required field")]
    MissingField { path: String },

    #[error("{path}: expected {expected}, found {found}")]
    WrongType {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{path}: error type {value:?} must start with one of Compilation error, Runtime error, Other error")]
    UnknownCategory { path: String, value: String },
}

impl ValidationError {
    /// JSON path of the offending value, e.g. `$.errors[0].type`
    pub fn path(&self) -> &str {
        match self {
            ValidationError::MissingField { path }
            | ValidationError::WrongType { path, .. }
            | ValidationError::UnknownCategory { path, .. } => path,
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, ValidationError> {
    value.as_object().ok_or_else(|| ValidationError::WrongType {
        path: path.to_string(),
        expected: "object",
        found: type_name(value),
    })
}

fn field<'a>(
    object: &'a Map<String, Value>,
    path: &str,
    name: &str,
) -> Result<(&'a Value, String), ValidationError> {
    let field_path = format!("{}.{}", path, name);
    match object.get(name) {
        Some(value) => Ok((value, field_path)),
        None => Err(ValidationError::MissingField { path: field_path }),
    }
}

fn string_field(object: &Map<String, Value>, path: &str, name: &str) -> Result<String, ValidationError> {
    let (value, field_path) = field(object, path, name)?;
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ValidationError::WrongType {
            path: field_path,
            expected: "string",
            found: type_name(value),
        })
}

fn validate_error_detail(value: &Value, path: &str) -> Result<ErrorDetail, ValidationError> {
    let object = as_object(value, path)?;

    let error_type = string_field(object, path, "type")?;
    if ErrorCategory::of(&error_type).is_none() {
        return Err(ValidationError::UnknownCategory {
            path: format!("{}.type", path),
            value: error_type,
        });
    }

    Ok(ErrorDetail {
        error_type,
        location: string_field(object, path, "location")?,
        description: string_field(object, path, "description")?,
        fix: string_field(object, path, "fix")?,
    })
}

/// Validate an arbitrary JSON value against the summary contract.
///
/// Unknown keys are ignored and dropped from the result.
pub fn validate(candidate: &Value) -> Result<Summary, ValidationError> {
    let root = "$";
    let object = as_object(candidate, root)?;

    let (flag, flag_path) = field(object, root, "isBuildSuccessful")?;
    let is_build_successful = flag.as_bool().ok_or_else(|| ValidationError::WrongType {
        path: flag_path,
        expected: "boolean",
        found: type_name(flag),
    })?;

    let output_summary = string_field(object, root, "outputSummary")?;

    let (errors, errors_path) = field(object, root, "errors")?;
    let errors = errors
        .as_array()
        .ok_or_else(|| ValidationError::WrongType {
            path: errors_path.clone(),
            expected: "array",
            found: type_name(errors),
        })?
        .iter()
        .enumerate()
        .map(|(index, item)| validate_error_detail(item, &format!("{}[{}]", errors_path, index)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Summary {
        is_build_successful,
        output_summary,
        errors,
    })
}

/// JSON Schema (draft-07) describing `Summary`
pub fn summary_json_schema() -> Value {
    let categories = ErrorCategory::ALL
        .iter()
        .map(|c| c.prefix())
        .collect::<Vec<_>>()
        .join(", ");

    json!({
        "type": "object",
        "properties": {
            "isBuildSuccessful": { "type": "boolean" },
            "outputSummary": { "type": "string" },
            "errors": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "type": {
                            "type": "string",
                            "description": format!("Prefixed with one of: {}", categories)
                        },
                        "location": { "type": "string" },
                        "description": { "type": "string" },
                        "fix": { "type": "string" }
                    },
                    "required": ["type", "location", "description", "fix"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["isBuildSuccessful", "outputSummary", "errors"],
        "additionalProperties": false,
        "$schema": "http://json-schema.org/draft-07/schema#"
    })
}

/// Requested output format attached to a model request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseFormat {
    Text,
    JsonObject,
    JsonSchema { json_schema: JsonSchemaFormat },
}

/// Named JSON schema a model service may enforce on its output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonSchemaFormat {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub schema: Value,
}

impl ResponseFormat {
    /// The structured output format of terminal summaries
    pub fn terminal_summary() -> Self {
        ResponseFormat::JsonSchema {
            json_schema: JsonSchemaFormat {
                name: SUMMARY_SCHEMA_NAME.to_string(),
                description: Some("Structured summary of terminal output commands".to_string()),
                schema: summary_json_schema(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_summary() -> Value {
        json!({
            "isBuildSuccessful": false,
            "outputSummary": "Compilation of project bar failed with 1 error.",
            "errors": [{
                "type": "Runtime error: IndexOutOfBoundsException",
                "location": "Client.java:41",
                "description": "Index 8 out of bounds for length 8",
                "fix": "Check the index being accessed and ensure it is within the valid range."
            }]
        })
    }

    #[test]
    fn test_validate_accepts_well_formed_summary() {
        let summary = validate(&valid_summary()).unwrap();
        assert!(!summary.is_build_successful);
        assert_eq!(summary.errors.len(), 1);
        assert_eq!(summary.errors[0].location, "Client.java:41");
        assert_eq!(summary.errors[0].category(), Some(ErrorCategory::Runtime));
        assert_eq!(summary.errors[0].subtype(), Some("IndexOutOfBoundsException"));
    }

    #[test]
    fn test_validate_is_identity_on_serialized_summary() {
        let summary = validate(&valid_summary()).unwrap();
        let round = serde_json::to_value(&summary).unwrap();
        assert_eq!(round, valid_summary());
        assert_eq!(validate(&round).unwrap(), summary);
    }

    #[test]
    fn test_validate_rejects_wrong_flag_type() {
        let err = validate(&json!({
            "isBuildSuccessful": "yes",
            "outputSummary": "ok",
            "errors": []
        }))
        .unwrap_err();

        assert_eq!(
            err,
            ValidationError::WrongType {
                path: "$.isBuildSuccessful".to_string(),
                expected: "boolean",
                found: "string",
            }
        );
    }

    #[test]
    fn test_validate_reports_missing_fields() {
        let err = validate(&json!({ "isBuildSuccessful": true, "errors": [] })).unwrap_err();
        assert_eq!(err.path(), "$.outputSummary");

        let mut missing_location = valid_summary();
        missing_location["errors"][0]
            .as_object_mut()
            .unwrap()
            .remove("location");
        let err = validate(&missing_location).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingField {
                path: "$.errors[0].location".to_string()
            }
        );
    }

    #[test]
    fn test_validate_rejects_unknown_category() {
        let mut value = valid_summary();
        value["errors"][0]["type"] = json!("Warning: deprecated API");
        let err = validate(&value).unwrap_err();
        assert_eq!(err.path(), "$.errors[0].type");

        value["errors"][0]["type"] = json!("");
        assert!(matches!(
            validate(&value),
            Err(ValidationError::UnknownCategory { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_non_object_root() {
        assert!(matches!(
            validate(&json!([1, 2, 3])),
            Err(ValidationError::WrongType { expected: "object", found: "array", .. })
        ));
    }

    #[test]
    fn test_validate_keeps_success_and_errors_independent() {
        // A build can succeed with warnings and fail without structured errors
        let with_warning = json!({
            "isBuildSuccessful": true,
            "outputSummary": "Build succeeded with a warning.",
            "errors": [{
                "type": "Other error: deprecation",
                "location": "",
                "description": "API is deprecated",
                "fix": "Migrate to the replacement API."
            }]
        });
        assert!(validate(&with_warning).is_ok());

        let failed_without_errors = json!({
            "isBuildSuccessful": false,
            "outputSummary": "The command 'make' failed.",
            "errors": []
        });
        assert!(validate(&failed_without_errors).is_ok());
    }

    #[test]
    fn test_validate_drops_unknown_keys() {
        let mut value = valid_summary();
        value["confidence"] = json!(0.9);
        value["errors"][0]["severity"] = json!("high");
        let summary = validate(&value).unwrap();
        assert_eq!(serde_json::to_value(&summary).unwrap(), valid_summary());
    }

    #[test]
    fn test_response_format_serialization() {
        let format = serde_json::to_value(ResponseFormat::terminal_summary()).unwrap();
        assert_eq!(format["type"], "json_schema");
        assert_eq!(format["json_schema"]["name"], SUMMARY_SCHEMA_NAME);
        assert_eq!(
            format["json_schema"]["schema"]["required"],
            json!(["isBuildSuccessful", "outputSummary", "errors"])
        );
    }
}
