use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::logging::INPUT_OPERATIONS;
use crate::rects::FieldRect;

pub const UNKNOWN_LABEL: &str = "Unknown";

// Outermost `{ ... }` of a reply that wraps its JSON in prose or fences.
static JSON_OBJECT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{.*\}").unwrap());

/// A field proposed by the classifier: what it read, not where it is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateField {
    pub label: String,
    pub value: String,
    pub snippet: String,
}

impl CandidateField {
    /// Builds a field with the mapper's resolution rules applied: trimmed
    /// value, snippet falling back to the value, label to `"Unknown"`.
    pub fn new(label: Option<&str>, value: &str, snippet: Option<&str>) -> Self {
        let label = label
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(UNKNOWN_LABEL)
            .to_string();
        let value = value.trim().to_string();
        let snippet = snippet
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| value.clone());

        Self {
            label,
            value,
            snippet,
        }
    }

    /// Reads one classifier record. Returns `None` for records that are not
    /// objects or whose `value`/`snippet` is an object or array.
    pub fn from_record(record: &Value) -> Option<Self> {
        let object = record.as_object()?;

        let label = ["label", "name"]
            .iter()
            .filter_map(|key| object.get(*key).and_then(Value::as_str))
            .find(|l| !l.trim().is_empty());
        let value = scalar_text(object, "value")?;
        let snippet = scalar_text(object, "snippet")?;

        Some(Self::new(
            label,
            value.as_deref().unwrap_or_default(),
            snippet.as_deref(),
        ))
    }
}

/// `Some(None)` when the key is absent or null, `None` when it holds a
/// structure that cannot be read as text.
fn scalar_text(object: &Map<String, Value>, key: &str) -> Option<Option<String>> {
    match object.get(key) {
        None | Some(Value::Null) => Some(None),
        Some(Value::String(s)) => Some(Some(s.clone())),
        Some(Value::Number(n)) => Some(Some(n.to_string())),
        Some(Value::Bool(b)) => Some(Some(b.to_string())),
        Some(Value::Array(_)) | Some(Value::Object(_)) => None,
    }
}

/// Well-formed fields of a `{"fields": [...]}` document, in input order.
pub fn parse_fields(structured: &Value) -> Vec<CandidateField> {
    let Some(records) = structured.get("fields").and_then(Value::as_array) else {
        return Vec::new();
    };

    records
        .iter()
        .enumerate()
        .filter_map(|(position, record)| {
            let field = CandidateField::from_record(record);
            if field.is_none() {
                tracing::warn!(
                    target: INPUT_OPERATIONS,
                    position,
                    "Skipping malformed field record: {}",
                    record
                );
            }
            field
        })
        .collect()
}

/// Parses a classifier reply into a JSON document, tolerating prose around
/// the object. Unusable replies become an empty field set.
pub fn parse_classifier_output(content: &str) -> Value {
    if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(content) {
        return value;
    }

    if let Some(found) = JSON_OBJECT.find(content) {
        if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(found.as_str()) {
            tracing::debug!(
                target: INPUT_OPERATIONS,
                "Recovered JSON object embedded in classifier output"
            );
            return value;
        }
    }

    tracing::warn!(
        target: INPUT_OPERATIONS,
        "Unable to parse classifier output; using empty field set"
    );
    serde_json::json!({ "fields": [] })
}

/// A candidate field together with where it was found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappedField {
    pub label: String,
    pub value: String,
    pub snippet: String,
    #[serde(default)]
    pub rects: Vec<FieldRect>,
}

impl MappedField {
    pub fn unlocated(field: &CandidateField) -> Self {
        Self::with_rects(field, Vec::new())
    }

    pub fn with_rects(field: &CandidateField, rects: Vec<FieldRect>) -> Self {
        Self {
            label: field.label.clone(),
            value: field.value.clone(),
            snippet: field.snippet.clone(),
            rects,
        }
    }

    pub fn is_located(&self) -> bool {
        !self.rects.is_empty()
    }
}

/// Wire shape of the mapper output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MappedFields {
    pub fields: Vec<MappedField>,
}
