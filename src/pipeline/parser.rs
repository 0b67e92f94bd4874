//! Lenient parsing of the transcription service's structured payload.
//!
//! The payload is model output: sometimes a clean JSON object, sometimes a
//! JSON object buried in prose, sometimes junk. Parsing never fails; every
//! field is recovered independently and anything unusable is simply absent
//! from the result.

use serde::Deserialize;
use serde_json::Value;

use crate::models::{DiagnosisField, StructuredExtraction};

use super::json_recovery::extract_first_json_object;

/// Convert the raw `structured` payload into a `StructuredExtraction`.
///
/// Accepts a JSON object directly, or a string from which the first
/// balanced JSON object is recovered. Anything else yields the empty
/// extraction.
pub fn parse_structured_payload(payload: Option<&Value>) -> StructuredExtraction {
    match payload {
        Some(value @ Value::Object(_)) => parse_object(value),
        Some(Value::String(text)) => match extract_first_json_object(text)
            .and_then(|span| serde_json::from_str::<Value>(span).ok())
        {
            Some(recovered @ Value::Object(_)) => parse_object(&recovered),
            _ => {
                tracing::debug!("Structured payload string held no recoverable JSON object");
                StructuredExtraction::default()
            }
        },
        _ => StructuredExtraction::default(),
    }
}

/// Field-by-field lenient parse: a malformed field never poisons its
/// siblings.
fn parse_object(value: &Value) -> StructuredExtraction {
    let empty = serde_json::Map::new();
    let map = value.as_object().unwrap_or(&empty);

    StructuredExtraction {
        current_symptoms: parse_array_lenient(map.get("current_symptoms")),
        physical_exam_findings: parse_findings(map.get("physical_exam_findings")),
        past_medical_history: parse_string_array(map.get("past_medical_history")),
        diagnosis: map
            .get("diagnosis")
            .and_then(|v| serde_json::from_value::<DiagnosisField>(v.clone()).ok()),
        treatment_plan: parse_string_array(map.get("treatment_plan")),
        prescriptions: parse_array_lenient(map.get("prescriptions")),
        summary: string_field(map.get("summary")),
        transcript: string_field(map.get("transcript")),
    }
}

/// Findings arrive as an object, or as a stringified object.
fn parse_findings(value: Option<&Value>) -> Option<serde_json::Map<String, Value>> {
    match value? {
        Value::Object(map) => Some(map.clone()),
        Value::String(text) => match extract_first_json_object(text)
            .and_then(|span| serde_json::from_str::<Value>(span).ok())
        {
            Some(Value::Object(map)) => Some(map),
            _ => None,
        },
        _ => None,
    }
}

/// Parse an array leniently, skipping items that fail to deserialize.
fn parse_array_lenient<T: for<'de> Deserialize<'de>>(value: Option<&Value>) -> Vec<T> {
    match value.and_then(Value::as_array) {
        None => vec![],
        Some(items) => items
            .iter()
            .filter_map(|v| serde_json::from_value(v.clone()).ok())
            .collect(),
    }
}

/// String arrays keep string items and drop the rest.
fn parse_string_array(value: Option<&Value>) -> Vec<String> {
    match value.and_then(Value::as_array) {
        None => vec![],
        Some(items) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(|s| s.to_string())
            .collect(),
    }
}

fn string_field(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
