//! Vital-sign extraction from heterogeneous transcription output.
//!
//! The model emits vitals in any of three shapes: a structured
//! `vital_signs` sub-object, a JSON fragment embedded inside a prose string,
//! or loose `key: value` text. Each field is filled independently from the
//! highest-priority source that matches and is never overwritten by a
//! lower-priority one. Extraction never fails; malformed input degrades to
//! the next strategy, absent data yields `None`.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::models::VitalsBundle;

use super::json_recovery::{extract_first_json_object, regex_key_value};

/// Key aliases per vital, in lookup order.
pub const BP_KEYS: &[&str] = &["blood_pressure", "bp"];
pub const HR_KEYS: &[&str] = &["heart_rate", "hr"];
pub const TEMP_KEYS: &[&str] = &["temperature", "temp"];
pub const WEIGHT_KEYS: &[&str] = &["weight"];

/// Keys naming the vitals container itself.
const VITAL_SIGNS_KEYS: &[&str] = &["vital_signs", "vital signs", "vitals"];

static RE_BP_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*(?:over|[/\s-])+\s*(\d+)").unwrap());
static RE_NUMERIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+\.?\d*").unwrap());

/// Does this map key name the `vital_signs` container?
pub fn is_vital_signs_key(key: &str) -> bool {
    let normalized = key.trim().to_lowercase();
    VITAL_SIGNS_KEYS.contains(&normalized.as_str())
}

/// Does this map key name an individual vital?
///
/// Long aliases match as substrings ("Blood Pressure (sitting)" counts);
/// the short aliases bp/hr/temp must match the whole key, otherwise
/// ordinary exam fields like "throat" would be swallowed by "hr".
pub fn is_vital_alias_key(key: &str) -> bool {
    let normalized = key.trim().to_lowercase();
    if matches!(normalized.as_str(), "bp" | "hr" | "temp") {
        return true;
    }
    const LONG_ALIASES: &[&str] = &[
        "blood_pressure",
        "blood pressure",
        "heart_rate",
        "heart rate",
        "temperature",
        "weight",
    ];
    LONG_ALIASES.iter().any(|alias| normalized.contains(alias))
}

/// Canonicalize a blood-pressure string.
///
/// Two numbers separated by `/`, `-`, whitespace, or the word "over"
/// become `"systolic/diastolic"`. A string that already contains `/` but
/// does not match passes through unchanged. A single bare number is
/// returned as-is; systolic-only input is accepted rather than dropped.
pub fn canonicalize_blood_pressure(raw: &str) -> Option<String> {
    if let Some(caps) = RE_BP_PAIR.captures(raw) {
        let systolic = caps.get(1)?.as_str();
        let diastolic = caps.get(2)?.as_str();
        return Some(format!("{systolic}/{diastolic}"));
    }
    if raw.contains('/') {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        return Some(trimmed.to_string());
    }
    RE_NUMERIC.find(raw).map(|m| m.as_str().to_string())
}

/// First numeric run in the value, for heart rate / temperature / weight.
fn first_numeric(raw: &str) -> Option<String> {
    RE_NUMERIC.find(raw).map(|m| m.as_str().to_string())
}

/// Render a JSON value the way loose text handling expects it: strings
/// without surrounding quotes, everything else serialized.
fn value_as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Pull blood pressure, heart rate, temperature, and weight out of a
/// `physical_exam_findings` map and a flattened-objective-text fallback.
///
/// Strategy order per field, first hit wins:
/// 1. the structured `vital_signs` sub-object (or vital keys inlined at
///    the top level of the findings map),
/// 2. JSON embedded in any top-level findings value, recovered by brace
///    scan, with per-key regex when the span does not parse,
/// 3. per-key regex over `fallback_text`.
pub fn extract_vitals(findings: Option<&Map<String, Value>>, fallback_text: &str) -> VitalsBundle {
    let mut bundle = VitalsBundle::default();

    if let Some(findings) = findings {
        // Strategy 1: structured fields.
        for (key, value) in findings {
            if is_vital_signs_key(key) {
                match value {
                    Value::Object(vitals) => fill_from_map(&mut bundle, vitals),
                    Value::String(s) => fill_from_text(&mut bundle, s),
                    _ => {}
                }
            }
        }
        fill_from_map(&mut bundle, findings);

        // Strategy 2: JSON embedded in top-level values.
        if !bundle_complete(&bundle) {
            for value in findings.values() {
                let text = value_as_text(value);
                match extract_first_json_object(&text)
                    .and_then(|span| serde_json::from_str::<Value>(span).ok())
                {
                    Some(Value::Object(parsed)) => {
                        fill_from_map(&mut bundle, &parsed);
                        // Vitals may sit one level down ({"vital_signs": {...}}).
                        for (key, nested) in &parsed {
                            if is_vital_signs_key(key) {
                                if let Value::Object(nested) = nested {
                                    fill_from_map(&mut bundle, nested);
                                }
                            }
                        }
                    }
                    _ => fill_from_text(&mut bundle, &text),
                }
                if bundle_complete(&bundle) {
                    break;
                }
            }
        }
    }

    // Strategy 3: regex over the flattened objective text.
    if !bundle_complete(&bundle) {
        fill_from_text(&mut bundle, fallback_text);
    }

    bundle
}

fn bundle_complete(bundle: &VitalsBundle) -> bool {
    bundle.blood_pressure.is_some()
        && bundle.heart_rate.is_some()
        && bundle.temperature.is_some()
        && bundle.weight.is_some()
}

/// Fill still-empty fields from a JSON map whose keys may use any alias.
fn fill_from_map(bundle: &mut VitalsBundle, map: &Map<String, Value>) {
    if bundle.blood_pressure.is_none() {
        bundle.blood_pressure = lookup(map, BP_KEYS).and_then(|v| canonicalize_blood_pressure(&v));
    }
    if bundle.heart_rate.is_none() {
        bundle.heart_rate = lookup(map, HR_KEYS).and_then(|v| first_numeric(&v));
    }
    if bundle.temperature.is_none() {
        bundle.temperature = lookup(map, TEMP_KEYS).and_then(|v| first_numeric(&v));
    }
    if bundle.weight.is_none() {
        bundle.weight = lookup(map, WEIGHT_KEYS).and_then(|v| first_numeric(&v));
    }
}

/// Fill still-empty fields by per-key regex over loose text.
fn fill_from_text(bundle: &mut VitalsBundle, text: &str) {
    if bundle.blood_pressure.is_none() {
        bundle.blood_pressure =
            lookup_text(text, BP_KEYS).and_then(|v| canonicalize_blood_pressure(&v));
    }
    if bundle.heart_rate.is_none() {
        bundle.heart_rate = lookup_text(text, HR_KEYS).and_then(|v| first_numeric(&v));
    }
    if bundle.temperature.is_none() {
        bundle.temperature = lookup_text(text, TEMP_KEYS).and_then(|v| first_numeric(&v));
    }
    if bundle.weight.is_none() {
        bundle.weight = lookup_text(text, WEIGHT_KEYS).and_then(|v| first_numeric(&v));
    }
}

fn lookup(map: &Map<String, Value>, aliases: &[&str]) -> Option<String> {
    for alias in aliases {
        for (key, value) in map {
            let normalized = key.trim().to_lowercase().replace(' ', "_");
            if normalized == *alias && !value.is_null() {
                return Some(value_as_text(value));
            }
        }
    }
    None
}

fn lookup_text(text: &str, aliases: &[&str]) -> Option<String> {
    aliases.iter().find_map(|alias| regex_key_value(text, alias))
}
