//! Physical-exam finding sanitization.
//!
//! Vitals ride along inside `physical_exam_findings` in every shape the
//! model can produce: a dedicated sub-object, stringified JSON, or `vital
//! signs: {...}` blobs pasted mid-sentence. The exam display must show only
//! genuine exam prose, so anything that is wholly a vitals payload is
//! dropped and partial findings keep their prose with the vitals stripped
//! out. The vitals themselves are captured separately by the extractor.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use super::json_recovery::extract_first_json_object;
use super::vitals::{is_vital_alias_key, is_vital_signs_key};

/// One exam finding that survived sanitization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub key: String,
    pub text: String,
}

static RE_SEGMENT_VITAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)^[\s{("']*(?:vitals?|blood[\s_]?pressure|bp|heart[\s_]?rate|hr|temperature|temp|weight)\b"#,
    )
    .unwrap()
});

static RE_VITAL_SIGNS_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)vital[\s_]*signs?\s*:\s*").unwrap());

static RE_ALIAS_FRAGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)"?\b(?:blood[\s_]?pressure|bp|heart[\s_]?rate|hr|temperature|temp|weight)\b"?\s*:\s*(?:"[^"]*"|[^,{}\n]+)"#,
    )
    .unwrap()
});

/// Filter a findings map down to genuine exam text, preserving key order.
///
/// Fields that are vitals in any disguise are dropped whole; mixed fields
/// keep their prose with embedded vitals removed. Guarantees that no
/// vitals-only content reaches the exam display.
pub fn sanitize_findings(findings: &Map<String, Value>) -> Vec<Finding> {
    let mut out = Vec::new();

    for (key, value) in findings {
        if is_vital_signs_key(key) || is_vital_alias_key(key) {
            continue;
        }

        let text = match value {
            Value::Object(map) => {
                if all_keys_are_vitals(map) {
                    continue;
                }
                Value::Object(map.clone()).to_string()
            }
            Value::String(s) => {
                if let Ok(Value::Object(parsed)) = serde_json::from_str::<Value>(s) {
                    if all_keys_are_vitals(&parsed) {
                        continue;
                    }
                } else if looks_like_vitals_blob(s) {
                    continue;
                }
                s.clone()
            }
            Value::Null => continue,
            other => other.to_string(),
        };

        let cleaned = normalize_punctuation(&strip_embedded_vitals(&text));
        if cleaned.is_empty() || cleaned == "{}" || cleaned == "null" {
            continue;
        }
        out.push(Finding {
            key: key.clone(),
            text: cleaned,
        });
    }

    out
}

fn all_keys_are_vitals(map: &Map<String, Value>) -> bool {
    !map.is_empty() && map.keys().all(|k| is_vital_alias_key(k) || is_vital_signs_key(k))
}

/// Heuristic for unparseable strings: short (at most 5 comma-separated
/// segments) and every segment leads with a vital keyword or carries no
/// prose at all, so it reads as a vitals dump ("BP 140/90, HR 72") rather
/// than exam prose that mentions a vital in passing.
fn looks_like_vitals_blob(text: &str) -> bool {
    let segments: Vec<&str> = text
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if segments.is_empty() || segments.len() > 5 {
        return false;
    }
    segments.iter().all(|segment| {
        RE_SEGMENT_VITAL.is_match(segment) || !segment.chars().any(|c| c.is_alphabetic())
    })
}

/// Remove vitals content embedded inside otherwise-real exam text:
/// `vital signs: {...}` spans, standalone JSON objects whose keys are all
/// vitals, then leftover `"alias": value` fragments.
fn strip_embedded_vitals(text: &str) -> String {
    let mut result = strip_labeled_vital_spans(text);
    result = strip_vitals_only_json_spans(&result);
    RE_ALIAS_FRAGMENT.replace_all(&result, "").into_owned()
}

fn strip_labeled_vital_spans(text: &str) -> String {
    let mut result = text.to_string();
    loop {
        let Some((label_start, label_end)) = RE_VITAL_SIGNS_LABEL
            .find(&result)
            .map(|m| (m.start(), m.end()))
        else {
            break;
        };
        let removed_end = {
            let after_label = &result[label_end..];
            if after_label.trim_start().starts_with('{') {
                match extract_first_json_object(after_label) {
                    Some(span) => {
                        label_end + after_label.find('{').unwrap_or(0) + span.len()
                    }
                    // Unclosed payload: drop the label and let the
                    // alias-fragment pass handle what followed it.
                    None => label_end,
                }
            } else {
                label_end
            }
        };
        result.replace_range(label_start..removed_end, "");
    }
    result
}

fn strip_vitals_only_json_spans(text: &str) -> String {
    let mut result = text.to_string();
    let mut search_from = 0;

    loop {
        // Span start is the first `{` by construction of the brace scan.
        let (start, end, strip) = {
            let tail = &result[search_from..];
            let Some(span) = extract_first_json_object(tail) else {
                break;
            };
            let start = search_from + tail.find('{').unwrap_or(0);
            let end = start + span.len();
            let strip = matches!(
                serde_json::from_str::<Value>(span),
                Ok(Value::Object(ref map)) if all_keys_are_vitals(map)
            );
            (start, end, strip)
        };
        if strip {
            result.replace_range(start..end, "");
            search_from = start;
        } else {
            // Mixed or unparseable span: keep it and scan past.
            search_from = start + 1;
        }
    }
    result
}

/// Clean up punctuation orphaned by the stripping passes.
fn normalize_punctuation(text: &str) -> String {
    let mut result = text.to_string();
    loop {
        let next = result
            .replace(",,", ",")
            .replace(", ,", ",")
            .replace("{,", "{")
            .replace(",}", "}")
            .replace("  ", " ");
        if next == result {
            break;
        }
        result = next;
    }
    result
        .trim()
        .trim_matches(|c| c == ',' || c == ':')
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn findings(json: &str) -> Map<String, Value> {
        serde_json::from_str(json).unwrap()
    }

    fn keys(result: &[Finding]) -> Vec<&str> {
        result.iter().map(|f| f.key.as_str()).collect()
    }

    #[test]
    fn vital_keys_dropped_outright() {
        let f = findings(
            r#"{"vital_signs": {"bp": "120/80"}, "blood_pressure": "130/85", "hr": "70", "heent": "normal"}"#,
        );
        let result = sanitize_findings(&f);
        assert_eq!(keys(&result), vec!["heent"]);
        assert_eq!(result[0].text, "normal");
    }

    #[test]
    fn object_value_with_only_vital_keys_dropped() {
        let f = findings(r#"{"measurements": {"bp": "140/90", "weight": "82"}}"#);
        assert!(sanitize_findings(&f).is_empty());
    }

    #[test]
    fn stringified_vitals_json_dropped() {
        let f = findings(r#"{"recorded": "{\"blood_pressure\": \"140/90\", \"temp\": \"37\"}"}"#);
        assert!(sanitize_findings(&f).is_empty());
    }

    #[test]
    fn short_vitals_blob_heuristic_drops() {
        let f = findings(r#"{"noted": "BP 140/90, HR 72, temp 37.2"}"#);
        assert!(sanitize_findings(&f).is_empty());
    }

    #[test]
    fn long_prose_mentioning_weight_survives() {
        let f = findings(
            r#"{"general": "well nourished, no acute distress, gait steady, skin warm, mucosa moist, reports stable weight, no edema"}"#,
        );
        let result = sanitize_findings(&f);
        assert_eq!(result.len(), 1);
        assert!(result[0].text.contains("no acute distress"));
    }

    #[test]
    fn embedded_labeled_vitals_stripped_from_prose() {
        let f = findings(
            r#"{"exam": "alert and oriented, vital signs: {\"bp\": \"120/80\", \"hr\": \"70\"}, lungs clear"}"#,
        );
        let result = sanitize_findings(&f);
        assert_eq!(result.len(), 1);
        assert!(result[0].text.contains("alert and oriented"));
        assert!(result[0].text.contains("lungs clear"));
        assert!(!result[0].text.contains("120/80"));
    }

    #[test]
    fn standalone_vitals_json_span_stripped() {
        let f = findings(
            r#"{"exam": "cardiac exam unremarkable {\"heart_rate\": \"64\"} no murmurs appreciated"}"#,
        );
        let result = sanitize_findings(&f);
        assert_eq!(result.len(), 1);
        assert!(!result[0].text.contains("64"));
        assert!(result[0].text.contains("no murmurs"));
    }

    #[test]
    fn mixed_json_span_kept() {
        let f = findings(
            r#"{"exam": "see structured note {\"murmur\": \"none\", \"gallop\": \"none\"} reviewed"}"#,
        );
        let result = sanitize_findings(&f);
        assert_eq!(result.len(), 1);
        assert!(result[0].text.contains("murmur"));
    }

    #[test]
    fn leftover_alias_fragments_stripped() {
        let f = findings(
            r#"{"exam": "abdomen soft, bowel sounds normal, no rebound, no guarding, liver edge smooth, \"temperature\": \"38.2\", non-tender"}"#,
        );
        let result = sanitize_findings(&f);
        assert_eq!(result.len(), 1);
        assert!(!result[0].text.contains("38.2"));
        assert!(result[0].text.contains("abdomen soft"));
        assert!(result[0].text.contains("non-tender"));
    }

    #[test]
    fn key_order_preserved() {
        let f = findings(
            r#"{"heent": "normal", "lungs": "clear", "abdomen": "soft", "neuro": "intact"}"#,
        );
        assert_eq!(
            keys(&sanitize_findings(&f)),
            vec!["heent", "lungs", "abdomen", "neuro"]
        );
    }

    #[test]
    fn empty_and_null_remainders_dropped() {
        let f = findings(r#"{"a": "", "b": "null", "c": "{}", "d": null, "e": "real finding"}"#);
        assert_eq!(keys(&sanitize_findings(&f)), vec!["e"]);
    }

    #[test]
    fn only_vital_fields_yields_empty_list() {
        let f = findings(
            r#"{"vital_signs": {"bp": "120/80"}, "heart_rate": "70", "Temperature": "37", "weight": "80", "bp": "120/80"}"#,
        );
        assert!(sanitize_findings(&f).is_empty());
    }
}
