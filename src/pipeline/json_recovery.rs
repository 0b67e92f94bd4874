//! Recovery of structured data from dirty model output.
//!
//! Transcription models wrap JSON in prose, truncate it, or inline loose
//! `"key": value` fragments inside free text. The helpers here pull out the
//! first balanced JSON object (brace counting, not regex, since nested braces
//! break a naive pattern) and fall back to per-key regex scans when the
//! span does not parse.

use std::sync::LazyLock;

use regex::Regex;

/// Find the first balanced `{...}` span in the text.
///
/// Counts braces while tracking string literals and escapes, so braces
/// inside quoted values do not unbalance the scan. Returns the span
/// including both braces, or `None` if no opening brace is found or the
/// text ends before the span closes.
pub fn extract_first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let bytes = text.as_bytes();

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &b) in bytes[start..].iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match b {
            b'\\' if in_string => escaped = true,
            b'"' => in_string = !in_string,
            b'{' if !in_string => depth += 1,
            b'}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

// Strips surrounding quotes, whitespace and trailing commas from a
// captured value fragment.
static KEY_VALUE_TEMPLATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^[\s"']*(?<inner>.*?)[\s"',]*$"#).unwrap());

/// Scan loose text for a `"key"\s*:\s*"?value` fragment and return the
/// trimmed value. Case-insensitive; quotes around the key are optional.
/// Returns `None` when the key is absent or its value is empty.
pub fn regex_key_value(text: &str, key: &str) -> Option<String> {
    let pattern = format!(r#"(?i)"?\b{}\b"?\s*:\s*("[^"]*"|[^,{{}}\n]+)"#, regex::escape(key));
    let re = Regex::new(&pattern).ok()?;
    let raw = re.captures(text)?.get(1)?.as_str();

    let value = KEY_VALUE_TEMPLATE
        .captures(raw)
        .and_then(|c| c.name("inner"))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_else(|| raw.trim().to_string());

    if value.is_empty() || value == "null" {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_simple_object() {
        let text = r#"Here you go: {"bp": "120/80"} hope that helps"#;
        assert_eq!(extract_first_json_object(text), Some(r#"{"bp": "120/80"}"#));
    }

    #[test]
    fn handles_nested_braces() {
        let text = r#"prefix {"vital_signs": {"bp": "140/90"}, "note": "ok"} suffix"#;
        assert_eq!(
            extract_first_json_object(text),
            Some(r#"{"vital_signs": {"bp": "140/90"}, "note": "ok"}"#)
        );
    }

    #[test]
    fn braces_inside_strings_do_not_unbalance() {
        let text = r#"{"note": "curly } inside", "hr": 72}"#;
        assert_eq!(extract_first_json_object(text), Some(text));
    }

    #[test]
    fn escaped_quote_inside_string() {
        let text = r#"{"note": "he said \"hi {there}\"", "temp": 37}"#;
        assert_eq!(extract_first_json_object(text), Some(text));
    }

    #[test]
    fn unclosed_object_returns_none() {
        assert_eq!(extract_first_json_object(r#"{"bp": "120/80""#), None);
        assert_eq!(extract_first_json_object("no braces here"), None);
    }

    #[test]
    fn key_value_quoted() {
        let text = r#"garbage "blood_pressure": "130/85", more"#;
        assert_eq!(
            regex_key_value(text, "blood_pressure").as_deref(),
            Some("130/85")
        );
    }

    #[test]
    fn key_value_unquoted_number() {
        let text = "heart_rate: 72, temp: 36.8";
        assert_eq!(regex_key_value(text, "heart_rate").as_deref(), Some("72"));
        assert_eq!(regex_key_value(text, "temp").as_deref(), Some("36.8"));
    }

    #[test]
    fn key_value_case_insensitive() {
        let text = r#""Blood_Pressure": 118/76"#;
        assert_eq!(
            regex_key_value(text, "blood_pressure").as_deref(),
            Some("118/76")
        );
    }

    #[test]
    fn missing_or_null_key_is_none() {
        assert_eq!(regex_key_value("weight: 70kg", "temperature"), None);
        assert_eq!(regex_key_value(r#""temp": null"#, "temp"), None);
    }
}
