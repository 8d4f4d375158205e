//! Recovery of JSON objects from chat-model output.
//!
//! Models wrap JSON in markdown fences, prepend prose, leave trailing commas
//! and put raw newlines inside string literals. [`recover_json`] runs a fixed
//! cascade of repairs, re-attempting a full parse after each one, and only
//! ever returns a JSON object.

use serde_json::Value;

use crate::error::ParseError;

pub fn recover_json(raw: &str) -> Result<Value, ParseError> {
    let text = strip_fence(raw);

    let start = text
        .find('{')
        .ok_or_else(|| ParseError::new("no opening brace", raw))?;
    let end = text
        .rfind('}')
        .ok_or_else(|| ParseError::new("no closing brace", raw))?;

    if start < end {
        if let Some(value) = repair_and_parse(&text[start..=end]) {
            return Ok(value);
        }
    }

    if let Some(span) = first_balanced_object(raw) {
        if let Some(value) = repair_and_parse(span) {
            tracing::debug!("recovered JSON from first balanced object");
            return Ok(value);
        }
    }

    Err(ParseError::new("all recovery tiers failed", raw))
}

/// Direct parse, then without trailing commas, then with string control characters escaped
fn repair_and_parse(candidate: &str) -> Option<Value> {
    if let Some(value) = parse_object(candidate) {
        return Some(value);
    }

    let without_commas = remove_trailing_commas(candidate);
    if let Some(value) = parse_object(&without_commas) {
        return Some(value);
    }

    parse_object(&escape_control_chars(&without_commas))
}

fn parse_object(text: &str) -> Option<Value> {
    serde_json::from_str::<Value>(text)
        .ok()
        .filter(Value::is_object)
}

fn strip_fence(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```") {
        text = rest
            .strip_prefix("json")
            .or_else(|| rest.strip_prefix("JSON"))
            .unwrap_or(rest);
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// Tracks whether a scan is inside a string literal
#[derive(Default)]
struct StringScanner {
    in_string: bool,
    escaped: bool,
}

impl StringScanner {
    /// Feed one char; returns true when it belongs to a string literal (quotes included)
    fn step(&mut self, c: char) -> bool {
        if self.in_string {
            if self.escaped {
                self.escaped = false;
            } else if c == '\\' {
                self.escaped = true;
            } else if c == '"' {
                self.in_string = false;
            }
            true
        } else if c == '"' {
            self.in_string = true;
            true
        } else {
            false
        }
    }
}

fn remove_trailing_commas(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut scanner = StringScanner::default();

    for (i, &c) in chars.iter().enumerate() {
        if !scanner.step(c) && c == ',' {
            let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
            if matches!(next, Some('}') | Some(']')) {
                continue;
            }
        }
        out.push(c);
    }

    out
}

fn escape_control_chars(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut scanner = StringScanner::default();

    for c in text.chars() {
        let in_string = scanner.step(c);
        if in_string && (c as u32) < 0x20 {
            match c {
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                other => out.push_str(&format!("\\u{:04x}", other as u32)),
            }
        } else {
            out.push(c);
        }
    }

    out
}

/// First `{...}` span whose braces balance, ignoring braces inside strings
fn first_balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut scanner = StringScanner::default();

    for (offset, c) in text[start..].char_indices() {
        if scanner.step(c) {
            continue;
        }
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clean_object() {
        assert_eq!(recover_json(r#"{"a": 1}"#).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_fenced_object_with_prose() {
        let raw = "```json\n{\"intent\": 7}\n```";
        assert_eq!(recover_json(raw).unwrap(), json!({"intent": 7}));

        let raw = "Here is the analysis:\n```\n{\"intent\": 7}\n```\nLet me know!";
        assert_eq!(recover_json(raw).unwrap(), json!({"intent": 7}));
    }

    #[test]
    fn test_trailing_commas_removed_outside_strings() {
        let raw = r#"{"a": "x, }", "b": [1, 2,], }"#;
        assert_eq!(recover_json(raw).unwrap(), json!({"a": "x, }", "b": [1, 2]}));
    }

    #[test]
    fn test_raw_control_chars_in_strings_escaped() {
        let raw = "{\"summary\": \"line one\nline two\twith tab\",\n \"n\": 1,}";
        let value = recover_json(raw).unwrap();
        assert_eq!(value["summary"], "line one\nline two\twith tab");
        assert_eq!(value["n"], 1);
    }

    #[test]
    fn test_first_balanced_object_when_trailing_garbage_has_braces() {
        let raw = r#"{"a": {"b": "}"}} and then {"c": 2"#;
        // first `{` to last `}` is still a valid object here
        assert_eq!(recover_json(raw).unwrap(), json!({"a": {"b": "}"}}));

        let raw = r#"{"a": 1} note: {oops}"#;
        assert_eq!(recover_json(raw).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_no_braces_fails_with_excerpt() {
        let raw = "I'm sorry, I can't help with that.";
        let err = recover_json(raw).unwrap_err();
        assert_eq!(err.excerpt, raw);
        assert!(recover_json("[1, 2, 3]").is_err());
        assert!(recover_json("").is_err());
    }

    #[test]
    fn test_unrecoverable_truncation_fails() {
        let raw = format!("{{\"per_email\": [{}", "{\"index\": 1}, ".repeat(100));
        let err = recover_json(&raw).unwrap_err();
        assert_eq!(err.excerpt.chars().count(), 200);
    }

    #[test]
    fn test_success_is_always_an_object() {
        assert!(recover_json("}{").is_err());
        assert!(recover_json(r#"{"a": [1, 2]}"#).unwrap().is_object());
    }
}
