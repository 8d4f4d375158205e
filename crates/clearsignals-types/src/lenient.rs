//! Forgiving field decoders for model-generated JSON.
//!
//! Models return `7.5`, `"7"`, `"65%"` or `null` where an integer is asked
//! for, and `null` where a string is asked for. These helpers are used with
//! `#[serde(deserialize_with = ...)]` so one sloppy field does not reject a
//! whole stage's output.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub const DEFAULT_INTENT: u8 = 5;
pub const DEFAULT_WIN_PCT: u8 = 50;

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse().ok(),
        _ => None,
    }
    .filter(|n: &f64| n.is_finite())
}

fn clamp_round(value: Option<f64>, min: f64, max: f64, default: f64) -> f64 {
    value.map(|n| n.round().clamp(min, max)).unwrap_or(default)
}

pub fn default_intent() -> u8 {
    DEFAULT_INTENT
}

pub fn default_win_pct() -> u8 {
    DEFAULT_WIN_PCT
}

/// Buyer intent, 1..=10
pub fn intent<'de, D: Deserializer<'de>>(d: D) -> Result<u8, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(clamp_round(number(&v), 1.0, 10.0, DEFAULT_INTENT as f64) as u8)
}

/// Win probability, 0..=100
pub fn win_pct<'de, D: Deserializer<'de>>(d: D) -> Result<u8, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(clamp_round(number(&v), 0.0, 100.0, DEFAULT_WIN_PCT as f64) as u8)
}

/// Non-negative tally
pub fn count<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(clamp_round(number(&v), 0.0, u32::MAX as f64, 0.0) as u32)
}

/// 1-based ordinal; 0 means "not given" and is fixed up by the caller
pub fn ordinal<'de, D: Deserializer<'de>>(d: D) -> Result<usize, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(clamp_round(number(&v), 0.0, u32::MAX as f64, 0.0) as usize)
}

/// String that tolerates `null` and scalars
pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(match v {
        Value::String(s) => s,
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    })
}

/// Optional string; blank and `null` collapse to `None`
pub fn opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let s = string(d)?;
    let trimmed = s.trim();
    Ok(if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
        None
    } else {
        Some(s)
    })
}

/// List that tolerates `null`
pub fn list<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(d)?.unwrap_or_default())
}

/// Lowercased enum tag, `None` for missing/non-string values
pub(crate) fn tag<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(match v {
        Value::String(s) => Some(s.trim().to_ascii_lowercase().replace(|c: char| c == ' ' || c == '-', "_")),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Scores {
        #[serde(default = "default_intent", deserialize_with = "intent")]
        intent: u8,
        #[serde(default = "default_win_pct", deserialize_with = "win_pct")]
        win: u8,
        #[serde(default, deserialize_with = "string")]
        text: String,
        #[serde(default, deserialize_with = "opt_string")]
        note: Option<String>,
    }

    fn decode(json: &str) -> Scores {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_numbers_round_and_clamp() {
        let s = decode(r#"{"intent": 7.6, "win": 140}"#);
        assert_eq!(s.intent, 8);
        assert_eq!(s.win, 100);

        let s = decode(r#"{"intent": -3, "win": -1}"#);
        assert_eq!(s.intent, 1);
        assert_eq!(s.win, 0);
    }

    #[test]
    fn test_numeric_strings_accepted() {
        let s = decode(r#"{"intent": "6", "win": "65%"}"#);
        assert_eq!(s.intent, 6);
        assert_eq!(s.win, 65);
    }

    #[test]
    fn test_missing_and_null_use_neutral_defaults() {
        let s = decode(r#"{}"#);
        assert_eq!(s.intent, DEFAULT_INTENT);
        assert_eq!(s.win, DEFAULT_WIN_PCT);

        let s = decode(r#"{"intent": null, "win": "n/a", "text": null, "note": null}"#);
        assert_eq!(s.intent, DEFAULT_INTENT);
        assert_eq!(s.win, DEFAULT_WIN_PCT);
        assert_eq!(s.text, "");
        assert_eq!(s.note, None);
    }

    #[test]
    fn test_blank_optional_string_is_none() {
        assert_eq!(decode(r#"{"note": "  "}"#).note, None);
        assert_eq!(decode(r#"{"note": "Asked for pricing"}"#).note.as_deref(), Some("Asked for pricing"));
    }
}
