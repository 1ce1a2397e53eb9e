//! Loosely-typed vital readings
//!
//! Producers send the same logical reading in several encodings: plain
//! numbers, unit-suffixed strings ("72 bpm"), percentages ("38%") and
//! qualitative labels ("Moderate"). [`VitalValue`] captures which encoding
//! arrived so each field can resolve it explicitly.

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Qualitative level reported instead of a number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelLabel {
    Low,
    Moderate,
    High,
}

impl LevelLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LevelLabel::Low => "low",
            LevelLabel::Moderate => "moderate",
            LevelLabel::High => "high",
        }
    }

    /// Case-insensitive substring match, checked in the order low,
    /// moderate/medium, high.
    pub fn detect(text: &str) -> Option<Self> {
        let lower = text.to_lowercase();
        if lower.contains("low") {
            Some(LevelLabel::Low)
        } else if lower.contains("moderate") || lower.contains("medium") {
            Some(LevelLabel::Moderate)
        } else if lower.contains("high") {
            Some(LevelLabel::High)
        } else {
            None
        }
    }
}

/// A single vital reading as supplied by a producer
#[derive(Debug, Clone, PartialEq)]
pub enum VitalValue {
    /// JSON number
    Numeric(f64),
    /// String carrying a `%` sign whose numeric part parsed
    Percentage(f64),
    /// Digit-free string naming a level
    Label(LevelLabel),
    /// Any other string, resolved per field
    Raw(String),
}

impl VitalValue {
    /// Classify a string reading.
    pub fn classify(text: &str) -> Self {
        if text.contains('%') {
            return match parse_number(text) {
                Some(n) => VitalValue::Percentage(n),
                None => VitalValue::Raw(text.to_string()),
            };
        }

        if !text.chars().any(|c| c.is_ascii_digit()) {
            if let Some(label) = LevelLabel::detect(text) {
                return VitalValue::Label(label);
            }
        }

        VitalValue::Raw(text.to_string())
    }

    /// Numeric reading under the shared cleaning rule. Labels never yield a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            VitalValue::Numeric(n) | VitalValue::Percentage(n) => Some(*n).filter(|n| n.is_finite()),
            VitalValue::Label(_) => None,
            VitalValue::Raw(text) => parse_number(text),
        }
    }

    /// Original text for string encodings
    pub fn text(&self) -> Option<&str> {
        match self {
            VitalValue::Raw(text) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Blank strings carry no reading
    pub fn is_blank(&self) -> bool {
        matches!(self, VitalValue::Raw(text) if text.trim().is_empty())
    }
}

impl From<f64> for VitalValue {
    fn from(n: f64) -> Self {
        VitalValue::Numeric(n)
    }
}

impl From<&str> for VitalValue {
    fn from(text: &str) -> Self {
        VitalValue::classify(text)
    }
}

impl From<String> for VitalValue {
    fn from(text: String) -> Self {
        VitalValue::classify(&text)
    }
}

impl Serialize for VitalValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            VitalValue::Numeric(n) => serializer.serialize_f64(*n),
            VitalValue::Percentage(n) => serializer.serialize_str(&format!("{n}%")),
            VitalValue::Label(label) => serializer.serialize_str(label.as_str()),
            VitalValue::Raw(text) => serializer.serialize_str(text),
        }
    }
}

impl<'de> Deserialize<'de> for VitalValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::Number(n) => n
                .as_f64()
                .map(VitalValue::Numeric)
                .ok_or_else(|| de::Error::custom("vital reading is not representable as f64")),
            serde_json::Value::String(text) => Ok(VitalValue::classify(&text)),
            other => Err(de::Error::custom(format!(
                "vital reading must be a number or a string, found {}",
                json_kind(&other)
            ))),
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Strip everything except digits, `.`, `/` and `-`.
pub(crate) fn clean_numeric(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '/' | '-'))
        .collect()
}

/// Plain-float parse of a reading. Slash-shaped text (blood pressure) never
/// parses here.
pub(crate) fn parse_number(text: &str) -> Option<f64> {
    let cleaned = clean_numeric(text);
    if cleaned.contains('/') {
        return None;
    }
    parse_leading_float(&cleaned)
}

/// Parse the longest numeric prefix (`-?digits[.digits]`), ignoring trailing text.
fn parse_leading_float(text: &str) -> Option<f64> {
    let bytes = text.as_bytes();
    let mut end = 0;
    if bytes.first() == Some(&b'-') {
        end = 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > frac_start {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    text[..end].parse::<f64>().ok().filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_encodings() {
        assert_eq!(VitalValue::classify("38%"), VitalValue::Percentage(38.0));
        assert_eq!(VitalValue::classify("Moderate"), VitalValue::Label(LevelLabel::Moderate));
        assert_eq!(VitalValue::classify("medium"), VitalValue::Label(LevelLabel::Moderate));
        assert_eq!(VitalValue::classify("72 bpm"), VitalValue::Raw("72 bpm".to_string()));
        assert_eq!(VitalValue::classify("abc%"), VitalValue::Raw("abc%".to_string()));
    }

    #[test]
    fn test_labels_checked_low_first() {
        assert_eq!(LevelLabel::detect("HIGH"), Some(LevelLabel::High));
        assert_eq!(LevelLabel::detect("low to high"), Some(LevelLabel::Low));
        assert_eq!(LevelLabel::detect("normal"), None);
    }

    #[test]
    fn test_parse_number_strips_units() {
        assert_eq!(parse_number("72 bpm"), Some(72.0));
        assert_eq!(parse_number("7.5 hrs"), Some(7.5));
        assert_eq!(parse_number("36.8 °C"), Some(36.8));
        assert_eq!(parse_number("1.2.3"), Some(1.2));
        assert_eq!(parse_number("-.5"), Some(-0.5));
        assert_eq!(parse_number("12-14"), Some(12.0));
    }

    #[test]
    fn test_parse_number_rejects_slash_and_empty() {
        assert_eq!(parse_number("118/76"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("bpm"), None);
        assert_eq!(parse_number("-"), None);
        assert_eq!(parse_number("."), None);
    }

    #[test]
    fn test_deserialize_rejects_structural_values() {
        assert!(serde_json::from_str::<VitalValue>("true").is_err());
        assert!(serde_json::from_str::<VitalValue>("[1, 2]").is_err());
        assert!(serde_json::from_str::<VitalValue>(r#"{"v": 1}"#).is_err());

        let value: VitalValue = serde_json::from_str("72").unwrap();
        assert_eq!(value, VitalValue::Numeric(72.0));
    }

    #[test]
    fn test_serialize_keeps_encoding() {
        let json = serde_json::to_string(&VitalValue::Percentage(38.0)).unwrap();
        assert_eq!(json, r#""38%""#);
        let json = serde_json::to_string(&VitalValue::Label(LevelLabel::High)).unwrap();
        assert_eq!(json, r#""high""#);
    }
}
