//! Money and measurement value normalization.
//!
//! Pure coercion helpers used by the schema normalizer. They never fail:
//! anything that cannot be read as a number comes back as `None`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Currency markers stripped before numeral extraction: the letters of
/// "RM", whitespace, and common currency symbols.
static CURRENCY_MARKERS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[RM\s$€£¥₹]").unwrap());

/// First decimal-or-integer numeral in a cleaned string.
static NUMERAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?").unwrap());

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Normalize a price value to a float with 2 decimal places.
///
/// Null stays unset. Numbers are rounded. Strings have currency markers
/// stripped ("RM 12", "$9.50") before the first numeral is extracted; a
/// string with no numeral ("free") comes back unset.
pub fn normalize_money(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().map(round2),
        Value::String(s) => {
            let cleaned = CURRENCY_MARKERS.replace_all(s.trim(), "");
            NUMERAL
                .find(&cleaned)
                .and_then(|m| m.as_str().parse::<f64>().ok())
                .map(round2)
        }
        _ => None,
    }
}

/// Coerce a size value to a float. Numeric strings are accepted; anything
/// else is unset.
pub fn coerce_size_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}
