//! Best-effort pixel-coordinate extraction from free-text model output.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

/// A point in image pixel space, (0, 0) at the top-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: f64,
    pub y: f64,
}

/// Brace-delimited object, no nested braces, mentioning "x" before "y".
fn json_object_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"\{[^{}]*"x"[^{}]*"y"[^{}]*\}"#).expect("coordinate object pattern is valid")
    })
}

/// ASCII decimals only.
fn number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[0-9]+\.?[0-9]*").expect("number pattern is valid"))
}

/// Extract `{x, y}` from model output.
///
/// First looks for a small JSON object with numeric `x` and `y`. If there is
/// none, or it does not parse, takes the first two decimal numbers anywhere
/// in the text. Unrelated numbers (timestamps, scores) can be picked up by the
/// second stage.
pub fn extract_coordinates(text: &str) -> Option<Coordinates> {
    from_json_object(text).or_else(|| from_number_scan(text))
}

fn from_json_object(text: &str) -> Option<Coordinates> {
    let candidate = json_object_pattern().find(text)?;
    let value: Value = serde_json::from_str(candidate.as_str()).ok()?;
    Some(Coordinates {
        x: value.get("x")?.as_f64()?,
        y: value.get("y")?.as_f64()?,
    })
}

fn from_number_scan(text: &str) -> Option<Coordinates> {
    let mut numbers = number_pattern()
        .find_iter(text)
        .filter_map(|m| m.as_str().parse::<f64>().ok());
    Some(Coordinates {
        x: numbers.next()?,
        y: numbers.next()?,
    })
}
