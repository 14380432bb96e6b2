//! Box layout: resolve `left/top/right/bottom/width/height` against a container.
//!
//! Values are either plain numbers (pixels) or strings: `"12%"` is relative to the matching
//! container dimension, `"center"`/`"middle"` mean 50%, `"left"`/`"top"` 0% and
//! `"right"`/`"bottom"` 100%. Anything else is parsed like a numeric prefix (`"30px"` -> 30).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PositionValue {
    Number(f64),
    Text(String),
}

impl PositionValue {
    /// Truthiness of the raw option value, used to pick between opposite edges.
    fn is_set(&self) -> bool {
        match self {
            PositionValue::Number(n) => *n != 0.0 && !n.is_nan(),
            PositionValue::Text(s) => !s.is_empty(),
        }
    }
}

impl From<f64> for PositionValue {
    fn from(value: f64) -> Self {
        PositionValue::Number(value)
    }
}

impl From<&str> for PositionValue {
    fn from(value: &str) -> Self {
        PositionValue::Text(value.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoxLayoutParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<PositionValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<PositionValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<PositionValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom: Option<PositionValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<PositionValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<PositionValue>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Resolves a position value against `all`. Missing or unparsable values yield `NaN`.
pub fn parse_percent(value: Option<&PositionValue>, all: f64) -> f64 {
    let text = match value {
        None => return f64::NAN,
        Some(PositionValue::Number(n)) => return *n,
        Some(PositionValue::Text(s)) => s.as_str(),
    };
    let text = match text {
        "center" | "middle" => "50%",
        "left" | "top" => "0%",
        "right" | "bottom" => "100%",
        other => other,
    };
    if text.trim().ends_with('%') {
        return parse_float(text) / 100.0 * all;
    }
    parse_float(text)
}

/// Parses the longest leading float literal, ignoring leading whitespace.
fn parse_float(s: &str) -> f64 {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }
    if end == digits_start || &s[digits_start..end] == "." {
        return f64::NAN;
    }
    let mantissa_end = end;
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }
    s[..end]
        .parse::<f64>()
        .or_else(|_| s[..mantissa_end].parse::<f64>())
        .unwrap_or(f64::NAN)
}

fn or_zero(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v }
}

fn alignment<'a>(a: Option<&'a PositionValue>, b: Option<&'a PositionValue>) -> Option<&'a str> {
    let picked = match a {
        Some(v) if v.is_set() => Some(v),
        _ => b,
    };
    match picked {
        Some(PositionValue::Text(s)) => Some(s.as_str()),
        _ => None,
    }
}

/// Computes the rectangle a component occupies inside a `container_width` x
/// `container_height` viewport.
pub fn get_layout_rect(
    params: &BoxLayoutParams,
    container_width: f64,
    container_height: f64,
) -> LayoutRect {
    let mut left = parse_percent(params.left.as_ref(), container_width);
    let mut top = parse_percent(params.top.as_ref(), container_height);
    let right = parse_percent(params.right.as_ref(), container_width);
    let bottom = parse_percent(params.bottom.as_ref(), container_height);
    let mut width = parse_percent(params.width.as_ref(), container_width);
    let mut height = parse_percent(params.height.as_ref(), container_height);

    if width.is_nan() {
        width = container_width - right - left;
    }
    if height.is_nan() {
        height = container_height - bottom - top;
    }

    if left.is_nan() {
        left = container_width - right - width;
    }
    if top.is_nan() {
        top = container_height - bottom - height;
    }

    match alignment(params.left.as_ref(), params.right.as_ref()) {
        Some("center") => left = container_width / 2.0 - width / 2.0,
        Some("right") => left = container_width - width,
        _ => {}
    }
    match alignment(params.top.as_ref(), params.bottom.as_ref()) {
        Some("middle" | "center") => top = container_height / 2.0 - height / 2.0,
        Some("bottom") => top = container_height - height,
        _ => {}
    }

    let left = or_zero(left);
    let top = or_zero(top);
    if width.is_nan() {
        width = container_width - left - or_zero(right);
    }
    if height.is_nan() {
        height = container_height - top - or_zero(bottom);
    }

    LayoutRect {
        x: left,
        y: top,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn parse_percent_handles_keywords_and_units() {
        assert!(close(parse_percent(Some(&"12%".into()), 200.0), 24.0));
        assert!(close(parse_percent(Some(&"center".into()), 80.0), 40.0));
        assert!(close(parse_percent(Some(&"bottom".into()), 80.0), 80.0));
        assert!(close(parse_percent(Some(&"30px".into()), 80.0), 30.0));
        assert!(close(parse_percent(Some(&" 7.5 ".into()), 80.0), 7.5));
        let eleven = PositionValue::Number(11.0);
        assert!(close(parse_percent(Some(&eleven), 80.0), 11.0));
        assert!(parse_percent(None, 80.0).is_nan());
        assert!(parse_percent(Some(&"auto".into()), 80.0).is_nan());
    }

    #[test]
    fn size_comes_from_opposite_edges() {
        let params = BoxLayoutParams {
            left: Some("12%".into()),
            top: Some("12%".into()),
            right: Some("12%".into()),
            bottom: Some("12%".into()),
            ..Default::default()
        };
        let rect = get_layout_rect(&params, 1000.0, 500.0);
        assert!(close(rect.x, 120.0));
        assert!(close(rect.y, 60.0));
        assert!(close(rect.width, 760.0));
        assert!(close(rect.height, 380.0));
    }

    #[test]
    fn explicit_size_is_aligned_by_keywords() {
        let params = BoxLayoutParams {
            left: Some("center".into()),
            top: Some("bottom".into()),
            width: Some(PositionValue::Number(100.0)),
            height: Some(PositionValue::Number(50.0)),
            ..Default::default()
        };
        let rect = get_layout_rect(&params, 400.0, 300.0);
        assert!(close(rect.x, 150.0));
        assert!(close(rect.y, 250.0));
        assert!(close(rect.width, 100.0));
        assert!(close(rect.height, 50.0));
    }

    #[test]
    fn left_is_derived_from_right_and_width() {
        let params = BoxLayoutParams {
            right: Some(PositionValue::Number(20.0)),
            width: Some(PositionValue::Number(100.0)),
            ..Default::default()
        };
        let rect = get_layout_rect(&params, 400.0, 300.0);
        assert!(close(rect.x, 280.0));
        // Neither top nor bottom: the rect spans the full height from 0.
        assert!(close(rect.y, 0.0));
        assert!(close(rect.height, 300.0));
    }
}
