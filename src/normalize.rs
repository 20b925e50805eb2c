//! Scalar normalizers
//!
//! Turn located raw values into typed output. Every function returns `None`
//! on failure; nothing here errors.

use regex::Regex;
use std::sync::LazyLock;

use crate::tag_bag::RawValue;

static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("digit run regex should compile"));

static DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("decimal regex should compile"));

static FLOAT_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-+]?(?:\d+(?:\.\d*)?|\.\d+)").expect("float prefix regex should compile")
});

static F_STOP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)f/\s*(\d+(?:\.\d+)?)").expect("f-number regex should compile")
});

static MILLIMETRES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*mm").expect("focal length regex should compile")
});

/// First run of ASCII digits.
pub fn first_digit_run(s: &str) -> Option<&str> {
    DIGIT_RUN.find(s).map(|m| m.as_str())
}

/// First decimal number (`123`, `1.8`, `.5` is not accepted) in the string.
pub fn first_decimal(s: &str) -> Option<f64> {
    DECIMAL.find(s)?.as_str().parse().ok()
}

/// Leading-prefix float parse: `"40.7 N"` is 40.7, `"abc"` is `None`.
pub fn parse_float_prefix(s: &str) -> Option<f64> {
    FLOAT_PREFIX.find(s.trim_start())?.as_str().parse().ok()
}

fn captured_decimal(pattern: &Regex, s: &str) -> Option<f64> {
    pattern.captures(s)?.get(1)?.as_str().parse().ok()
}

fn parse_u32(text: &str) -> Option<u32> {
    let trimmed = text.trim();
    trimmed
        .parse::<u32>()
        .ok()
        .or_else(|| trimmed.parse::<f64>().ok().filter(|v| v.fract() == 0.0 && *v >= 0.0).map(|v| v as u32))
}

/// Exposure time as a display fraction.
pub fn exposure(raw: &RawValue) -> Option<String> {
    let text = raw.to_string();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.contains('/') {
        return Some(trimmed.to_string());
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v > 0.0 && v < 1.0 => Some(format!("1/{}", (1.0 / v).round() as u64)),
        _ => Some(trimmed.to_string()),
    }
}

/// `f/1.8`, `1.8`
pub fn f_number(raw: &RawValue) -> Option<f64> {
    if let RawValue::Number(n) = raw {
        return Some(*n).filter(|v| v.is_finite());
    }
    let text = raw.to_string();
    captured_decimal(&F_STOP, &text)
        .or_else(|| first_decimal(&text))
        .or_else(|| text.trim().parse().ok())
        .filter(|v: &f64| v.is_finite())
}

pub fn iso(raw: &RawValue) -> Option<u32> {
    digits_or_integer(raw)
}

/// `4.2 mm`, `26`
pub fn focal_length(raw: &RawValue) -> Option<f64> {
    if let RawValue::Number(n) = raw {
        return Some(*n).filter(|v| v.is_finite());
    }
    let text = raw.to_string();
    captured_decimal(&MILLIMETRES, &text)
        .or_else(|| first_decimal(&text))
        .or_else(|| text.trim().parse().ok())
        .filter(|v: &f64| v.is_finite())
}

pub fn orientation(raw: &RawValue) -> Option<u32> {
    digits_or_integer(raw)
}

/// One half of a resolution.
pub fn dimension(raw: &RawValue) -> Option<u32> {
    digits_or_integer(raw)
}

/// `"<w> x <h>"` only when both halves parse.
pub fn resolution(width: Option<&RawValue>, height: Option<&RawValue>) -> Option<String> {
    let w = dimension(width?)?;
    let h = dimension(height?)?;
    Some(format!("{} x {}", w, h))
}

/// Free-text fields: trimmed, surrounding quotes removed, empty is absent.
pub fn text(raw: &RawValue) -> Option<String> {
    let s = raw.to_string();
    let s = s.trim().trim_matches('"').trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

fn digits_or_integer(raw: &RawValue) -> Option<u32> {
    match raw {
        RawValue::Number(n) if n.is_finite() && *n >= 0.0 => Some(n.trunc() as u32),
        _ => {
            let text = raw.to_string();
            first_digit_run(&text)
                .and_then(|d| d.parse().ok())
                .or_else(|| parse_u32(&text))
        }
    }
}

/// `model` prefixed with `make` unless it already mentions it.
pub fn merge_make_model(make: Option<&str>, model: Option<String>) -> Option<String> {
    let model = model?;
    match make {
        Some(make) if !model.to_lowercase().contains(&make.to_lowercase()) => {
            Some(format!("{} {}", make, model))
        }
        _ => Some(model),
    }
}
