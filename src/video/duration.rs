//! Duration parsing across provider formats.
//!
//! Providers disagree on whether a duration is seconds, an ISO-8601 string,
//! or absent entirely. Every function here is total: anything unparseable
//! becomes `0`, which downstream treats as "duration unknown".

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

/// `PT#H#M#S` with every component optional.
#[allow(clippy::expect_used)]
static ISO8601_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?").expect("duration regex is valid") // Static pattern, safe to panic
});

/// Parses an ISO-8601 `PT#H#M#S` duration into whole seconds.
///
/// Absent components contribute 0. Malformed input yields 0.
#[must_use]
pub fn parse_iso8601(duration: &str) -> u64 {
    let Some(captures) = ISO8601_DURATION.captures(duration) else {
        return 0;
    };

    let component = |index: usize, unit: u64| -> u64 {
        captures
            .get(index)
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .map_or(0, |value| value.saturating_mul(unit))
    };

    component(1, 3600)
        .saturating_add(component(2, 60))
        .saturating_add(component(3, 1))
}

/// Coerces a raw JSON duration field into whole seconds.
///
/// - numbers are floored and clamped to be non-negative
/// - digit-only strings are parsed directly
/// - any other string is treated as ISO-8601
/// - everything else (null, bool, arrays, objects) is 0
#[must_use]
pub fn coerce_duration(value: &Value) -> u64 {
    match value {
        Value::Number(number) => {
            if let Some(unsigned) = number.as_u64() {
                unsigned
            } else if let Some(float) = number.as_f64() {
                float_to_seconds(float)
            } else {
                0
            }
        }
        Value::String(text) => coerce_duration_str(text),
        _ => 0,
    }
}

/// String form of [`coerce_duration`].
#[must_use]
pub fn coerce_duration_str(text: &str) -> u64 {
    let trimmed = text.trim();
    if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return trimmed.parse::<u64>().unwrap_or(0);
    }
    parse_iso8601(trimmed)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn float_to_seconds(value: f64) -> u64 {
    if value.is_nan() || value <= 0.0 {
        0
    } else {
        // `as` saturates for out-of-range floats
        value.floor() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_iso8601_full() {
        assert_eq!(parse_iso8601("PT1H2M3S"), 3723);
    }

    #[test]
    fn test_parse_iso8601_partial_components() {
        assert_eq!(parse_iso8601("PT4M13S"), 253);
        assert_eq!(parse_iso8601("PT2H"), 7200);
        assert_eq!(parse_iso8601("PT45S"), 45);
        assert_eq!(parse_iso8601("PT1H30S"), 3630);
    }

    #[test]
    fn test_parse_iso8601_empty_and_garbage_are_zero() {
        assert_eq!(parse_iso8601(""), 0);
        assert_eq!(parse_iso8601("garbage"), 0);
        assert_eq!(parse_iso8601("PT"), 0);
        assert_eq!(parse_iso8601("12:34"), 0);
    }

    #[test]
    fn test_parse_iso8601_overflowing_component_is_dropped() {
        assert_eq!(parse_iso8601("PT99999999999999999999999H5S"), 5);
    }

    #[test]
    fn test_parse_iso8601_saturates_instead_of_overflowing() {
        let huge = format!("PT{}H", u64::MAX / 10);
        assert_eq!(parse_iso8601(&huge), u64::MAX);
    }

    #[test]
    fn test_coerce_numeric_values() {
        assert_eq!(coerce_duration(&json!(754)), 754);
        assert_eq!(coerce_duration(&json!(12.9)), 12);
        assert_eq!(coerce_duration(&json!(-1)), 0);
        assert_eq!(coerce_duration(&json!(-3.5)), 0);
    }

    #[test]
    fn test_coerce_string_values() {
        assert_eq!(coerce_duration(&json!("600")), 600);
        assert_eq!(coerce_duration(&json!(" 42 ")), 42);
        assert_eq!(coerce_duration(&json!("PT10M")), 600);
        assert_eq!(coerce_duration(&json!("ten minutes")), 0);
        assert_eq!(coerce_duration(&json!("")), 0);
    }

    #[test]
    fn test_coerce_non_scalar_values_are_zero() {
        assert_eq!(coerce_duration(&Value::Null), 0);
        assert_eq!(coerce_duration(&json!(true)), 0);
        assert_eq!(coerce_duration(&json!([1, 2])), 0);
        assert_eq!(coerce_duration(&json!({"seconds": 5})), 0);
    }
}
