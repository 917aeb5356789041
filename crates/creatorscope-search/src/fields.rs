//! Defensive readers for untrusted upstream JSON.
//!
//! Upstream records are duck-typed: the same datum may be a number in one
//! response and a numeric string in the next. These helpers never panic and
//! never yield `NaN`; anything unusable comes back as `None`.

use serde_json::Value;

/// Coerces a JSON value to a finite `f64`.
///
/// Accepts finite numbers and non-blank numeric strings. Booleans, nulls,
/// arrays, objects and unparsable or non-finite strings yield `None`.
#[must_use]
pub fn strict_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok()?
        }
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Trimmed, non-empty string content of a JSON string value.
#[must_use]
pub fn non_empty_str(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// Coerces an identifier that may arrive as a string or a number.
///
/// Integral numbers render without a fractional part (`42.0` → `"42"`).
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
pub fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(_) => non_empty_str(value),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                let f = n.as_f64().filter(|f| f.is_finite())?;
                if f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 {
                    Some((f as i64).to_string())
                } else {
                    Some(f.to_string())
                }
            }
        }
        _ => None,
    }
}

/// Booleans and the strings `"true"`/`"false"` (any case).
#[must_use]
pub fn flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Whether a value counts as present: not null, and not a blank string.
#[must_use]
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strict_number_accepts_numbers_and_numeric_strings() {
        assert_eq!(strict_number(&json!(12)), Some(12.0));
        assert_eq!(strict_number(&json!(0.034)), Some(0.034));
        assert_eq!(strict_number(&json!(" 1500 ")), Some(1500.0));
    }

    #[test]
    fn strict_number_rejects_everything_else() {
        for v in [
            json!(null),
            json!(true),
            json!(""),
            json!("12k"),
            json!("NaN"),
            json!("inf"),
            json!([1]),
            json!({"n": 1}),
        ] {
            assert_eq!(strict_number(&v), None, "value: {v}");
        }
    }

    #[test]
    fn id_string_handles_strings_and_numbers() {
        assert_eq!(id_string(&json!("  UCabc ")), Some("UCabc".to_owned()));
        assert_eq!(id_string(&json!(173_560_420)), Some("173560420".to_owned()));
        assert_eq!(id_string(&json!(42.0)), Some("42".to_owned()));
        assert_eq!(id_string(&json!("   ")), None);
        assert_eq!(id_string(&json!(false)), None);
    }

    #[test]
    fn flag_reads_bools_and_bool_strings() {
        assert_eq!(flag(&json!(true)), Some(true));
        assert_eq!(flag(&json!("FALSE")), Some(false));
        assert_eq!(flag(&json!(1)), None);
    }
}
