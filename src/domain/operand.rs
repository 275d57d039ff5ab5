//! Operand resolution.
//!
//! The left operand names a catalog field and is looked up in the symbol's
//! metric mapping. The right operand is a literal: numeric when it starts
//! with a number (`"20%"` reads as 20), otherwise a case-folded string.

use crate::domain::error::EvalError;
use crate::domain::field::Field;
use crate::domain::metrics::{MetricMapping, MetricValue};

pub fn resolve_field(left_operand: &str) -> Result<Field, EvalError> {
    Field::from_key(left_operand).ok_or_else(|| EvalError::UnknownField {
        field: left_operand.to_string(),
    })
}

/// Looks up the actual value for `left_operand`. Absent values are `NoData`.
pub fn resolve_actual<'a>(
    mapping: &'a MetricMapping,
    left_operand: &str,
) -> Result<&'a MetricValue, EvalError> {
    let field = resolve_field(left_operand)?;
    mapping.get(field).ok_or_else(|| EvalError::NoData {
        field: field.key().to_string(),
    })
}

pub fn parse_expected(right_operand: &str) -> MetricValue {
    let trimmed = right_operand.trim();
    match leading_number(trimmed) {
        Some(n) => MetricValue::Number(n),
        None => MetricValue::Text(trimmed.to_lowercase()),
    }
}

/// Longest decimal prefix of `s` read as a float: optional sign, digits with
/// an optional fraction, optional exponent. `Infinity` (case-sensitive) is
/// accepted after the sign. `None` when no digit leads the text.
fn leading_number(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let mut end = 0;
    let mut negative = false;
    if let Some(&sign @ (b'+' | b'-')) = bytes.first() {
        negative = sign == b'-';
        end = 1;
    }

    if s[end..].starts_with("Infinity") {
        return Some(if negative { f64::NEG_INFINITY } else { f64::INFINITY });
    }

    let digits = |from: usize| {
        bytes[from..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    };

    let int_digits = digits(end);
    end += int_digits;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = digits(end + 1);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    if let Some(b'e' | b'E') = bytes.get(end) {
        let mut exp = end + 1;
        if let Some(b'+' | b'-') = bytes.get(exp) {
            exp += 1;
        }
        let exp_digits = digits(exp);
        if exp_digits > 0 {
            end = exp + exp_digits;
        }
    }

    s[..end].parse().ok()
}
