//! Typed comparison semantics.
//!
//! - Both operands numeric: relational operators as usual; `=` and `!=`
//!   compare within [`EQUALITY_TOLERANCE`]; `contains`/`not_contains` are
//!   rejected
//! - Either operand textual: case-folded `=`, `!=`, `contains` and
//!   `not_contains`; relational operators are rejected

use crate::domain::error::EvalError;
use crate::domain::metrics::MetricValue;
use crate::domain::operator::Operator;

/// Absolute tolerance for numeric `=` and `!=`. Shared by ratios, dollar
/// amounts and percentages alike.
pub const EQUALITY_TOLERANCE: f64 = 0.001;

pub fn compare(
    actual: &MetricValue,
    operator: Operator,
    expected: &MetricValue,
) -> Result<bool, EvalError> {
    match (actual, expected) {
        (MetricValue::Number(a), MetricValue::Number(e)) => compare_numbers(*a, operator, *e),
        _ => compare_text(&actual.folded(), operator, &expected.folded()),
    }
}

fn compare_numbers(actual: f64, operator: Operator, expected: f64) -> Result<bool, EvalError> {
    if actual.is_nan() || expected.is_nan() {
        return Err(EvalError::InvalidNumericComparison {
            actual: actual.to_string(),
            expected: expected.to_string(),
        });
    }

    let passed = match operator {
        Operator::Lt => actual < expected,
        Operator::Gt => actual > expected,
        Operator::Le => actual <= expected,
        Operator::Ge => actual >= expected,
        Operator::Eq => (actual - expected).abs() < EQUALITY_TOLERANCE,
        Operator::Ne => (actual - expected).abs() >= EQUALITY_TOLERANCE,
        Operator::Contains | Operator::NotContains => {
            return Err(EvalError::UnsupportedOperator {
                operator: operator.to_string(),
                operand_type: "numeric".into(),
            });
        }
    };
    Ok(passed)
}

fn compare_text(actual: &str, operator: Operator, expected: &str) -> Result<bool, EvalError> {
    match operator {
        Operator::Eq => Ok(actual == expected),
        Operator::Ne => Ok(actual != expected),
        Operator::Contains => Ok(actual.contains(expected)),
        Operator::NotContains => Ok(!actual.contains(expected)),
        Operator::Lt | Operator::Gt | Operator::Le | Operator::Ge => {
            Err(EvalError::UnsupportedOperator {
                operator: operator.to_string(),
                operand_type: "string".into(),
            })
        }
    }
}
