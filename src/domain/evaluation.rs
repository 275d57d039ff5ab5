//! Per-stock checklist evaluation.
//!
//! # Evaluation Semantics
//!
//! - Only enabled items are scored; they are visited in `sort_order`
//! - Every item yields an [`ItemResult`]; resolution and comparison errors
//!   are captured on the item and count as a failed check
//! - `score_percentage` is `passed / total * 100` rounded to two decimals,
//!   or `0` when no item is enabled
//! - Verdict is `pass` at 100, `fail` at 0, `partial` otherwise

use crate::domain::checklist::{Checklist, ConditionItem, enabled_in_order};
use crate::domain::compare::compare;
use crate::domain::error::EvalError;
use crate::domain::metrics::{MetricMapping, MetricValue};
use crate::domain::operand::{parse_expected, resolve_actual};
use crate::domain::operator::Operator;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Fail,
    Partial,
}

impl Verdict {
    pub fn from_score(score_percentage: f64) -> Self {
        if score_percentage == 100.0 {
            Verdict::Pass
        } else if score_percentage == 0.0 {
            Verdict::Fail
        } else {
            Verdict::Partial
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Verdict::Pass => "pass",
            Verdict::Fail => "fail",
            Verdict::Partial => "partial",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemResult {
    pub item_id: i64,
    pub left_operand: String,
    pub operator: String,
    pub right_operand: String,
    pub actual_value: Option<MetricValue>,
    pub expected_value: MetricValue,
    pub passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<EvalError>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub symbol: String,
    pub checklist_id: i64,
    pub passed_checks: usize,
    pub total_checks: usize,
    pub score_percentage: f64,
    pub details: Vec<ItemResult>,
    pub verdict: Verdict,
    /// Set only on degraded results, when the symbol could not be evaluated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EvaluationResult {
    /// Zero-check result standing in for a symbol that could not be evaluated.
    pub fn degraded(symbol: impl Into<String>, checklist_id: i64, reason: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            checklist_id,
            passed_checks: 0,
            total_checks: 0,
            score_percentage: 0.0,
            details: Vec::new(),
            verdict: Verdict::Fail,
            error: Some(reason.into()),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}

pub fn score_percentage(passed: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = passed as f64 / total as f64 * 100.0;
    (raw * 100.0).round() / 100.0
}

pub fn evaluate_item(mapping: &MetricMapping, item: &ConditionItem) -> ItemResult {
    let mut result = ItemResult {
        item_id: item.id,
        left_operand: item.left_operand.clone(),
        operator: item.operator.clone(),
        right_operand: item.right_operand.clone(),
        actual_value: None,
        expected_value: parse_expected(&item.right_operand),
        passed: false,
        error: None,
    };

    let actual = match resolve_actual(mapping, &item.left_operand) {
        Ok(value) => value,
        Err(e) => {
            result.error = Some(e);
            return result;
        }
    };
    result.actual_value = Some(actual.clone());

    let outcome = item
        .operator
        .parse::<Operator>()
        .and_then(|op| compare(actual, op, &result.expected_value));
    match outcome {
        Ok(passed) => result.passed = passed,
        Err(e) => result.error = Some(e),
    }
    result
}

pub fn evaluate_stock(
    mapping: &MetricMapping,
    checklist: &Checklist,
    items: &[ConditionItem],
) -> EvaluationResult {
    let details: Vec<ItemResult> = enabled_in_order(items)
        .into_iter()
        .map(|item| evaluate_item(mapping, item))
        .collect();

    let total_checks = details.len();
    let passed_checks = details.iter().filter(|r| r.passed).count();
    let score = score_percentage(passed_checks, total_checks);

    tracing::debug!(
        symbol = %mapping.symbol,
        checklist_id = checklist.id,
        passed_checks,
        total_checks,
        score,
        "evaluated symbol"
    );

    EvaluationResult {
        symbol: mapping.symbol.clone(),
        checklist_id: checklist.id,
        passed_checks,
        total_checks,
        score_percentage: score,
        details,
        verdict: Verdict::from_score(score),
        error: None,
    }
}

/// Sorts results by `score_percentage`, highest first. Equal scores keep
/// their input order.
pub fn rank_by_score(results: &mut [EvaluationResult]) {
    results.sort_by(|a, b| b.score_percentage.total_cmp(&a.score_percentage));
}
