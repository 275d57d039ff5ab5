//! Comparison operators accepted in condition items.

use crate::domain::error::EvalError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "contains")]
    Contains,
    #[serde(rename = "not_contains")]
    NotContains,
}

impl Operator {
    pub const ALL: [Operator; 8] = [
        Operator::Lt,
        Operator::Gt,
        Operator::Le,
        Operator::Ge,
        Operator::Eq,
        Operator::Ne,
        Operator::Contains,
        Operator::NotContains,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Lt => "<",
            Operator::Gt => ">",
            Operator::Le => "<=",
            Operator::Ge => ">=",
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Contains => "contains",
            Operator::NotContains => "not_contains",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Operator::Lt => "less than",
            Operator::Gt => "greater than",
            Operator::Le => "less than or equal",
            Operator::Ge => "greater than or equal",
            Operator::Eq => "equals",
            Operator::Ne => "not equals",
            Operator::Contains => "contains",
            Operator::NotContains => "does not contain",
        }
    }

    /// Ordering comparisons; only meaningful on numbers.
    pub fn is_relational(self) -> bool {
        matches!(
            self,
            Operator::Lt | Operator::Gt | Operator::Le | Operator::Ge
        )
    }

    /// Free-text matching; rejected on numeric operands.
    pub fn is_string_only(self) -> bool {
        matches!(self, Operator::Contains | Operator::NotContains)
    }
}

impl FromStr for Operator {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Operator::ALL
            .into_iter()
            .find(|op| op.symbol().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| EvalError::UnknownOperator {
                operator: s.to_string(),
            })
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
