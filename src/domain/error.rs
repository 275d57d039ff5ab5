//! Domain error types.
//!
//! Two layers: [`EvalError`] is captured per condition item and never escapes
//! an evaluation; [`ScreenerError`] covers symbol-level and run-level failures
//! (collaborators, configuration, definitions).

use serde::{Deserialize, Serialize};

/// Why a single condition item could not be scored.
///
/// Every variant results in a failed (not passed) check; the message is
/// echoed into the item's result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EvalError {
    #[error("unknown field: {field}")]
    UnknownField { field: String },

    #[error("no data available for {field}")]
    NoData { field: String },

    #[error("operator {operator} not supported for {operand_type} comparisons")]
    UnsupportedOperator {
        operator: String,
        operand_type: String,
    },

    #[error("unknown operator: {operator}")]
    UnknownOperator { operator: String },

    #[error("invalid numeric values for comparison: {actual} vs {expected}")]
    InvalidNumericComparison { actual: String, expected: String },
}

/// Top-level error type for screener.
#[derive(Debug, thiserror::Error)]
pub enum ScreenerError {
    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("failed to read checklist definition {file}: {reason}")]
    DefinitionParse { file: String, reason: String },

    #[error("invalid checklist item {item_id}: {reason}")]
    DefinitionInvalid { item_id: i64, reason: String },

    #[error("checklist {id} not found")]
    ChecklistNotFound { id: i64 },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error("data source {provider} failed: {reason}")]
    DataSource { provider: String, reason: String },

    #[error("all {attempts} data sources failed for {symbol}")]
    AllSourcesFailed { symbol: String, attempts: usize },

    #[error(transparent)]
    Universe(#[from] crate::domain::universe::UniverseError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&ScreenerError> for std::process::ExitCode {
    fn from(err: &ScreenerError) -> Self {
        let code: u8 = match err {
            ScreenerError::Io(_) => 1,
            ScreenerError::ConfigParse { .. }
            | ScreenerError::ConfigMissing { .. }
            | ScreenerError::ConfigInvalid { .. }
            | ScreenerError::Universe(_) => 2,
            ScreenerError::Database { .. } | ScreenerError::DatabaseQuery { .. } => 3,
            ScreenerError::DefinitionParse { .. }
            | ScreenerError::DefinitionInvalid { .. }
            | ScreenerError::ChecklistNotFound { .. } => 4,
            ScreenerError::NoData { .. }
            | ScreenerError::DataSource { .. }
            | ScreenerError::AllSourcesFailed { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
