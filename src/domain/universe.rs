//! Symbol universe for a batch evaluation.
//!
//! Parses symbol lists from configuration or the command line and enforces
//! the per-run batch ceiling.

use std::collections::HashSet;

pub const DEFAULT_MAX_SYMBOLS: usize = 50;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in symbol list")]
    EmptyToken,

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),

    #[error("no symbols requested")]
    Empty,

    #[error("too many symbols requested: {requested} (max {limit})")]
    TooMany { requested: usize, limit: usize },
}

pub fn parse_symbols(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let symbol = trimmed.to_uppercase();
        if !seen.insert(symbol.clone()) {
            return Err(UniverseError::DuplicateSymbol(symbol));
        }
        symbols.push(symbol);
    }

    Ok(symbols)
}

pub fn check_batch_size(symbols: &[String], limit: usize) -> Result<(), UniverseError> {
    if symbols.is_empty() {
        return Err(UniverseError::Empty);
    }
    if symbols.len() > limit {
        return Err(UniverseError::TooMany {
            requested: symbols.len(),
            limit,
        });
    }
    Ok(())
}
