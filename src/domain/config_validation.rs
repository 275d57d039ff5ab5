//! Configuration validation.
//!
//! Validates all config fields before an evaluation run.

use crate::domain::error::ScreenerError;
use crate::domain::universe::{DEFAULT_MAX_SYMBOLS, parse_symbols};
use crate::ports::config_port::{ConfigPort, parse_bool};

pub const BACKOFF_STRATEGIES: [&str; 2] = ["fixed", "exponential"];
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    validate_sources(config)?;
    validate_retry_delay(config)?;
    validate_backoff(config)?;
    validate_symbols(config)?;
    validate_max_symbols(config)?;
    validate_pool_size(config)?;
    validate_log_level(config)?;
    validate_ansi(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: String) -> ScreenerError {
    ScreenerError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason,
    }
}

/// Reads an integer key strictly. A value that does not parse is an error,
/// not a silent fallback to `default`.
fn int_value(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<i64, ScreenerError> {
    match config.get_string(section, key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| invalid(section, key, format!("{key} must be an integer, got '{raw}'"))),
        _ => Ok(default),
    }
}

fn validate_sources(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    if config.get_list("data", "sources").is_empty() {
        return Err(ScreenerError::ConfigMissing {
            section: "data".to_string(),
            key: "sources".to_string(),
        });
    }
    Ok(())
}

fn validate_retry_delay(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    let value = int_value(config, "data", "retry_delay_ms", 0)?;
    if value < 0 {
        return Err(invalid(
            "data",
            "retry_delay_ms",
            "retry_delay_ms must be non-negative".to_string(),
        ));
    }
    Ok(())
}

fn validate_backoff(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    let Some(value) = config.get_string("data", "backoff") else {
        return Ok(());
    };
    let normalized = value.trim().to_lowercase();
    if !BACKOFF_STRATEGIES.contains(&normalized.as_str()) {
        return Err(ScreenerError::ConfigInvalid {
            section: "data".to_string(),
            key: "backoff".to_string(),
            reason: format!("unknown backoff '{value}', expected fixed or exponential"),
        });
    }
    Ok(())
}

fn validate_symbols(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    match config.get_string("evaluation", "symbols") {
        Some(s) if !s.trim().is_empty() => {
            parse_symbols(&s).map_err(|e| ScreenerError::ConfigInvalid {
                section: "evaluation".to_string(),
                key: "symbols".to_string(),
                reason: e.to_string(),
            })?;
            Ok(())
        }
        _ => Ok(()),
    }
}

fn validate_max_symbols(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    let value = int_value(config, "evaluation", "max_symbols", DEFAULT_MAX_SYMBOLS as i64)?;
    if value < 1 {
        return Err(invalid(
            "evaluation",
            "max_symbols",
            "max_symbols must be at least 1".to_string(),
        ));
    }
    Ok(())
}

fn validate_pool_size(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    let value = int_value(config, "sqlite", "pool_size", 4)?;
    if value <= 0 {
        return Err(invalid(
            "sqlite",
            "pool_size",
            "pool_size must be positive".to_string(),
        ));
    }
    Ok(())
}

fn validate_log_level(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    let Some(value) = config.get_string("logging", "level") else {
        return Ok(());
    };
    if !LOG_LEVELS.contains(&value.trim().to_lowercase().as_str()) {
        return Err(ScreenerError::ConfigInvalid {
            section: "logging".to_string(),
            key: "level".to_string(),
            reason: format!("unknown log level '{value}'"),
        });
    }
    Ok(())
}

fn validate_ansi(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    match config.get_string("logging", "ansi") {
        Some(value) if parse_bool(&value).is_none() => Err(invalid(
            "logging",
            "ansi",
            format!("ansi must be true or false, got '{value}'"),
        )),
        _ => Ok(()),
    }
}
