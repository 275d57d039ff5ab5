//! Batch evaluation across many symbols.
//!
//! Each symbol is looked up and scored on its own. A failed lookup, or a
//! panic anywhere while handling one symbol, turns into a degraded result
//! for that symbol; the batch always returns one result per requested
//! symbol, in request order.

use crate::domain::checklist::{Checklist, ConditionItem};
use crate::domain::error::ScreenerError;
use crate::domain::evaluation::{EvaluationResult, evaluate_stock};
use crate::domain::metrics::MetricMapping;
use crate::ports::data_port::DataPort;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

pub fn evaluate_many<F>(
    symbols: &[String],
    mut lookup: F,
    checklist: &Checklist,
    items: &[ConditionItem],
) -> Vec<EvaluationResult>
where
    F: FnMut(&str) -> Result<MetricMapping, ScreenerError>,
{
    let mut results = Vec::with_capacity(symbols.len());
    let mut degraded = 0usize;

    for symbol in symbols {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            lookup(symbol).map(|mapping| evaluate_stock(&mapping, checklist, items))
        }));

        let result = match outcome {
            Ok(Ok(mut result)) => {
                // Keyed by the requested symbol, not the source's name for it.
                result.symbol = symbol.clone();
                result
            }
            Ok(Err(e)) => {
                tracing::warn!(%symbol, error = %e, "skipping symbol");
                EvaluationResult::degraded(symbol.as_str(), checklist.id, e.to_string())
            }
            Err(payload) => {
                let reason = panic_reason(payload.as_ref());
                tracing::warn!(%symbol, %reason, "evaluation aborted");
                EvaluationResult::degraded(
                    symbol.as_str(),
                    checklist.id,
                    format!("evaluation aborted: {reason}"),
                )
            }
        };

        if result.is_degraded() {
            degraded += 1;
        }
        results.push(result);
    }

    tracing::info!(
        checklist_id = checklist.id,
        symbols = symbols.len(),
        degraded,
        "batch evaluated"
    );
    results
}

/// Runs [`evaluate_many`] with metric lookups served by `data_port`.
pub fn evaluate_with_port(
    data_port: &dyn DataPort,
    symbols: &[String],
    checklist: &Checklist,
    items: &[ConditionItem],
) -> Vec<EvaluationResult> {
    evaluate_many(
        symbols,
        |symbol| data_port.fetch_metrics(symbol),
        checklist,
        items,
    )
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
