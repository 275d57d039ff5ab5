//! Metric data source port trait.
//!
//! Implementations supply the flat metric mapping for one symbol. How the
//! data is acquired (files, remote providers, fallbacks) stays behind this
//! trait; the evaluator never learns which provider answered.

use crate::domain::error::ScreenerError;
use crate::domain::metrics::MetricMapping;

pub trait DataPort {
    /// Short provider name used in logs and errors.
    fn name(&self) -> &str;

    fn fetch_metrics(&self, symbol: &str) -> Result<MetricMapping, ScreenerError>;

    fn list_symbols(&self) -> Result<Vec<String>, ScreenerError>;
}
