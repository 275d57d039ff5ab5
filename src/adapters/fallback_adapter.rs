//! Ranked provider fallback.
//!
//! Wraps several capability-equivalent data ports. A lookup tries each
//! provider in rank order, sleeping between attempts, and stops at the first
//! answer. The provider that answered last is tried first on the next lookup.

use crate::adapters::csv_adapter::CsvMetricsAdapter;
use crate::domain::error::ScreenerError;
use crate::domain::metrics::MetricMapping;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

pub const DEFAULT_RETRY_DELAY_MS: u64 = 200;
pub const MAX_BACKOFF_MS: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backoff {
    #[default]
    Fixed,
    Exponential,
}

impl FromStr for Backoff {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fixed" => Ok(Backoff::Fixed),
            "exponential" => Ok(Backoff::Exponential),
            other => Err(format!("unknown backoff '{other}', expected fixed or exponential")),
        }
    }
}

pub struct FallbackDataPort {
    providers: Vec<Box<dyn DataPort>>,
    delay: Duration,
    backoff: Backoff,
    preferred: AtomicUsize,
}

impl FallbackDataPort {
    /// The first provider is the primary, subsequent providers are fallbacks.
    pub fn new(providers: Vec<Box<dyn DataPort>>, delay: Duration, backoff: Backoff) -> Self {
        Self {
            providers,
            delay,
            backoff,
            preferred: AtomicUsize::new(0),
        }
    }

    pub fn with_defaults(providers: Vec<Box<dyn DataPort>>) -> Self {
        Self::new(
            providers,
            Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            Backoff::Fixed,
        )
    }

    /// Builds one CSV provider per `[data] sources` entry.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, ScreenerError> {
        let sources = config.get_list("data", "sources");
        if sources.is_empty() {
            return Err(ScreenerError::ConfigMissing {
                section: "data".into(),
                key: "sources".into(),
            });
        }

        let delay_ms = config.get_int("data", "retry_delay_ms", DEFAULT_RETRY_DELAY_MS as i64);
        let delay_ms = u64::try_from(delay_ms).map_err(|_| ScreenerError::ConfigInvalid {
            section: "data".into(),
            key: "retry_delay_ms".into(),
            reason: "retry_delay_ms must be non-negative".into(),
        })?;

        let backoff = match config.get_string("data", "backoff") {
            Some(s) => s.parse().map_err(|reason| ScreenerError::ConfigInvalid {
                section: "data".into(),
                key: "backoff".into(),
                reason,
            })?,
            None => Backoff::default(),
        };

        let providers = sources
            .into_iter()
            .map(|s| Box::new(CsvMetricsAdapter::new(PathBuf::from(s))) as Box<dyn DataPort>)
            .collect();

        Ok(Self::new(providers, Duration::from_millis(delay_ms), backoff))
    }

    /// Delay before the attempt following attempt number `attempt` (0-based).
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed => self.delay,
            Backoff::Exponential => {
                let base = self.delay.as_millis() as u64;
                let delay_ms = base
                    .saturating_mul(2_u64.saturating_pow(attempt))
                    .min(MAX_BACKOFF_MS.max(base));
                Duration::from_millis(delay_ms)
            }
        }
    }

    /// Index of the provider that answered last.
    pub fn preferred(&self) -> usize {
        self.preferred.load(Ordering::Relaxed)
    }

    fn attempt_order(&self) -> Vec<usize> {
        let first = self.preferred().min(self.providers.len().saturating_sub(1));
        std::iter::once(first)
            .chain((0..self.providers.len()).filter(|&i| i != first))
            .collect()
    }
}

impl DataPort for FallbackDataPort {
    fn name(&self) -> &str {
        "fallback"
    }

    fn fetch_metrics(&self, symbol: &str) -> Result<MetricMapping, ScreenerError> {
        if self.providers.is_empty() {
            return Err(ScreenerError::AllSourcesFailed {
                symbol: symbol.to_string(),
                attempts: 0,
            });
        }

        let order = self.attempt_order();
        let mut all_no_data = true;

        for (attempt, &idx) in order.iter().enumerate() {
            let provider = &self.providers[idx];
            match provider.fetch_metrics(symbol) {
                Ok(mapping) => {
                    if attempt > 0 {
                        tracing::info!(
                            provider = provider.name(),
                            %symbol,
                            attempt = attempt + 1,
                            "fallback provider answered"
                        );
                    }
                    self.preferred.store(idx, Ordering::Relaxed);
                    return Ok(mapping);
                }
                Err(e) => {
                    all_no_data &= matches!(e, ScreenerError::NoData { .. });
                    tracing::warn!(
                        provider = provider.name(),
                        %symbol,
                        attempt = attempt + 1,
                        error = %e,
                        "provider lookup failed"
                    );
                    if attempt + 1 < order.len() {
                        let delay = self.backoff_delay(attempt as u32);
                        if !delay.is_zero() {
                            thread::sleep(delay);
                        }
                    }
                }
            }
        }

        if all_no_data {
            return Err(ScreenerError::NoData {
                symbol: symbol.to_string(),
            });
        }
        Err(ScreenerError::AllSourcesFailed {
            symbol: symbol.to_string(),
            attempts: order.len(),
        })
    }

    fn list_symbols(&self) -> Result<Vec<String>, ScreenerError> {
        let mut last_error = None;
        for &idx in &self.attempt_order() {
            match self.providers.get(idx).map(|p| p.list_symbols()) {
                Some(Ok(symbols)) => return Ok(symbols),
                Some(Err(e)) => last_error = Some(e),
                None => {}
            }
        }
        Err(last_error.unwrap_or(ScreenerError::AllSourcesFailed {
            symbol: "*".to_string(),
            attempts: 0,
        }))
    }
}
