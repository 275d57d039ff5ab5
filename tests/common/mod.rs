#![allow(dead_code)]

use screener::domain::checklist::{Checklist, ChecklistDefinition, ConditionItem};
use screener::domain::error::ScreenerError;
pub use screener::domain::field::Field;
pub use screener::domain::metrics::{MetricMapping, MetricValue};
use screener::ports::data_port::DataPort;
use std::cell::RefCell;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, MetricMapping>,
    pub errors: HashMap<String, String>,
    pub requested: RefCell<Vec<String>>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            requested: RefCell::new(Vec::new()),
        }
    }

    pub fn with_metrics(mut self, mapping: MetricMapping) -> Self {
        self.data.insert(mapping.symbol.clone(), mapping);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn name(&self) -> &str {
        "mock"
    }

    fn fetch_metrics(&self, symbol: &str) -> Result<MetricMapping, ScreenerError> {
        self.requested.borrow_mut().push(symbol.to_string());
        if let Some(reason) = self.errors.get(symbol) {
            return Err(ScreenerError::DataSource {
                provider: "mock".into(),
                reason: reason.clone(),
            });
        }
        self.data
            .get(symbol)
            .cloned()
            .ok_or_else(|| ScreenerError::NoData {
                symbol: symbol.to_string(),
            })
    }

    fn list_symbols(&self) -> Result<Vec<String>, ScreenerError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

pub fn symbols(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

pub fn value_checklist() -> Checklist {
    Checklist::new(1, 1, "Value").with_description("cheap large caps")
}

/// The three-item checklist of the worked example: the dividend item is disabled.
pub fn value_items() -> Vec<ConditionItem> {
    vec![
        ConditionItem::new(1, 1, "pe_ratio", "<", "20").with_sort_order(1),
        ConditionItem::new(2, 1, "market_cap", ">", "1000000000").with_sort_order(2),
        ConditionItem::new(3, 1, "dividend_yield", ">", "0.01")
            .with_sort_order(3)
            .disabled(),
    ]
}

pub fn value_definition() -> ChecklistDefinition {
    ChecklistDefinition {
        checklist: value_checklist(),
        items: value_items(),
    }
}

pub fn aapl() -> MetricMapping {
    MetricMapping::new("AAPL")
        .with(Field::PeRatio, 15.0)
        .with(Field::MarketCap, 2_000_000_000.0)
        .with(Field::DividendYield, 0.0)
        .with(Field::Sector, "Technology")
}

pub fn msft() -> MetricMapping {
    MetricMapping::new("MSFT")
        .with(Field::PeRatio, 32.0)
        .with(Field::MarketCap, 3_000_000_000_000.0)
        .with(Field::Sector, "Technology")
}
