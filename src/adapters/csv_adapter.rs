//! CSV file metrics adapter.
//!
//! One row per symbol. The header names catalog keys; a `symbol` column is
//! required, columns that are not catalog keys are ignored.

use crate::domain::error::ScreenerError;
use crate::domain::field::{Field, FieldType};
use crate::domain::metrics::{MetricMapping, MetricValue};
use crate::ports::data_port::DataPort;
use std::fs;
use std::path::PathBuf;

const SYMBOL_COLUMN: &str = "symbol";
const MISSING_MARKERS: [&str; 4] = ["", "null", "n/a", "na"];

pub struct CsvMetricsAdapter {
    name: String,
    path: PathBuf,
}

impl CsvMetricsAdapter {
    pub fn new(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { name, path }
    }

    fn source_error(&self, reason: String) -> ScreenerError {
        ScreenerError::DataSource {
            provider: self.name.clone(),
            reason,
        }
    }

    fn read(&self) -> Result<(Vec<Option<Field>>, usize, Vec<csv::StringRecord>), ScreenerError> {
        let content = fs::read_to_string(&self.path).map_err(|e| {
            self.source_error(format!("failed to read {}: {}", self.path.display(), e))
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let headers = rdr
            .headers()
            .map_err(|e| self.source_error(format!("CSV parse error: {}", e)))?
            .clone();

        let symbol_idx = headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(SYMBOL_COLUMN))
            .ok_or_else(|| self.source_error("missing symbol column".into()))?;
        let columns = headers.iter().map(Field::from_key).collect();

        let mut records = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| self.source_error(format!("CSV parse error: {}", e)))?;
            records.push(record);
        }

        Ok((columns, symbol_idx, records))
    }

    fn to_mapping(
        &self,
        symbol: &str,
        columns: &[Option<Field>],
        record: &csv::StringRecord,
    ) -> Result<MetricMapping, ScreenerError> {
        let mut mapping = MetricMapping::new(symbol);

        for (column, cell) in columns.iter().zip(record.iter()) {
            let Some(field) = column else {
                continue;
            };
            if MISSING_MARKERS.contains(&cell.to_lowercase().as_str()) {
                continue;
            }
            let value = match field.field_type() {
                FieldType::Number => {
                    let n: f64 = cell.parse().map_err(|e| {
                        self.source_error(format!(
                            "invalid {} value '{}' for {}: {}",
                            field, cell, symbol, e
                        ))
                    })?;
                    MetricValue::Number(n)
                }
                FieldType::Text => MetricValue::Text(cell.to_string()),
            };
            mapping.set(*field, Some(value));
        }

        Ok(mapping)
    }
}

impl DataPort for CsvMetricsAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch_metrics(&self, symbol: &str) -> Result<MetricMapping, ScreenerError> {
        let (columns, symbol_idx, records) = self.read()?;

        let record = records
            .iter()
            .find(|r| r.get(symbol_idx).is_some_and(|s| s.eq_ignore_ascii_case(symbol)))
            .ok_or_else(|| ScreenerError::NoData {
                symbol: symbol.to_string(),
            })?;

        let mapping = self.to_mapping(symbol, &columns, record)?;
        tracing::debug!(provider = %self.name, %symbol, fields = mapping.len(), "loaded metrics");
        Ok(mapping)
    }

    fn list_symbols(&self) -> Result<Vec<String>, ScreenerError> {
        let (_, symbol_idx, records) = self.read()?;

        let mut symbols: Vec<String> = records
            .iter()
            .filter_map(|r| r.get(symbol_idx))
            .filter(|s| !s.is_empty())
            .map(|s| s.to_uppercase())
            .collect();
        symbols.sort();
        symbols.dedup();
        Ok(symbols)
    }
}
