//! Field catalog.
//!
//! The fixed, versioned set of metric names a condition item may reference.
//! Lookup is case-insensitive and rejects unknown keys at the boundary:
//! - `Field`: one variant per catalog key
//! - `FieldType`: whether a field carries numbers or text
//! - `FieldInfo`: key, label, type and category for authoring surfaces

use crate::domain::operator::Operator;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bumped whenever a field is added, removed or retyped.
pub const CATALOG_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Field {
    PeRatio,
    PegRatio,
    PriceToBook,
    EvEbitda,
    PriceToSales,
    MarketCap,
    Volume,
    Price,
    DividendYield,
    Beta,
    Sector,
    Industry,
    Employees,
    Roe,
    Roa,
    GrossMargin,
    OperatingMargin,
    NetMargin,
    DebtToEquity,
    CurrentRatio,
    QuickRatio,
    InterestCoverage,
    RevenueGrowth,
    EarningsGrowth,
    BookValueGrowth,
    AnalystRating,
    PriceTarget,
    AnalystCount,
    Rsi,
    MovingAvg50,
    MovingAvg200,
    EsgScore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Number,
    #[serde(rename = "string")]
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldInfo {
    pub field: Field,
    pub key: &'static str,
    pub label: &'static str,
    pub field_type: FieldType,
    pub category: &'static str,
}

const fn info(
    field: Field,
    key: &'static str,
    label: &'static str,
    field_type: FieldType,
    category: &'static str,
) -> FieldInfo {
    FieldInfo {
        field,
        key,
        label,
        field_type,
        category,
    }
}

use FieldType::{Number, Text};

static CATALOG: [FieldInfo; 32] = [
    info(Field::PeRatio, "pe_ratio", "P/E Ratio", Number, "Valuation"),
    info(Field::PegRatio, "peg_ratio", "PEG Ratio", Number, "Valuation"),
    info(Field::PriceToBook, "price_to_book", "Price to Book", Number, "Valuation"),
    info(Field::EvEbitda, "ev_ebitda", "EV/EBITDA", Number, "Valuation"),
    info(Field::PriceToSales, "price_to_sales", "Price to Sales", Number, "Valuation"),
    info(Field::MarketCap, "market_cap", "Market Cap", Number, "Market"),
    info(Field::Volume, "volume", "Volume", Number, "Market"),
    info(Field::Price, "price", "Price", Number, "Market"),
    info(Field::DividendYield, "dividend_yield", "Dividend Yield", Number, "Market"),
    info(Field::Beta, "beta", "Beta", Number, "Market"),
    info(Field::Sector, "sector", "Sector", Text, "Company"),
    info(Field::Industry, "industry", "Industry", Text, "Company"),
    info(Field::Employees, "employees", "Employee Count", Number, "Company"),
    info(Field::Roe, "roe", "Return on Equity (ROE)", Number, "Profitability"),
    info(Field::Roa, "roa", "Return on Assets (ROA)", Number, "Profitability"),
    info(Field::GrossMargin, "gross_margin", "Gross Margin", Number, "Profitability"),
    info(Field::OperatingMargin, "operating_margin", "Operating Margin", Number, "Profitability"),
    info(Field::NetMargin, "net_margin", "Net Margin", Number, "Profitability"),
    info(Field::DebtToEquity, "debt_to_equity", "Debt to Equity", Number, "Financial Health"),
    info(Field::CurrentRatio, "current_ratio", "Current Ratio", Number, "Financial Health"),
    info(Field::QuickRatio, "quick_ratio", "Quick Ratio", Number, "Financial Health"),
    info(Field::InterestCoverage, "interest_coverage", "Interest Coverage", Number, "Financial Health"),
    info(Field::RevenueGrowth, "revenue_growth", "Revenue Growth", Number, "Growth"),
    info(Field::EarningsGrowth, "earnings_growth", "Earnings Growth", Number, "Growth"),
    info(Field::BookValueGrowth, "book_value_growth", "Book Value Growth", Number, "Growth"),
    info(Field::AnalystRating, "analyst_rating", "Analyst Rating", Text, "Analyst"),
    info(Field::PriceTarget, "price_target", "Price Target", Number, "Analyst"),
    info(Field::AnalystCount, "analyst_count", "Analyst Count", Number, "Analyst"),
    info(Field::Rsi, "rsi", "RSI", Number, "Technical"),
    info(Field::MovingAvg50, "moving_avg_50", "50-Day Moving Average", Number, "Technical"),
    info(Field::MovingAvg200, "moving_avg_200", "200-Day Moving Average", Number, "Technical"),
    info(Field::EsgScore, "esg_score", "ESG Score", Number, "ESG"),
];

/// All catalog entries in authoring order.
pub fn catalog() -> &'static [FieldInfo] {
    &CATALOG
}

impl Field {
    /// Case-insensitive lookup of a catalog key. Surrounding whitespace is ignored.
    pub fn from_key(key: &str) -> Option<Field> {
        let key = key.trim();
        CATALOG
            .iter()
            .find(|entry| entry.key.eq_ignore_ascii_case(key))
            .map(|entry| entry.field)
    }

    pub fn info(self) -> &'static FieldInfo {
        // Variant order matches CATALOG order.
        &CATALOG[self as usize]
    }

    pub fn key(self) -> &'static str {
        self.info().key
    }

    pub fn label(self) -> &'static str {
        self.info().label
    }

    pub fn field_type(self) -> FieldType {
        self.info().field_type
    }
}

impl From<Field> for &'static str {
    fn from(field: Field) -> Self {
        field.key()
    }
}

impl TryFrom<String> for Field {
    type Error = String;

    fn try_from(key: String) -> Result<Self, Self::Error> {
        Field::from_key(&key).ok_or_else(|| format!("unknown field: {key}"))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FieldType {
    /// Operators offered when authoring an item on a field of this type.
    pub fn operators(self) -> &'static [Operator] {
        match self {
            FieldType::Number => &[
                Operator::Lt,
                Operator::Le,
                Operator::Gt,
                Operator::Ge,
                Operator::Eq,
                Operator::Ne,
            ],
            FieldType::Text => &[Operator::Eq, Operator::Ne],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Number => "number",
            FieldType::Text => "string",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
