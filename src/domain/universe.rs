//! Symbol universe: parsing the configured symbol list and loading each
//! symbol's closing prices through the data port.
//!
//! A symbol whose data cannot be loaded is skipped with a warning rather
//! than failing the run; the report later lists it as having no optimal `d`.

use crate::domain::series::Series;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in symbol list")]
    EmptyToken,

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),
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

#[derive(Debug, Clone, PartialEq)]
pub enum SkippedReason {
    Unavailable(String),
    NoRows,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: SkippedReason,
}

#[derive(Debug, Clone)]
pub struct Universe {
    /// Loaded series, in configured order.
    pub series: Vec<Series>,
    pub skipped: Vec<SkippedSymbol>,
}

impl Universe {
    pub fn count(&self) -> usize {
        self.series.len()
    }
}

pub fn load_universe(
    data_port: &dyn DataPort,
    symbols: &[String],
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Universe {
    let mut series = Vec::with_capacity(symbols.len());
    let mut skipped = Vec::new();

    for symbol in symbols {
        match data_port.fetch_closes(symbol, start_date, end_date) {
            Ok(s) if s.is_empty() => {
                warn!(symbol = symbol.as_str(), "skipping: no rows in date range");
                skipped.push(SkippedSymbol {
                    symbol: symbol.clone(),
                    reason: SkippedReason::NoRows,
                });
            }
            Ok(s) => {
                info!(symbol = symbol.as_str(), points = s.len(), "loaded");
                series.push(s);
            }
            Err(e) => {
                warn!(symbol = symbol.as_str(), error = %e, "skipping: data unavailable");
                skipped.push(SkippedSymbol {
                    symbol: symbol.clone(),
                    reason: SkippedReason::Unavailable(e.to_string()),
                });
            }
        }
    }

    if !skipped.is_empty() {
        info!(
            "searching {} of {} symbols",
            series.len(),
            series.len() + skipped.len()
        );
    }

    Universe { series, skipped }
}
