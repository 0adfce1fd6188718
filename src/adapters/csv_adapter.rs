//! CSV file data adapter.
//!
//! Reads `<base_path>/<SYMBOL>.csv` files with at least a `date` and a
//! `close` column (header names matched case-insensitively, any order).

use crate::domain::error::FracscanError;
use crate::domain::series::{PricePoint, Series};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

const CSV_SUFFIX: &str = ".csv";

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{symbol}{CSV_SUFFIX}"))
    }

    fn read_points(&self, symbol: &str) -> Result<Vec<PricePoint>, FracscanError> {
        let unavailable = |reason: String| FracscanError::DataUnavailable {
            symbol: symbol.to_string(),
            reason,
        };

        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path)
            .map_err(|e| unavailable(format!("failed to read {}: {}", path.display(), e)))?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| unavailable(format!("CSV header error: {e}")))?
            .clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or_else(|| unavailable(format!("missing {name} column")))
        };
        let date_col = column("date")?;
        let close_col = column("close")?;

        let mut points = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| unavailable(format!("CSV parse error: {e}")))?;

            let date_str = record
                .get(date_col)
                .ok_or_else(|| unavailable("missing date value".into()))?;
            let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d")
                .map_err(|e| unavailable(format!("invalid date '{date_str}': {e}")))?;

            let close: f64 = record
                .get(close_col)
                .ok_or_else(|| unavailable("missing close value".into()))?
                .trim()
                .parse()
                .map_err(|e| unavailable(format!("invalid close value on {date}: {e}")))?;

            points.push(PricePoint { date, close });
        }

        Ok(points)
    }
}

impl DataPort for CsvAdapter {
    fn fetch_closes(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Series, FracscanError> {
        let points = self
            .read_points(symbol)?
            .into_iter()
            .filter(|p| p.date >= start_date && p.date <= end_date)
            .collect();
        Ok(Series::new(symbol, points))
    }

    fn list_symbols(&self) -> Result<Vec<String>, FracscanError> {
        let mut symbols = Vec::new();
        for entry in fs::read_dir(&self.base_path)? {
            let name = entry?.file_name();
            let name = name.to_string_lossy();
            if let Some(symbol) = name.strip_suffix(CSV_SUFFIX) {
                symbols.push(symbol.to_string());
            }
        }
        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, FracscanError> {
        let series = Series::new(symbol, self.read_points(symbol)?);
        Ok(series
            .date_range()
            .map(|(first, last)| (first, last, series.len())))
    }
}
