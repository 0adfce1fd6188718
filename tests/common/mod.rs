#![allow(dead_code)]

use chrono::NaiveDate;
use fracscan::domain::error::{FracscanError, SkipReason};
use fracscan::domain::results::{OptimalD, ResultTable};
use fracscan::domain::series::{PricePoint, Series};
use fracscan::domain::stationarity::{StationarityBattery, TestOutcome};
use fracscan::ports::data_port::DataPort;
use fracscan::ports::report_port::ReportPort;
use fracscan::ports::table_port::TablePort;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cell::RefCell;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PricePoint>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_closes(mut self, symbol: &str, closes: &[f64]) -> Self {
        self.data
            .insert(symbol.to_string(), make_points("2020-01-01", closes));
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }

    fn check(&self, symbol: &str) -> Result<(), FracscanError> {
        match self.errors.get(symbol) {
            Some(reason) => Err(FracscanError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl DataPort for MockDataPort {
    fn fetch_closes(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Series, FracscanError> {
        self.check(symbol)?;
        let points = self
            .data
            .get(symbol)
            .map(|points| {
                points
                    .iter()
                    .filter(|p| p.date >= start_date && p.date <= end_date)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(Series::new(symbol, points))
    }

    fn list_symbols(&self) -> Result<Vec<String>, FracscanError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, FracscanError> {
        self.check(symbol)?;
        Ok(self.data.get(symbol).and_then(|points| {
            let series = Series::new(symbol, points.clone());
            series.date_range().map(|(a, b)| (a, b, series.len()))
        }))
    }
}

/// Records every table it is asked to write.
pub struct MockTablePort {
    pub writes: RefCell<Vec<(ResultTable, String)>>,
}

impl MockTablePort {
    pub fn new() -> Self {
        Self {
            writes: RefCell::new(Vec::new()),
        }
    }
}

impl TablePort for MockTablePort {
    fn write_table(&self, table: &ResultTable, output_path: &str) -> Result<(), FracscanError> {
        self.writes
            .borrow_mut()
            .push((table.clone(), output_path.to_string()));
        Ok(())
    }
}

pub struct MockReportPort {
    pub lines: RefCell<Vec<(String, OptimalD)>>,
}

impl MockReportPort {
    pub fn new() -> Self {
        Self {
            lines: RefCell::new(Vec::new()),
        }
    }
}

impl ReportPort for MockReportPort {
    fn report_optimal(&self, symbol: &str, optimal: &OptimalD) -> Result<(), FracscanError> {
        self.lines.borrow_mut().push((symbol.to_string(), *optimal));
        Ok(())
    }
}

/// Passes windows whose mean is at most `cutoff`.
pub struct MeanCutoffBattery {
    pub cutoff: f64,
}

impl StationarityBattery for MeanCutoffBattery {
    fn evaluate(&self, window: &[f64]) -> Result<TestOutcome, SkipReason> {
        let mean = window.iter().sum::<f64>() / window.len() as f64;
        let adf_p = if mean <= self.cutoff { 0.01 } else { 0.6 };
        Ok(TestOutcome::from_p_values(adf_p, 0.1, 0.05))
    }
}

/// Passes every window it sees.
pub struct AlwaysPassBattery;

impl StationarityBattery for AlwaysPassBattery {
    fn evaluate(&self, _window: &[f64]) -> Result<TestOutcome, SkipReason> {
        Ok(TestOutcome::from_p_values(0.01, 0.1, 0.05))
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Consecutive daily points starting at `start_date`.
pub fn make_points(start_date: &str, closes: &[f64]) -> Vec<PricePoint> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PricePoint {
            date: start + chrono::Duration::days(i as i64),
            close,
        })
        .collect()
}

/// Random walk with uniform steps in [-1, 1).
pub fn random_walk(seed: u64, n: usize, start: f64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut level = start;
    (0..n)
        .map(|_| {
            level += rng.gen_range(-1.0..1.0);
            level
        })
        .collect()
}
