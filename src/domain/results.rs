//! Result table rows and per-symbol answers.

use crate::domain::window::WindowAggregate;
use serde::Serialize;
use std::fmt;

/// One `(symbol, d)` summary. Only built from non-empty aggregates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRow {
    pub symbol: String,
    pub d: f64,
    pub mean_adf_p: f64,
    pub mean_kpss_p: f64,
    pub std_adf_p: f64,
    pub std_kpss_p: f64,
    pub pass_ratio: f64,
    pub valid_windows: usize,
    #[serde(skip)]
    pub passing_windows: usize,
}

impl ResultRow {
    pub fn from_aggregate(symbol: &str, agg: &WindowAggregate) -> Option<Self> {
        let pass_ratio = agg.pass_ratio()?;
        Some(Self {
            symbol: symbol.to_string(),
            d: agg.d,
            mean_adf_p: agg.mean_adf_p,
            mean_kpss_p: agg.mean_kpss_p,
            std_adf_p: agg.std_adf_p,
            std_kpss_p: agg.std_kpss_p,
            pass_ratio,
            valid_windows: agg.valid_windows,
            passing_windows: agg.passing_windows,
        })
    }

    pub fn is_full_pass(&self) -> bool {
        self.valid_windows > 0 && self.passing_windows == self.valid_windows
    }
}

/// Append-only collection of result rows, in search order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    rows: Vec<ResultRow>,
}

impl ResultTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: ResultRow) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn for_symbol<'a>(&'a self, symbol: &'a str) -> impl Iterator<Item = &'a ResultRow> + 'a {
        self.rows.iter().filter(move |r| r.symbol == symbol)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Minimal differencing order reaching full stationarity for a symbol.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OptimalD {
    Found(f64),
    NotFound,
    /// The search was cancelled before any row reached a full pass.
    Undetermined,
}

impl OptimalD {
    /// First full-pass row in ascending `d` order.
    pub fn select<'a>(rows: impl IntoIterator<Item = &'a ResultRow>) -> Self {
        rows.into_iter()
            .find(|r| r.is_full_pass())
            .map_or(OptimalD::NotFound, |r| OptimalD::Found(r.d))
    }
}

/// Report line for one symbol.
pub struct OptimalLine<'a> {
    pub symbol: &'a str,
    pub optimal: &'a OptimalD,
}

impl fmt::Display for OptimalLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.optimal {
            OptimalD::Found(d) => write!(f, "{}: d={:.2}", self.symbol, d),
            OptimalD::NotFound => write!(
                f,
                "{}: No d value found that achieves full stationarity across all windows.",
                self.symbol
            ),
            OptimalD::Undetermined => write!(
                f,
                "{}: search cancelled before an optimal d could be determined.",
                self.symbol
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::window::SkipCounts;

    fn aggregate(d: f64, valid: usize, passing: usize) -> WindowAggregate {
        WindowAggregate {
            d,
            windows: valid,
            valid_windows: valid,
            passing_windows: passing,
            skipped: SkipCounts::default(),
            mean_adf_p: 0.02,
            mean_kpss_p: 0.1,
            std_adf_p: 0.0,
            std_kpss_p: 0.0,
        }
    }

    fn row(d: f64, valid: usize, passing: usize) -> ResultRow {
        ResultRow::from_aggregate("SPY", &aggregate(d, valid, passing)).unwrap()
    }

    #[test]
    fn empty_aggregate_has_no_row() {
        assert!(ResultRow::from_aggregate("SPY", &aggregate(0.1, 0, 0)).is_none());
    }

    #[test]
    fn selects_first_full_pass() {
        let rows = [row(0.1, 10, 3), row(0.2, 10, 10), row(0.3, 8, 8)];
        assert_eq!(OptimalD::select(&rows), OptimalD::Found(0.2));
    }

    #[test]
    fn no_full_pass_is_not_found() {
        let rows = [row(0.1, 10, 9), row(0.2, 10, 9)];
        assert_eq!(OptimalD::select(&rows), OptimalD::NotFound);
        assert_eq!(OptimalD::select(ResultTable::new().rows()), OptimalD::NotFound);
    }

    #[test]
    fn table_filters_by_symbol() {
        let mut table = ResultTable::new();
        table.push(row(0.1, 5, 5));
        let mut other = row(0.1, 5, 1);
        other.symbol = "QQQ".into();
        table.push(other);
        assert_eq!(table.len(), 2);
        assert_eq!(table.for_symbol("QQQ").count(), 1);
        assert_eq!(table.for_symbol("IWM").count(), 0);
    }

    #[test]
    fn report_lines() {
        let found = OptimalD::Found(0.4);
        let line = OptimalLine {
            symbol: "SPY",
            optimal: &found,
        };
        assert_eq!(line.to_string(), "SPY: d=0.40");
        let none = OptimalD::NotFound;
        assert_eq!(
            OptimalLine {
                symbol: "QQQ",
                optimal: &none
            }
            .to_string(),
            "QQQ: No d value found that achieves full stationarity across all windows."
        );
    }
}
