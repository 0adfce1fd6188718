//! Closing-price series for a single symbol.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// An ordered, immutable closing-price series. The search only reads it.
#[derive(Debug, Clone)]
pub struct Series {
    symbol: String,
    points: Vec<PricePoint>,
    closes: Vec<f64>,
}

impl Series {
    /// Builds a series, sorting points by date.
    pub fn new(symbol: impl Into<String>, mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| p.date);
        let closes = points.iter().map(|p| p.close).collect();
        Self {
            symbol: symbol.into(),
            points,
            closes,
        }
    }

    /// Builds an undated series, e.g. for synthetic data.
    pub fn from_closes(symbol: impl Into<String>, closes: Vec<f64>) -> Self {
        Self {
            symbol: symbol.into(),
            points: Vec::new(),
            closes,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn closes(&self) -> &[f64] {
        &self.closes
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    /// First and last date, if the series is dated.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date)),
            _ => None,
        }
    }
}
