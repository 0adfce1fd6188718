//! Search for the minimal differencing order per symbol.
//!
//! Every `(symbol, d)` pair is an independent task producing one
//! `WindowAggregate`. Tasks run on the current rayon pool; results are
//! collected in grid order and reduced per symbol, so the table and the
//! chosen orders do not depend on scheduling.

use crate::domain::fracdiff::FracDiff;
use crate::domain::grid::DGrid;
use crate::domain::results::{OptimalD, ResultRow, ResultTable};
use crate::domain::series::Series;
use crate::domain::stationarity::StationarityBattery;
use crate::domain::window::{evaluate_windows, WindowAggregate};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    pub window_length: usize,
    pub d_grid: DGrid,
    pub fracdiff: FracDiff,
}

/// Cooperative cancellation flag, checked before each task starts.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub table: ResultTable,
    /// One entry per searched series, in input order.
    pub optimal: Vec<(String, OptimalD)>,
    pub cancelled: bool,
}

impl SearchOutcome {
    /// Symbols that were never searched report `NotFound`.
    pub fn optimal_for(&self, symbol: &str) -> OptimalD {
        self.optimal
            .iter()
            .find(|(s, _)| s == symbol)
            .map_or(OptimalD::NotFound, |(_, o)| *o)
    }
}

pub fn search(
    series: &[Series],
    config: &SearchConfig,
    battery: &dyn StationarityBattery,
    cancel: &CancelToken,
) -> SearchOutcome {
    let grid = config.d_grid.values();

    for s in series {
        info!(symbol = s.symbol(), points = s.len(), "analyzing");
    }

    let tasks: Vec<(usize, f64)> = (0..series.len())
        .flat_map(|si| grid.iter().map(move |&d| (si, d)))
        .collect();

    let aggregates: Vec<Option<WindowAggregate>> = tasks
        .par_iter()
        .map(|&(si, d)| {
            if cancel.is_cancelled() {
                return None;
            }
            let s = &series[si];
            Some(evaluate_windows(
                s.symbol(),
                s.closes(),
                config.window_length,
                d,
                &config.fracdiff,
                battery,
            ))
        })
        .collect();

    let mut table = ResultTable::new();
    let mut optimal = Vec::with_capacity(series.len());
    let mut cancelled = false;

    for (s, per_symbol) in series.iter().zip(aggregates.chunks(grid.len().max(1))) {
        let mut rows = Vec::with_capacity(per_symbol.len());
        // rows evaluated before the first cancelled task
        let mut settled = None;
        for agg in per_symbol {
            let Some(agg) = agg else {
                cancelled = true;
                settled.get_or_insert(rows.len());
                continue;
            };
            debug!(
                symbol = s.symbol(),
                d = agg.d,
                valid = agg.valid_windows,
                passing = agg.passing_windows,
                degenerate = agg.skipped.degenerate,
                insufficient = agg.skipped.insufficient,
                numeric = agg.skipped.numeric,
                "evaluated"
            );
            rows.extend(ResultRow::from_aggregate(s.symbol(), agg));
        }

        let answer = match OptimalD::select(&rows[..settled.unwrap_or(rows.len())]) {
            OptimalD::NotFound if settled.is_some() => OptimalD::Undetermined,
            answer => answer,
        };
        for row in rows {
            table.push(row);
        }
        optimal.push((s.symbol().to_string(), answer));
    }

    SearchOutcome {
        table,
        optimal,
        cancelled,
    }
}
