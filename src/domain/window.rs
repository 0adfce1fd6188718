//! Sliding-window evaluation of one `(series, d)` pair.
//!
//! Windows of `window_length` samples advance by one sample. Each window is
//! transformed and tested independently; a window that fails either step is
//! counted under its skip reason and excluded from the aggregates.

use crate::domain::error::SkipReason;
use crate::domain::fracdiff::FracDiff;
use crate::domain::stationarity::{StationarityBattery, TestOutcome};
use rayon::prelude::*;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipCounts {
    pub degenerate: usize,
    pub insufficient: usize,
    pub numeric: usize,
}

impl SkipCounts {
    pub fn total(&self) -> usize {
        self.degenerate + self.insufficient + self.numeric
    }

    fn record(&mut self, reason: &SkipReason) {
        match reason {
            SkipReason::DegenerateInput { .. } => self.degenerate += 1,
            SkipReason::InsufficientData { .. } => self.insufficient += 1,
            SkipReason::Numeric { .. } => self.numeric += 1,
        }
    }
}

/// Summary of every window for one differencing order.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowAggregate {
    pub d: f64,
    pub windows: usize,
    pub valid_windows: usize,
    pub passing_windows: usize,
    pub skipped: SkipCounts,
    pub mean_adf_p: f64,
    pub mean_kpss_p: f64,
    pub std_adf_p: f64,
    pub std_kpss_p: f64,
}

impl WindowAggregate {
    fn from_outcomes(d: f64, outcomes: &[Result<TestOutcome, SkipReason>]) -> Self {
        let mut skipped = SkipCounts::default();
        let mut adf = Vec::with_capacity(outcomes.len());
        let mut kpss = Vec::with_capacity(outcomes.len());
        let mut passing_windows = 0;

        for outcome in outcomes {
            match outcome {
                Ok(o) => {
                    adf.push(o.adf_p);
                    kpss.push(o.kpss_p);
                    if o.passes() {
                        passing_windows += 1;
                    }
                }
                Err(reason) => skipped.record(reason),
            }
        }

        let (mean_adf_p, std_adf_p) = mean_std(&adf);
        let (mean_kpss_p, std_kpss_p) = mean_std(&kpss);

        Self {
            d,
            windows: outcomes.len(),
            valid_windows: adf.len(),
            passing_windows,
            skipped,
            mean_adf_p,
            mean_kpss_p,
            std_adf_p,
            std_kpss_p,
        }
    }

    /// No window produced a test outcome.
    pub fn is_empty(&self) -> bool {
        self.valid_windows == 0
    }

    pub fn pass_ratio(&self) -> Option<f64> {
        if self.is_empty() {
            None
        } else {
            Some(self.passing_windows as f64 / self.valid_windows as f64)
        }
    }

    /// Every valid window passed. Compared on counts, not on the ratio.
    pub fn is_full_pass(&self) -> bool {
        !self.is_empty() && self.passing_windows == self.valid_windows
    }
}

/// Population mean and standard deviation; NaN for an empty slice.
fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (f64::NAN, f64::NAN);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}

pub fn evaluate_window(
    window: &[f64],
    d: f64,
    fracdiff: &FracDiff,
    battery: &dyn StationarityBattery,
) -> Result<TestOutcome, SkipReason> {
    let transformed = fracdiff.transform(window, d)?;
    battery.evaluate(&transformed)
}

/// Evaluates every window of `closes` at order `d`.
///
/// A series shorter than `window_length` yields an empty aggregate.
pub fn evaluate_windows(
    symbol: &str,
    closes: &[f64],
    window_length: usize,
    d: f64,
    fracdiff: &FracDiff,
    battery: &dyn StationarityBattery,
) -> WindowAggregate {
    if window_length == 0 || closes.len() < window_length {
        return WindowAggregate::from_outcomes(d, &[]);
    }

    let outcomes: Vec<Result<TestOutcome, SkipReason>> = closes
        .par_windows(window_length)
        .enumerate()
        .map(|(start, window)| {
            let outcome = evaluate_window(window, d, fracdiff, battery);
            if let Err(reason) = &outcome {
                debug!(symbol, d, start, %reason, "window skipped");
            }
            outcome
        })
        .collect();

    WindowAggregate::from_outcomes(d, &outcomes)
}
