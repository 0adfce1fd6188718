//! Fractional differencing transform.
//!
//! The filter is the binomial expansion of `(1 - B)^d`:
//! w[0] = 1, w[k] = w[k-1] * (k - 1 - d) / k.
//! Weights are truncated to `weight_window` terms (capped at the input
//! length) and trailing zero weights are trimmed, so integer orders give
//! exact integer differences.
//!
//! In `Valid` mode every output sample uses the whole filter and the output
//! is `n - order` long. In `Same` mode the output is `n` long and the first
//! `order` samples use a partial filter.
//!
//! `Valid` is the default, so a transformed window is `order` samples
//! shorter than its input and no warm-up sample reaches the tests. Select
//! `Same` when the transformed window must keep the input length.

use crate::domain::error::SkipReason;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_WEIGHT_WINDOW: usize = 10;
const WEIGHT_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvolutionMode {
    Valid,
    Same,
}

impl FromStr for ConvolutionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "valid" => Ok(ConvolutionMode::Valid),
            "same" => Ok(ConvolutionMode::Same),
            other => Err(format!("unknown mode '{other}' (expected valid or same)")),
        }
    }
}

impl fmt::Display for ConvolutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvolutionMode::Valid => write!(f, "valid"),
            ConvolutionMode::Same => write!(f, "same"),
        }
    }
}

/// Raw binomial weights for order `d`, `size` terms.
pub fn weights(d: f64, size: usize) -> Vec<f64> {
    let mut w = Vec::with_capacity(size);
    if size == 0 {
        return w;
    }
    w.push(1.0);
    for k in 1..size {
        let prev = w[k - 1];
        w.push(prev * (k as f64 - 1.0 - d) / k as f64);
    }
    w
}

/// Weights with trailing (near) zero terms removed. Never empty.
pub fn filter_weights(d: f64, size: usize) -> Vec<f64> {
    let mut w = weights(d, size.max(1));
    while w.len() > 1 && w.last().is_some_and(|v| v.abs() < WEIGHT_EPSILON) {
        w.pop();
    }
    w
}

#[derive(Debug, Clone, PartialEq)]
pub struct FracDiff {
    pub weight_window: usize,
    pub mode: ConvolutionMode,
}

impl Default for FracDiff {
    fn default() -> Self {
        Self {
            weight_window: DEFAULT_WEIGHT_WINDOW,
            mode: ConvolutionMode::Valid,
        }
    }
}

impl FracDiff {
    pub fn new(weight_window: usize, mode: ConvolutionMode) -> Self {
        Self {
            weight_window,
            mode,
        }
    }

    /// Filter order used for an input of `len` samples.
    pub fn order(&self, d: f64, len: usize) -> usize {
        filter_weights(d, self.weight_window.clamp(1, len.max(1))).len() - 1
    }

    /// Applies the filter to `sequence`.
    pub fn transform(&self, sequence: &[f64], d: f64) -> Result<Vec<f64>, SkipReason> {
        check_input(sequence)?;

        let n = sequence.len();
        let w = filter_weights(d, self.weight_window.clamp(1, n));
        let order = w.len() - 1;

        match self.mode {
            ConvolutionMode::Valid => {
                let out_len = n - order;
                if out_len < 2 {
                    return Err(SkipReason::degenerate(format!(
                        "filter of order {order} leaves {out_len} samples from {n}"
                    )));
                }
                Ok((0..out_len)
                    .map(|t| {
                        w.iter()
                            .enumerate()
                            .map(|(k, wk)| wk * sequence[t + order - k])
                            .sum()
                    })
                    .collect())
            }
            ConvolutionMode::Same => Ok((0..n)
                .map(|t| {
                    w.iter()
                        .take(t.min(order) + 1)
                        .enumerate()
                        .map(|(k, wk)| wk * sequence[t - k])
                        .sum()
                })
                .collect()),
        }
    }
}

fn check_input(sequence: &[f64]) -> Result<(), SkipReason> {
    let mut finite = sequence.iter().copied().filter(|v| v.is_finite());
    let Some(first) = finite.next() else {
        return Err(SkipReason::degenerate("no finite values"));
    };
    let mut count = 1usize;
    let mut min = first;
    let mut max = first;
    for v in finite {
        count += 1;
        min = min.min(v);
        max = max.max(v);
    }
    if count < 2 {
        return Err(SkipReason::degenerate("fewer than 2 finite values"));
    }
    if max == min {
        return Err(SkipReason::degenerate("zero variance"));
    }
    Ok(())
}
