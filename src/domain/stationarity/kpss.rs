//! KPSS stationarity test.
//!
//! Null hypothesis: the series is stationary around a level (`c`) or a
//! linear trend (`ct`). The long-run variance uses Bartlett weights; the
//! lag truncation is chosen by the Hobijn, Franses and Ooms (1998) rule
//! unless fixed. p-values are interpolated from the KPSS tables and
//! therefore clamped to [0.01, 0.10].

use crate::domain::error::SkipReason;
use crate::domain::ols;
use nalgebra::{DMatrix, DVector};
use std::fmt;
use std::str::FromStr;

const P_VALUES: [f64; 4] = [0.10, 0.05, 0.025, 0.01];
const CRIT_LEVEL: [f64; 4] = [0.347, 0.463, 0.574, 0.739];
const CRIT_TREND: [f64; 4] = [0.119, 0.146, 0.176, 0.216];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KpssRegression {
    Level,
    Trend,
}

impl KpssRegression {
    pub fn critical_values(self) -> [f64; 4] {
        match self {
            KpssRegression::Level => CRIT_LEVEL,
            KpssRegression::Trend => CRIT_TREND,
        }
    }
}

impl FromStr for KpssRegression {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "c" => Ok(KpssRegression::Level),
            "ct" => Ok(KpssRegression::Trend),
            other => Err(format!("unknown regression '{other}' (expected c or ct)")),
        }
    }
}

impl fmt::Display for KpssRegression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KpssRegression::Level => write!(f, "c"),
            KpssRegression::Trend => write!(f, "ct"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KpssLags {
    Auto,
    Legacy,
    Fixed(usize),
}

impl FromStr for KpssLags {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(KpssLags::Auto),
            "legacy" => Ok(KpssLags::Legacy),
            other => other.parse::<usize>().map(KpssLags::Fixed).map_err(|_| {
                format!("unknown nlags '{other}' (expected auto, legacy or an integer)")
            }),
        }
    }
}

impl fmt::Display for KpssLags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KpssLags::Auto => write!(f, "auto"),
            KpssLags::Legacy => write!(f, "legacy"),
            KpssLags::Fixed(n) => write!(f, "{n}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KpssConfig {
    pub regression: KpssRegression,
    pub lags: KpssLags,
}

impl Default for KpssConfig {
    fn default() -> Self {
        Self {
            regression: KpssRegression::Level,
            lags: KpssLags::Auto,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KpssResult {
    pub statistic: f64,
    pub p_value: f64,
    pub lags: usize,
}

pub fn kpss(x: &[f64], config: &KpssConfig) -> Result<KpssResult, SkipReason> {
    let n = x.len();
    let minimum = match config.regression {
        KpssRegression::Level => 2,
        KpssRegression::Trend => 3,
    };
    if n < minimum {
        return Err(SkipReason::InsufficientData { len: n, minimum });
    }
    if x.iter().all(|&v| v == x[0]) {
        return Err(SkipReason::degenerate("constant series"));
    }

    let resid = residuals(x, config.regression)?;

    let lags = match config.lags {
        KpssLags::Auto => autolag(&resid)?.min(n - 1),
        KpssLags::Legacy => ((12.0 * (n as f64 / 100.0).powf(0.25)).ceil() as usize).min(n - 1),
        KpssLags::Fixed(l) if l >= n => {
            return Err(SkipReason::InsufficientData {
                len: n,
                minimum: l + 1,
            });
        }
        KpssLags::Fixed(l) => l,
    };

    let mut partial = 0.0;
    let eta = resid
        .iter()
        .map(|r| {
            partial += r;
            partial * partial
        })
        .sum::<f64>()
        / (n * n) as f64;

    let s_hat = long_run_variance(&resid, lags);
    if !s_hat.is_finite() || s_hat <= 0.0 {
        return Err(SkipReason::numeric(format!(
            "non-positive long-run variance {s_hat}"
        )));
    }

    let statistic = eta / s_hat;
    Ok(KpssResult {
        statistic,
        p_value: interp(statistic, &config.regression.critical_values(), &P_VALUES),
        lags,
    })
}

fn residuals(x: &[f64], regression: KpssRegression) -> Result<Vec<f64>, SkipReason> {
    let n = x.len();
    match regression {
        KpssRegression::Level => {
            let mean = x.iter().sum::<f64>() / n as f64;
            Ok(x.iter().map(|v| v - mean).collect())
        }
        KpssRegression::Trend => {
            let y = DVector::from_column_slice(x);
            let design = DMatrix::from_fn(n, 2, |r, c| if c == 0 { 1.0 } else { (r + 1) as f64 });
            let fit = ols::fit(&y, &design)?;
            Ok(fit.resid.iter().copied().collect())
        }
    }
}

fn autocovariance_sum(resid: &[f64], lag: usize) -> f64 {
    resid[lag..]
        .iter()
        .zip(resid.iter())
        .map(|(a, b)| a * b)
        .sum()
}

/// Bandwidth rule of Hobijn et al. (1998).
fn autolag(resid: &[f64]) -> Result<usize, SkipReason> {
    let n = resid.len();
    let nf = n as f64;
    let covlags = (nf.powf(2.0 / 9.0) as usize).min(n - 1);
    let mut s0 = resid.iter().map(|r| r * r).sum::<f64>() / nf;
    let mut s1 = 0.0;
    for i in 1..=covlags {
        let prod = autocovariance_sum(resid, i) / (nf / 2.0);
        s0 += prod;
        s1 += i as f64 * prod;
    }
    let ratio = s1 / s0;
    if !ratio.is_finite() {
        return Err(SkipReason::numeric("KPSS bandwidth ratio is not finite"));
    }
    let gamma = 1.1447 * (ratio * ratio).powf(1.0 / 3.0);
    Ok((gamma * nf.powf(1.0 / 3.0)) as usize)
}

/// Newey-West estimator with Bartlett weights.
fn long_run_variance(resid: &[f64], lags: usize) -> f64 {
    let n = resid.len();
    let mut s_hat = resid.iter().map(|r| r * r).sum::<f64>();
    for i in 1..=lags.min(n - 1) {
        let weight = 1.0 - i as f64 / (lags as f64 + 1.0);
        s_hat += 2.0 * autocovariance_sum(resid, i) * weight;
    }
    s_hat / n as f64
}

/// Piecewise-linear interpolation over ascending `xp`, clamped at the ends.
fn interp(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    if x <= xp[0] {
        return fp[0];
    }
    let last = xp.len() - 1;
    if x >= xp[last] {
        return fp[last];
    }
    let i = xp.iter().rposition(|&v| v <= x).unwrap_or(0);
    let t = (x - xp[i]) / (xp[i + 1] - xp[i]);
    fp[i] + t * (fp[i + 1] - fp[i])
}
