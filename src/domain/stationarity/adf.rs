//! Augmented Dickey-Fuller unit-root test with a constant.
//!
//! Null hypothesis: the series has a unit root. The lag order is chosen by
//! an information criterion over a common sample, then the regression is
//! re-run on the sample trimmed by the chosen lag. The p-value uses
//! MacKinnon's (1994) response-surface approximation for one variable.

use crate::domain::error::SkipReason;
use crate::domain::ols::{self, OlsFit};
use nalgebra::{DMatrix, DVector};
use statrs::distribution::{ContinuousCDF, Normal};
use std::fmt;
use std::str::FromStr;

/// 95% quantile of the standard normal, stopping rule for `Autolag::TStat`.
const TSTAT_STOP: f64 = 1.644_853_626_951_472_2;

const TAU_MAX: f64 = 2.74;
const TAU_MIN: f64 = -18.83;
const TAU_STAR: f64 = -1.61;
const TAU_SMALLP: [f64; 3] = [2.1659, 1.4412, 0.038269];
const TAU_LARGEP: [f64; 4] = [1.7339, 0.93202, -0.12745, -0.010368];

/// MacKinnon (2010) finite-sample critical value coefficients, 1%, 5%, 10%.
const TAU_CRIT: [[f64; 4]; 3] = [
    [-3.43035, -6.5393, -16.786, -79.433],
    [-2.86154, -2.8903, -4.234, -40.040],
    [-2.56677, -1.5384, -2.809, 0.0],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Autolag {
    Aic,
    Bic,
    TStat,
    None,
}

impl FromStr for Autolag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "aic" => Ok(Autolag::Aic),
            "bic" => Ok(Autolag::Bic),
            "t-stat" | "tstat" => Ok(Autolag::TStat),
            "none" => Ok(Autolag::None),
            other => Err(format!(
                "unknown autolag '{other}' (expected aic, bic, t-stat or none)"
            )),
        }
    }
}

impl fmt::Display for Autolag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Autolag::Aic => "aic",
            Autolag::Bic => "bic",
            Autolag::TStat => "t-stat",
            Autolag::None => "none",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdfConfig {
    pub autolag: Autolag,
    pub max_lag: Option<usize>,
}

impl Default for AdfConfig {
    fn default() -> Self {
        Self {
            autolag: Autolag::Aic,
            max_lag: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdfResult {
    pub statistic: f64,
    pub p_value: f64,
    pub used_lag: usize,
    pub nobs: usize,
    /// 1%, 5% and 10% critical values for `nobs`.
    pub critical_values: [f64; 3],
}

pub fn adf(x: &[f64], config: &AdfConfig) -> Result<AdfResult, SkipReason> {
    let n = x.len();
    if n < 2 {
        return Err(SkipReason::InsufficientData { len: n, minimum: 4 });
    }
    if x.iter().all(|&v| v == x[0]) {
        return Err(SkipReason::degenerate("constant series"));
    }

    // n / 2 - ntrend - 1 with a single constant term
    let cap = (n / 2) as i64 - 2;
    let maxlag = match config.max_lag {
        Some(m) if m as i64 > cap => {
            return Err(SkipReason::InsufficientData {
                len: n,
                minimum: 2 * (m + 2),
            });
        }
        Some(m) => m,
        None => {
            let schwert = (12.0 * (n as f64 / 100.0).powf(0.25)).ceil() as i64;
            let m = schwert.min(cap);
            if m < 0 {
                return Err(SkipReason::InsufficientData { len: n, minimum: 4 });
            }
            m as usize
        }
    };

    let xdiff: Vec<f64> = x.windows(2).map(|p| p[1] - p[0]).collect();

    let best_lag = match config.autolag {
        Autolag::None => maxlag,
        criterion => {
            let (y, design) = lagged_design(x, &xdiff, maxlag, maxlag);
            let fits = usable_fits((0..=maxlag).map(|lag| {
                (lag, ols::fit(&y, &design.columns(0, lag + 2).into_owned()))
            }))?;
            select_lag(&fits, criterion)
        }
    };

    let (y, design) = lagged_design(x, &xdiff, best_lag, best_lag);
    let fit = ols::fit(&y, &design)?;
    let statistic = fit.tvalue(1);
    if !statistic.is_finite() {
        return Err(SkipReason::numeric("non-finite ADF statistic"));
    }

    Ok(AdfResult {
        statistic,
        p_value: mackinnon_p(statistic)?,
        used_lag: best_lag,
        nobs: fit.nobs,
        critical_values: mackinnon_critical_values(fit.nobs),
    })
}

/// Rows regress `xdiff[j]` on a constant, the level `x[j]` and `lags`
/// lagged differences, for `j` in `trim..xdiff.len()`.
fn lagged_design(x: &[f64], xdiff: &[f64], trim: usize, lags: usize) -> (DVector<f64>, DMatrix<f64>) {
    let rows = xdiff.len() - trim;
    let y = DVector::from_iterator(rows, xdiff[trim..].iter().copied());
    let design = DMatrix::from_fn(rows, lags + 2, |r, c| {
        let j = trim + r;
        match c {
            0 => 1.0,
            1 => x[j],
            lag => xdiff[j - (lag - 1)],
        }
    });
    (y, design)
}

/// Candidate fits that succeeded, in lag order. Fails only when none did.
fn usable_fits(
    candidates: impl IntoIterator<Item = (usize, Result<OlsFit, SkipReason>)>,
) -> Result<Vec<(usize, OlsFit)>, SkipReason> {
    let mut usable = Vec::new();
    let mut first_error = None;
    for (lag, fit) in candidates {
        match fit {
            Ok(fit) => usable.push((lag, fit)),
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }
    if usable.is_empty() {
        return Err(first_error.unwrap_or_else(|| SkipReason::numeric("no candidate lag")));
    }
    Ok(usable)
}

/// Each entry pairs a lag with the regression using that many lagged
/// differences. Entries are in ascending lag order and never empty.
fn select_lag(fits: &[(usize, OlsFit)], criterion: Autolag) -> usize {
    let smallest = fits.first().map_or(0, |(lag, _)| *lag);
    match criterion {
        Autolag::TStat => fits
            .iter()
            .rev()
            .find(|(lag, fit)| fit.tvalue(lag + 1).abs() >= TSTAT_STOP)
            .map_or(smallest, |(lag, _)| *lag),
        Autolag::Aic | Autolag::Bic | Autolag::None => {
            let ic = |f: &OlsFit| match criterion {
                Autolag::Bic => f.bic(),
                _ => f.aic(),
            };
            let mut best: Option<(usize, f64)> = None;
            for (lag, fit) in fits {
                let value = ic(fit);
                if best.is_none_or(|(_, b)| value < b) {
                    best = Some((*lag, value));
                }
            }
            best.map_or(smallest, |(lag, _)| lag)
        }
    }
}

/// Approximate p-value of the ADF statistic (constant, one variable).
pub fn mackinnon_p(statistic: f64) -> Result<f64, SkipReason> {
    if statistic > TAU_MAX {
        return Ok(1.0);
    }
    if statistic < TAU_MIN {
        return Ok(0.0);
    }
    let z = if statistic <= TAU_STAR {
        polyval(&TAU_SMALLP, statistic)
    } else {
        polyval(&TAU_LARGEP, statistic)
    };
    let normal =
        Normal::new(0.0, 1.0).map_err(|e| SkipReason::numeric(format!("normal: {e}")))?;
    Ok(normal.cdf(z))
}

pub fn mackinnon_critical_values(nobs: usize) -> [f64; 3] {
    let n = nobs as f64;
    TAU_CRIT.map(|b| b[0] + b[1] / n + b[2] / (n * n) + b[3] / (n * n * n))
}

/// Evaluates `c[0] + c[1] x + c[2] x^2 + ...`.
fn polyval(coefs: &[f64], x: f64) -> f64 {
    coefs.iter().rev().fold(0.0, |acc, c| acc * x + c)
}
