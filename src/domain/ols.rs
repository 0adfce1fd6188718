//! Ordinary least squares via SVD pseudo-inverse.
//!
//! Rank-deficient designs are handled the way a pseudo-inverse does: singular
//! values below `max(s) * max(n, k) * eps` are dropped and the rank is
//! reduced accordingly.

use crate::domain::error::SkipReason;
use nalgebra::{DMatrix, DVector};
use std::f64::consts::PI;

#[derive(Debug, Clone)]
pub struct OlsFit {
    pub params: DVector<f64>,
    pub bse: DVector<f64>,
    pub resid: DVector<f64>,
    pub ssr: f64,
    pub nobs: usize,
    pub rank: usize,
}

impl OlsFit {
    pub fn tvalue(&self, column: usize) -> f64 {
        self.params[column] / self.bse[column]
    }

    /// Gaussian log-likelihood.
    pub fn llf(&self) -> f64 {
        let n = self.nobs as f64;
        let half = n / 2.0;
        -half * (2.0 * PI).ln() - half * (self.ssr / n).ln() - half
    }

    pub fn aic(&self) -> f64 {
        -2.0 * self.llf() + 2.0 * self.rank as f64
    }

    pub fn bic(&self) -> f64 {
        -2.0 * self.llf() + (self.nobs as f64).ln() * self.rank as f64
    }

    pub fn df_resid(&self) -> usize {
        self.nobs - self.rank
    }
}

pub fn fit(y: &DVector<f64>, x: &DMatrix<f64>) -> Result<OlsFit, SkipReason> {
    let (n, k) = x.shape();
    if n != y.len() {
        return Err(SkipReason::numeric(format!(
            "design has {n} rows but response has {}",
            y.len()
        )));
    }
    if k == 0 || n == 0 {
        return Err(SkipReason::numeric("empty design matrix"));
    }
    if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
        return Err(SkipReason::numeric("non-finite value in regression"));
    }

    let svd = x.clone().svd(true, true);
    let u = svd
        .u
        .as_ref()
        .ok_or_else(|| SkipReason::numeric("SVD did not produce U"))?;
    let v_t = svd
        .v_t
        .as_ref()
        .ok_or_else(|| SkipReason::numeric("SVD did not produce V^T"))?;
    let s = &svd.singular_values;

    let s_max = s.max();
    if s_max <= 0.0 {
        return Err(SkipReason::numeric("design matrix is zero"));
    }
    let tol = s_max * n.max(k) as f64 * f64::EPSILON;
    let s_inv = s.map(|v| if v > tol { 1.0 / v } else { 0.0 });
    let rank = s.iter().filter(|&&v| v > tol).count();
    if rank >= n {
        return Err(SkipReason::InsufficientData {
            len: n,
            minimum: rank + 1,
        });
    }

    let uty = u.transpose() * y;
    let params = v_t.transpose() * uty.component_mul(&s_inv);
    let resid = y - x * &params;
    let ssr = resid.norm_squared();
    let sigma2 = ssr / (n - rank) as f64;

    // diag((X'X)^+) = sum_i v[j, i]^2 / s_i^2
    let bse = DVector::from_iterator(
        k,
        (0..k).map(|j| {
            let var: f64 = (0..s.len())
                .map(|i| (v_t[(i, j)] * s_inv[i]).powi(2))
                .sum();
            (sigma2 * var).sqrt()
        }),
    );

    if ssr <= 0.0 || bse.iter().any(|v| !v.is_finite()) {
        return Err(SkipReason::numeric("perfect fit or non-finite standard errors"));
    }

    Ok(OlsFit {
        params,
        bse,
        resid,
        ssr,
        nobs: n,
        rank,
    })
}
