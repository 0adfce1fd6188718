//! Dual stationarity test battery.
//!
//! A window is stationary when ADF rejects its unit-root null and KPSS fails
//! to reject its stationarity null, both at the same significance level.

pub mod adf;
pub mod kpss;

use crate::domain::error::SkipReason;
use adf::AdfConfig;
use kpss::KpssConfig;

pub const DEFAULT_SIGNIFICANCE: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestOutcome {
    pub adf_p: f64,
    pub kpss_p: f64,
    pub adf_pass: bool,
    pub kpss_pass: bool,
}

impl TestOutcome {
    pub fn from_p_values(adf_p: f64, kpss_p: f64, significance: f64) -> Self {
        Self {
            adf_p,
            kpss_p,
            adf_pass: adf_p < significance,
            kpss_pass: kpss_p > significance,
        }
    }

    pub fn passes(&self) -> bool {
        self.adf_pass && self.kpss_pass
    }
}

/// Anything that can judge a single transformed window.
///
/// Implementations must be `Sync`; windows are evaluated in parallel.
pub trait StationarityBattery: Sync {
    fn evaluate(&self, window: &[f64]) -> Result<TestOutcome, SkipReason>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct DualTestBattery {
    pub adf: AdfConfig,
    pub kpss: KpssConfig,
    pub significance: f64,
}

impl Default for DualTestBattery {
    fn default() -> Self {
        Self {
            adf: AdfConfig::default(),
            kpss: KpssConfig::default(),
            significance: DEFAULT_SIGNIFICANCE,
        }
    }
}

impl StationarityBattery for DualTestBattery {
    fn evaluate(&self, window: &[f64]) -> Result<TestOutcome, SkipReason> {
        if window.iter().any(|v| !v.is_finite()) {
            return Err(SkipReason::numeric("non-finite value in window"));
        }
        let adf = adf::adf(window, &self.adf)?;
        let kpss = kpss::kpss(window, &self.kpss)?;
        if !adf.p_value.is_finite() || !kpss.p_value.is_finite() {
            return Err(SkipReason::numeric("non-finite p-value"));
        }
        Ok(TestOutcome::from_p_values(
            adf.p_value,
            kpss.p_value,
            self.significance,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn outcome_requires_both_tests() {
        assert!(TestOutcome::from_p_values(0.01, 0.10, 0.05).passes());
        assert!(!TestOutcome::from_p_values(0.20, 0.10, 0.05).passes());
        assert!(!TestOutcome::from_p_values(0.01, 0.01, 0.05).passes());
    }

    #[test]
    fn thresholds_are_strict() {
        let at = TestOutcome::from_p_values(0.05, 0.05, 0.05);
        assert!(!at.adf_pass);
        assert!(!at.kpss_pass);
    }

    #[test]
    fn white_noise_passes_battery() {
        let mut rng = StdRng::seed_from_u64(11);
        let x: Vec<f64> = (0..300).map(|_| rng.gen_range(-1.0..1.0)).collect();
        let outcome = DualTestBattery::default().evaluate(&x).unwrap();
        assert!(outcome.adf_pass);
        assert!(outcome.adf_p < 0.01);
    }

    #[test]
    fn non_finite_window_is_numeric_skip() {
        let err = DualTestBattery::default()
            .evaluate(&[1.0, f64::NAN, 2.0, 3.0])
            .unwrap_err();
        assert!(matches!(err, SkipReason::Numeric { .. }));
    }

    #[test]
    fn constant_window_is_degenerate() {
        let err = DualTestBattery::default().evaluate(&[2.0; 30]).unwrap_err();
        assert!(matches!(err, SkipReason::DegenerateInput { .. }));
    }
}
