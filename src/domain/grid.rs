//! Grid of differencing orders searched in ascending order.

const GRID_DECIMALS: i32 = 10;

/// Largest grid an arange may produce.
pub const MAX_GRID_LEN: usize = 100_000;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridError {
    #[error("grid is empty")]
    Empty,

    #[error("grid value {0} is not finite")]
    NonFinite(f64),

    #[error("grid value {0} is negative")]
    Negative(f64),

    #[error("grid is not strictly ascending at {0}")]
    NotAscending(f64),

    #[error("step must be positive")]
    NonPositiveStep,

    #[error("grid would hold more than {0} values")]
    TooLarge(usize),
}

/// Ascending, distinct differencing orders.
#[derive(Debug, Clone, PartialEq)]
pub struct DGrid {
    values: Vec<f64>,
}

impl DGrid {
    pub fn from_values(values: Vec<f64>) -> Result<Self, GridError> {
        if values.is_empty() {
            return Err(GridError::Empty);
        }
        let values: Vec<f64> = values.into_iter().map(round_order).collect();
        for (i, &d) in values.iter().enumerate() {
            if !d.is_finite() {
                return Err(GridError::NonFinite(d));
            }
            if d < 0.0 {
                return Err(GridError::Negative(d));
            }
            if i > 0 && d <= values[i - 1] {
                return Err(GridError::NotAscending(d));
            }
        }
        Ok(Self { values })
    }

    /// `start, start + step, ...` up to but excluding `stop`.
    pub fn arange(start: f64, stop: f64, step: f64) -> Result<Self, GridError> {
        if step.is_nan() || step <= 0.0 || step.is_infinite() {
            return Err(GridError::NonPositiveStep);
        }
        if !start.is_finite() {
            return Err(GridError::NonFinite(start));
        }
        if !stop.is_finite() {
            return Err(GridError::NonFinite(stop));
        }
        let span = (stop - start) / step;
        if !span.is_finite() || span > MAX_GRID_LEN as f64 {
            return Err(GridError::TooLarge(MAX_GRID_LEN));
        }
        let count = if span > 0.0 {
            (span - 1e-9).ceil() as usize
        } else {
            0
        };
        let values = (0..count).map(|i| start + i as f64 * step).collect();
        Self::from_values(values)
    }

    /// Parses a comma separated list such as `0.0, 0.5, 1.0`.
    pub fn parse_list(input: &str) -> Result<Vec<f64>, String> {
        input
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<f64>()
                    .map_err(|_| format!("'{s}' is not a number"))
            })
            .collect()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn round_order(d: f64) -> f64 {
    let scale = 10f64.powi(GRID_DECIMALS);
    (d * scale).round() / scale
}
