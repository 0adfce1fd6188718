//! Per-symbol report port.

use crate::domain::error::FracscanError;
use crate::domain::results::OptimalD;

pub trait ReportPort {
    fn report_optimal(&self, symbol: &str, optimal: &OptimalD) -> Result<(), FracscanError>;

    /// Reports every symbol in order, stopping at the first failure.
    fn report_all(&self, answers: &[(String, OptimalD)]) -> Result<(), FracscanError> {
        for (symbol, optimal) in answers {
            self.report_optimal(symbol, optimal)?;
        }
        Ok(())
    }
}
