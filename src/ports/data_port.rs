//! Price data access port.

use crate::domain::error::FracscanError;
use crate::domain::series::Series;
use chrono::NaiveDate;

pub trait DataPort {
    /// Closing prices for `symbol` within `[start_date, end_date]`, oldest first.
    fn fetch_closes(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Series, FracscanError>;

    fn list_symbols(&self) -> Result<Vec<String>, FracscanError>;

    /// First date, last date and row count of the stored history.
    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, FracscanError>;
}
