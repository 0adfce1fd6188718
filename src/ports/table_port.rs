//! Result table sink port.

use crate::domain::error::FracscanError;
use crate::domain::results::ResultTable;

pub trait TablePort {
    /// Writes every row of `table` to `output_path`, replacing any existing file.
    fn write_table(&self, table: &ResultTable, output_path: &str) -> Result<(), FracscanError>;
}
