//! CSV result table writer.

use crate::domain::error::FracscanError;
use crate::domain::results::ResultTable;
use crate::ports::table_port::TablePort;

pub struct CsvTableAdapter;

impl TablePort for CsvTableAdapter {
    fn write_table(&self, table: &ResultTable, output_path: &str) -> Result<(), FracscanError> {
        let mut writer = csv::Writer::from_path(output_path)?;
        if table.is_empty() {
            writer.write_record([
                "symbol",
                "d",
                "mean_adf_p",
                "mean_kpss_p",
                "std_adf_p",
                "std_kpss_p",
                "pass_ratio",
                "valid_windows",
            ])?;
        }
        for row in table.rows() {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::results::ResultRow;
    use std::fs;
    use tempfile::TempDir;

    fn row(symbol: &str, d: f64, pass_ratio: f64) -> ResultRow {
        ResultRow {
            symbol: symbol.to_string(),
            d,
            mean_adf_p: 0.02,
            mean_kpss_p: 0.1,
            std_adf_p: 0.01,
            std_kpss_p: 0.0,
            pass_ratio,
            valid_windows: 4,
            passing_windows: (pass_ratio * 4.0) as usize,
        }
    }

    #[test]
    fn writes_header_and_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.csv");
        let mut table = ResultTable::new();
        table.push(row("AAPL", 0.5, 0.75));
        table.push(row("AAPL", 1.0, 1.0));

        CsvTableAdapter
            .write_table(&table, path.to_str().unwrap())
            .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines[0],
            "symbol,d,mean_adf_p,mean_kpss_p,std_adf_p,std_kpss_p,pass_ratio,valid_windows"
        );
        assert_eq!(lines[1], "AAPL,0.5,0.02,0.1,0.01,0.0,0.75,4");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn empty_table_still_has_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.csv");

        CsvTableAdapter
            .write_table(&ResultTable::new(), path.to_str().unwrap())
            .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.starts_with("symbol,d,"));
    }

    #[test]
    fn unwritable_path_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        let result = CsvTableAdapter.write_table(&ResultTable::new(), path.to_str().unwrap());
        assert!(result.is_err());
    }
}
