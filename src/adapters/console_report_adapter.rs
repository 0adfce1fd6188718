//! Per-symbol answer printer.

use crate::domain::error::FracscanError;
use crate::domain::results::{OptimalD, OptimalLine};
use crate::ports::report_port::ReportPort;
use std::cell::RefCell;
use std::io::{self, Write};

/// Writes one line per symbol to any writer; stdout by default.
pub struct ConsoleReportAdapter<W: Write> {
    out: RefCell<W>,
}

impl ConsoleReportAdapter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleReportAdapter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: RefCell::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl<W: Write> ReportPort for ConsoleReportAdapter<W> {
    fn report_optimal(&self, symbol: &str, optimal: &OptimalD) -> Result<(), FracscanError> {
        writeln!(self.out.borrow_mut(), "{}", OptimalLine { symbol, optimal })?;
        Ok(())
    }
}
