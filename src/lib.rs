//! fracscan: minimal fractional differencing order search.
//!
//! For each price series, finds the smallest differencing order `d` at which
//! every sliding window passes both the ADF and the KPSS stationarity tests.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod ports;
