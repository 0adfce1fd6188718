//! Core domain types and logic.

pub mod config_validation;
pub mod error;
pub mod fracdiff;
pub mod grid;
pub mod ols;
pub mod results;
pub mod search;
pub mod series;
pub mod stationarity;
pub mod universe;
pub mod window;
