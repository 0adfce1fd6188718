//! Configuration validation.
//!
//! Every field is checked before any data is loaded; the first failure is
//! returned and is fatal for the run.

use crate::domain::error::FracscanError;
use crate::domain::fracdiff::ConvolutionMode;
use crate::domain::grid::DGrid;
use crate::domain::stationarity::adf::Autolag;
use crate::domain::stationarity::kpss::{KpssLags, KpssRegression};
use crate::domain::universe::parse_symbols;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;
use std::fmt::Display;
use std::str::FromStr;

/// Smallest window the unit-root regression can be fitted on.
pub const MIN_WINDOW_LENGTH: usize = 4;

pub fn validate_search_config(config: &dyn ConfigPort) -> Result<(), FracscanError> {
    validate_symbols(config)?;
    validate_dates(config)?;
    let window_length = validate_window_length(config)?;
    resolve_grid(config)?;
    validate_significance(config)?;
    validate_threads(config)?;
    validate_fracdiff(config, window_length)?;
    validate_tests(config)?;
    Ok(())
}

/// Parses `[section] key`, treating a missing or blank value as absent.
pub fn parse_optional<T>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<T>, FracscanError>
where
    T: FromStr,
    T::Err: Display,
{
    match config.get_string(section, key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| FracscanError::invalid(section, key, e.to_string())),
        _ => Ok(None),
    }
}

pub fn parse_required<T>(config: &dyn ConfigPort, section: &str, key: &str) -> Result<T, FracscanError>
where
    T: FromStr,
    T::Err: Display,
{
    parse_optional(config, section, key)?.ok_or_else(|| FracscanError::missing(section, key))
}

pub fn parse_date(config: &dyn ConfigPort, key: &str) -> Result<NaiveDate, FracscanError> {
    let raw: String = parse_required(config, "search", key)?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| {
        FracscanError::invalid("search", key, format!("invalid {key} format, expected YYYY-MM-DD"))
    })
}

/// The `d` grid: an explicit `d_values` list, or `d_start`/`d_stop`/`d_step`.
pub fn resolve_grid(config: &dyn ConfigPort) -> Result<DGrid, FracscanError> {
    if let Some(list) = config.get_string("search", "d_values").filter(|s| !s.trim().is_empty()) {
        let values = DGrid::parse_list(&list)
            .map_err(|e| FracscanError::invalid("search", "d_values", e))?;
        return DGrid::from_values(values)
            .map_err(|e| FracscanError::invalid("search", "d_values", e.to_string()));
    }

    let start: f64 = parse_optional(config, "search", "d_start")?
        .ok_or_else(|| FracscanError::missing("search", "d_values"))?;
    let stop: f64 = parse_required(config, "search", "d_stop")?;
    let step: f64 = parse_required(config, "search", "d_step")?;
    DGrid::arange(start, stop, step)
        .map_err(|e| FracscanError::invalid("search", "d_step", e.to_string()))
}

fn validate_symbols(config: &dyn ConfigPort) -> Result<(), FracscanError> {
    let raw = config
        .get_string("search", "symbols")
        .ok_or_else(|| FracscanError::missing("search", "symbols"))?;
    parse_symbols(&raw).map_err(|e| FracscanError::invalid("search", "symbols", e.to_string()))?;
    Ok(())
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), FracscanError> {
    let start_date = parse_date(config, "start_date")?;
    let end_date = parse_date(config, "end_date")?;
    if start_date >= end_date {
        return Err(FracscanError::invalid(
            "search",
            "start_date",
            "start_date must be before end_date",
        ));
    }
    Ok(())
}

fn validate_window_length(config: &dyn ConfigPort) -> Result<usize, FracscanError> {
    let value: usize = parse_required(config, "search", "window_length")?;
    if value < MIN_WINDOW_LENGTH {
        return Err(FracscanError::invalid(
            "search",
            "window_length",
            format!("window_length must be at least {MIN_WINDOW_LENGTH}"),
        ));
    }
    Ok(value)
}

fn validate_significance(config: &dyn ConfigPort) -> Result<(), FracscanError> {
    if let Some(value) = parse_optional::<f64>(config, "search", "significance")? {
        if !(value > 0.0 && value < 1.0) {
            return Err(FracscanError::invalid(
                "search",
                "significance",
                "significance must be between 0 and 1",
            ));
        }
    }
    Ok(())
}

fn validate_threads(config: &dyn ConfigPort) -> Result<(), FracscanError> {
    parse_optional::<usize>(config, "search", "threads")?;
    Ok(())
}

fn validate_fracdiff(config: &dyn ConfigPort, window_length: usize) -> Result<(), FracscanError> {
    let mode = parse_optional::<ConvolutionMode>(config, "fracdiff", "mode")?
        .unwrap_or(ConvolutionMode::Valid);
    if let Some(size) = parse_optional::<usize>(config, "fracdiff", "weight_window")? {
        if size == 0 {
            return Err(FracscanError::invalid(
                "fracdiff",
                "weight_window",
                "weight_window must be at least 1",
            ));
        }
        if mode == ConvolutionMode::Valid && size >= window_length {
            return Err(FracscanError::invalid(
                "fracdiff",
                "weight_window",
                "weight_window must be smaller than window_length in valid mode",
            ));
        }
    }
    Ok(())
}

fn validate_tests(config: &dyn ConfigPort) -> Result<(), FracscanError> {
    parse_optional::<Autolag>(config, "adf", "autolag")?;
    parse_optional::<usize>(config, "adf", "max_lag")?;
    parse_optional::<KpssRegression>(config, "kpss", "regression")?;
    parse_optional::<KpssLags>(config, "kpss", "nlags")?;
    Ok(())
}
