//! Domain error types.
//!
//! `FracscanError` covers run-level failures (configuration, data, output).
//! `SkipReason` covers per-window failures, which never escape the window
//! evaluator: a window that fails is excluded from the aggregates.

/// Top-level error type for fracscan.
#[derive(Debug, thiserror::Error)]
pub enum FracscanError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("no data for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl FracscanError {
    pub fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        FracscanError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub fn missing(section: &str, key: &str) -> Self {
        FracscanError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }
    }
}

impl From<&FracscanError> for std::process::ExitCode {
    fn from(err: &FracscanError) -> Self {
        let code: u8 = match err {
            FracscanError::Io(_) | FracscanError::Csv(_) => 1,
            FracscanError::ConfigParse { .. }
            | FracscanError::ConfigMissing { .. }
            | FracscanError::ConfigInvalid { .. } => 2,
            FracscanError::DataUnavailable { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

/// Why a single window was excluded from the aggregates.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SkipReason {
    #[error("degenerate input: {reason}")]
    DegenerateInput { reason: String },

    #[error("insufficient data: have {len} samples, need {minimum}")]
    InsufficientData { len: usize, minimum: usize },

    #[error("numeric failure: {reason}")]
    Numeric { reason: String },
}

impl SkipReason {
    pub fn degenerate(reason: impl Into<String>) -> Self {
        SkipReason::DegenerateInput {
            reason: reason.into(),
        }
    }

    pub fn numeric(reason: impl Into<String>) -> Self {
        SkipReason::Numeric {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::ExitCode;

    #[test]
    fn config_errors_map_to_exit_code_two() {
        let err = FracscanError::missing("search", "symbols");
        assert_eq!(ExitCode::from(&err), ExitCode::from(2));
        let err = FracscanError::invalid("search", "window_length", "must be positive");
        assert_eq!(ExitCode::from(&err), ExitCode::from(2));
    }

    #[test]
    fn data_unavailable_maps_to_exit_code_five() {
        let err = FracscanError::DataUnavailable {
            symbol: "AAPL".into(),
            reason: "file not found".into(),
        };
        assert_eq!(ExitCode::from(&err), ExitCode::from(5));
    }

    #[test]
    fn messages_name_the_offending_key() {
        let err = FracscanError::invalid("search", "d_step", "must be positive");
        assert_eq!(
            err.to_string(),
            "invalid config value [search] d_step: must be positive"
        );
    }

    #[test]
    fn skip_reason_display() {
        let reason = SkipReason::InsufficientData { len: 3, minimum: 4 };
        assert_eq!(
            reason.to_string(),
            "insufficient data: have 3 samples, need 4"
        );
        assert_eq!(
            SkipReason::degenerate("zero variance").to_string(),
            "degenerate input: zero variance"
        );
    }
}
