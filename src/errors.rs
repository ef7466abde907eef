//! Centralized error handling for climex
//!
//! Every index function returns [`Result`]. Errors surface directly to the
//! caller; nothing is retried or recovered inside the library.

use chrono::NaiveDate;

/// Main error type for climex operations
#[derive(Debug, thiserror::Error)]
pub enum ClimexError {
    /// Requested variable is not present in the dataset
    #[error("Variable '{var}' not found in dataset")]
    MissingVariable { var: String },

    /// Two arrays that must share a shape do not
    #[error("Shape mismatch in {context}: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        context: String,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    /// The reference period selects no time steps
    #[error("Reference period {start} to {end} contains no time steps")]
    EmptyReferencePeriod { start: NaiveDate, end: NaiveDate },

    /// Quantile outside [0, 1]
    #[error("Quantile {q} is outside [0, 1]")]
    InvalidQuantile { q: f64 },

    /// Rolling window of length zero
    #[error("Rolling window must be at least 1 step, got {window}")]
    InvalidWindow { window: usize },

    /// Array shape or dimension error
    #[error("Array error: {0}")]
    ArrayError(#[from] ndarray::ShapeError),

    /// Thread pool configuration error
    #[error("Thread pool error: {0}")]
    ThreadPoolError(String),

    /// Configuration could not be parsed
    #[error("Configuration error: {0}")]
    ConfigError(#[from] serde_json::Error),

    /// Name that matches no catalog index
    #[error("Unknown index '{name}'")]
    UnknownIndex { name: String },

    /// Configuration parsed but holds unusable values
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl ClimexError {
    pub(crate) fn shape_mismatch(
        context: impl Into<String>,
        expected: &[usize],
        found: &[usize],
    ) -> Self {
        Self::ShapeMismatch {
            context: context.into(),
            expected: expected.to_vec(),
            found: found.to_vec(),
        }
    }
}

/// Result type alias for climex operations
pub type Result<T> = std::result::Result<T, ClimexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_variable_display() {
        let err = ClimexError::MissingVariable {
            var: "PRECT".to_string(),
        };
        assert_eq!(format!("{}", err), "Variable 'PRECT' not found in dataset");
    }

    #[test]
    fn test_shape_mismatch_display() {
        let err = ClimexError::shape_mismatch("threshold grid", &[3, 4], &[2, 4]);
        let msg = format!("{}", err);
        assert!(msg.contains("threshold grid"));
        assert!(msg.contains("[3, 4]"));
        assert!(msg.contains("[2, 4]"));
    }

    #[test]
    fn test_empty_reference_period_display() {
        let err = ClimexError::EmptyReferencePeriod {
            start: NaiveDate::from_ymd_opt(1981, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2010, 12, 31).unwrap(),
        };
        assert!(format!("{}", err).contains("1981-01-01 to 2010-12-31"));
    }

    #[test]
    fn test_config_error_source() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ClimexError::from(parse_err);
        assert!(std::error::Error::source(&err).is_some());
        assert!(format!("{}", err).starts_with("Configuration error"));
    }
}
