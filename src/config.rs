//! Index configuration
//!
//! An [`IndexConfig`] is loaded once by the caller and passed by reference
//! into every index function. It names the input variables, fixes the
//! reference period used for quantile thresholds, and selects the execution
//! mode. Defaults follow CESM daily output (`PRECT`, `TREFHTMN`, `TREFHTMX`,
//! `TREFHTDTR`) and the 1981-2010 ETCCDI base period.

use crate::errors::{ClimexError, Result};
use crate::parallel::ParallelConfig;
use chrono::NaiveDate;
use serde::Deserialize;

/// Top-level configuration for index computations.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IndexConfig {
    /// Names of the input variables.
    #[serde(default)]
    pub variables: VariableNames,

    /// Base period for quantile thresholds.
    #[serde(default)]
    pub reference: ReferencePeriod,

    /// Daily precipitation (mm) separating wet from dry days.
    #[serde(default = "default_wet_day_mm")]
    pub wet_day_mm: f64,

    /// Execution mode for per-cell reductions.
    #[serde(default)]
    pub parallel: ParallelConfig,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            variables: VariableNames::default(),
            reference: ReferencePeriod::default(),
            wet_day_mm: default_wet_day_mm(),
            parallel: ParallelConfig::default(),
        }
    }
}

impl IndexConfig {
    /// Parse and validate a configuration from JSON. Missing fields take
    /// their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ClimexError::ConfigError`] for malformed JSON or unknown
    /// fields and [`ClimexError::InvalidConfig`] for unusable values.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Replace the variable names.
    pub fn with_variables(mut self, variables: VariableNames) -> Self {
        self.variables = variables;
        self
    }

    /// Replace the reference period.
    pub fn with_reference(mut self, reference: ReferencePeriod) -> Self {
        self.reference = reference;
        self
    }

    /// Replace the execution mode.
    pub fn with_parallel(mut self, parallel: ParallelConfig) -> Self {
        self.parallel = parallel;
        self
    }

    /// Check that the configured values can be used.
    ///
    /// # Errors
    ///
    /// Returns [`ClimexError::InvalidConfig`] if the wet-day threshold is
    /// negative or not finite, if a variable name is empty, or if the
    /// reference period ends before it starts.
    pub fn validate(&self) -> Result<()> {
        if !self.wet_day_mm.is_finite() || self.wet_day_mm < 0.0 {
            return Err(ClimexError::InvalidConfig {
                reason: format!(
                    "wet_day_mm must be a finite non-negative value, got {}",
                    self.wet_day_mm
                ),
            });
        }
        let names = &self.variables;
        for (field, value) in [
            ("precip", &names.precip),
            ("tmin", &names.tmin),
            ("tmax", &names.tmax),
            ("dtr", &names.dtr),
        ] {
            if value.is_empty() {
                return Err(ClimexError::InvalidConfig {
                    reason: format!("variable name '{field}' is empty"),
                });
            }
        }
        if self.reference.start > self.reference.end {
            return Err(ClimexError::InvalidConfig {
                reason: format!(
                    "reference period starts {} after it ends {}",
                    self.reference.start, self.reference.end
                ),
            });
        }
        Ok(())
    }
}

/// Names of the variables read from a [`crate::Dataset`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariableNames {
    /// Daily precipitation, mm/day.
    #[serde(default = "default_precip_var")]
    pub precip: String,
    /// Daily minimum temperature, deg C.
    #[serde(default = "default_tmin_var")]
    pub tmin: String,
    /// Daily maximum temperature, deg C.
    #[serde(default = "default_tmax_var")]
    pub tmax: String,
    /// Diurnal temperature range, deg C.
    #[serde(default = "default_dtr_var")]
    pub dtr: String,
}

impl Default for VariableNames {
    fn default() -> Self {
        Self {
            precip: default_precip_var(),
            tmin: default_tmin_var(),
            tmax: default_tmax_var(),
            dtr: default_dtr_var(),
        }
    }
}

impl VariableNames {
    /// Variable holding the given temperature role.
    pub fn temperature(&self, role: TemperatureRole) -> &str {
        match role {
            TemperatureRole::MinTemp => &self.tmin,
            TemperatureRole::MaxTemp => &self.tmax,
        }
    }
}

/// Which daily temperature extreme a computation reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureRole {
    /// Daily minimum temperature (night).
    MinTemp,
    /// Daily maximum temperature (day).
    MaxTemp,
}

impl TemperatureRole {
    /// One-letter ETCCDI code: `N` for minimum, `X` for maximum.
    pub const fn code(self) -> char {
        match self {
            Self::MinTemp => 'N',
            Self::MaxTemp => 'X',
        }
    }
}

/// Inclusive date range over which quantile thresholds are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReferencePeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Default for ReferencePeriod {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(1981, 1, 1).unwrap_or(NaiveDate::MIN),
            end: NaiveDate::from_ymd_opt(2010, 12, 31).unwrap_or(NaiveDate::MAX),
        }
    }
}

impl ReferencePeriod {
    /// Build a period from its inclusive bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ClimexError::EmptyReferencePeriod`] if `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(ClimexError::EmptyReferencePeriod { start, end });
        }
        Ok(Self { start, end })
    }

    /// Whether `date` falls inside the period, bounds included.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

fn default_precip_var() -> String {
    "PRECT".to_string()
}
fn default_tmin_var() -> String {
    "TREFHTMN".to_string()
}
fn default_tmax_var() -> String {
    "TREFHTMX".to_string()
}
fn default_dtr_var() -> String {
    "TREFHTDTR".to_string()
}
fn default_wet_day_mm() -> f64 {
    1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = IndexConfig::default();
        assert_eq!(config.variables.precip, "PRECT");
        assert_eq!(config.variables.tmin, "TREFHTMN");
        assert_eq!(config.variables.tmax, "TREFHTMX");
        assert_eq!(config.variables.dtr, "TREFHTDTR");
        assert_eq!(config.wet_day_mm, 1.0);
        assert_eq!(
            config.reference.start,
            NaiveDate::from_ymd_opt(1981, 1, 1).unwrap()
        );
        assert_eq!(
            config.reference.end,
            NaiveDate::from_ymd_opt(2010, 12, 31).unwrap()
        );
        assert!(!config.parallel.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_partial() {
        let config = IndexConfig::from_json_str(
            r#"{
                "variables": {"precip": "pr"},
                "reference": {"start": "1961-01-01", "end": "1990-12-31"}
            }"#,
        )
        .unwrap();
        assert_eq!(config.variables.precip, "pr");
        assert_eq!(config.variables.tmax, "TREFHTMX");
        assert_eq!(config.reference.start.to_string(), "1961-01-01");
    }

    #[test]
    fn test_from_json_rejects_unknown_field() {
        let result = IndexConfig::from_json_str(r#"{"precip_var": "pr"}"#);
        assert!(matches!(result, Err(ClimexError::ConfigError(_))));
    }

    #[test]
    fn test_from_json_rejects_reversed_period() {
        let result = IndexConfig::from_json_str(
            r#"{"reference": {"start": "2010-12-31", "end": "1981-01-01"}}"#,
        );
        assert!(matches!(result, Err(ClimexError::InvalidConfig { .. })));
    }

    #[test]
    fn test_from_json_rejects_negative_wet_day() {
        let result = IndexConfig::from_json_str(r#"{"wet_day_mm": -1.0}"#);
        assert!(matches!(result, Err(ClimexError::InvalidConfig { .. })));
    }

    #[test]
    fn test_temperature_role() {
        let names = VariableNames::default();
        assert_eq!(names.temperature(TemperatureRole::MinTemp), "TREFHTMN");
        assert_eq!(names.temperature(TemperatureRole::MaxTemp), "TREFHTMX");
        assert_eq!(TemperatureRole::MinTemp.code(), 'N');
        assert_eq!(TemperatureRole::MaxTemp.code(), 'X');
    }

    #[test]
    fn test_reference_period_contains() {
        let period = ReferencePeriod::new(
            NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2000, 12, 31).unwrap(),
        )
        .unwrap();
        assert!(period.contains(NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()));
        assert!(period.contains(NaiveDate::from_ymd_opt(2000, 12, 31).unwrap()));
        assert!(!period.contains(NaiveDate::from_ymd_opt(2001, 1, 1).unwrap()));
    }
}
