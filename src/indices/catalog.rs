//! Named catalog of the fixed-threshold indices
//!
//! Percentile-based indices need a [`crate::Threshold`] computed first and are
//! not part of the catalog; call them directly.

use super::diurnal::{self, Coverage, DtrStatistic};
use super::{precipitation, temperature};
use crate::config::{IndexConfig, VariableNames};
use crate::dataset::{AnnualIndex, Dataset};
use crate::errors::{ClimexError, Result};
use std::fmt;
use std::str::FromStr;

/// An index computable from a dataset and configuration alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexKind {
    Rx1day,
    Rx5day,
    WetDays,
    HeavyRainDays,
    VeryHeavyRainDays,
    TotalPrecip,
    Sdii,
    ConsecutiveDryDays,
    ConsecutiveWetDays,
    WarmestNight,
    CoolestNight,
    WarmestDay,
    CoolestDay,
    FrostDays,
    IceDays,
    TropicalNights,
    SummerDays,
    DtrMax,
    DtrMin,
    DtrMean,
}

impl IndexKind {
    pub const PRECIPITATION: [IndexKind; 9] = [
        Self::Rx1day,
        Self::Rx5day,
        Self::WetDays,
        Self::HeavyRainDays,
        Self::VeryHeavyRainDays,
        Self::TotalPrecip,
        Self::Sdii,
        Self::ConsecutiveDryDays,
        Self::ConsecutiveWetDays,
    ];

    pub const TEMPERATURE: [IndexKind; 8] = [
        Self::WarmestNight,
        Self::CoolestNight,
        Self::WarmestDay,
        Self::CoolestDay,
        Self::FrostDays,
        Self::IceDays,
        Self::TropicalNights,
        Self::SummerDays,
    ];

    pub const DIURNAL: [IndexKind; 3] = [Self::DtrMax, Self::DtrMin, Self::DtrMean];

    /// Every catalog entry, precipitation first.
    pub fn all() -> impl Iterator<Item = IndexKind> {
        Self::PRECIPITATION
            .into_iter()
            .chain(Self::TEMPERATURE)
            .chain(Self::DIURNAL)
    }

    /// Name of the resulting [`AnnualIndex`].
    pub const fn name(self) -> &'static str {
        match self {
            Self::Rx1day => "RX1D",
            Self::Rx5day => "RX5D",
            Self::WetDays => "NWD",
            Self::HeavyRainDays => "R10mm",
            Self::VeryHeavyRainDays => "R20mm",
            Self::TotalPrecip => "PTOT",
            Self::Sdii => "SDII",
            Self::ConsecutiveDryDays => "CDD",
            Self::ConsecutiveWetDays => "CWD",
            Self::WarmestNight => "TNX",
            Self::CoolestNight => "TNN",
            Self::WarmestDay => "TXX",
            Self::CoolestDay => "TXN",
            Self::FrostDays => "FD",
            Self::IceDays => "ID",
            Self::TropicalNights => "TR",
            Self::SummerDays => "SU",
            Self::DtrMax => DtrStatistic::Max.name(),
            Self::DtrMin => DtrStatistic::Min.name(),
            Self::DtrMean => DtrStatistic::Mean.name(),
        }
    }

    /// Input variable the index reads.
    pub fn variable(self, names: &VariableNames) -> &str {
        match self {
            Self::Rx1day
            | Self::Rx5day
            | Self::WetDays
            | Self::HeavyRainDays
            | Self::VeryHeavyRainDays
            | Self::TotalPrecip
            | Self::Sdii
            | Self::ConsecutiveDryDays
            | Self::ConsecutiveWetDays => &names.precip,
            Self::WarmestNight | Self::CoolestNight | Self::FrostDays | Self::TropicalNights => {
                &names.tmin
            }
            Self::WarmestDay | Self::CoolestDay | Self::IceDays | Self::SummerDays => &names.tmax,
            Self::DtrMax | Self::DtrMin | Self::DtrMean => &names.dtr,
        }
    }

    /// Compute this index over the full grid.
    pub fn compute(self, ds: &Dataset, cfg: &IndexConfig) -> Result<AnnualIndex> {
        match self {
            Self::Rx1day => precipitation::rx1day(ds, cfg),
            Self::Rx5day => precipitation::rx5day(ds, cfg),
            Self::WetDays => precipitation::wet_days(ds, cfg),
            Self::HeavyRainDays => precipitation::heavy_rain_days(ds, cfg),
            Self::VeryHeavyRainDays => precipitation::very_heavy_rain_days(ds, cfg),
            Self::TotalPrecip => precipitation::total_precip(ds, cfg),
            Self::Sdii => precipitation::sdii(ds, cfg),
            Self::ConsecutiveDryDays => precipitation::consecutive_dry_days(ds, cfg),
            Self::ConsecutiveWetDays => precipitation::consecutive_wet_days(ds, cfg),
            Self::WarmestNight => temperature::warmest_night(ds, cfg),
            Self::CoolestNight => temperature::coolest_night(ds, cfg),
            Self::WarmestDay => temperature::warmest_day(ds, cfg),
            Self::CoolestDay => temperature::coolest_day(ds, cfg),
            Self::FrostDays => temperature::frost_days(ds, cfg),
            Self::IceDays => temperature::ice_days(ds, cfg),
            Self::TropicalNights => temperature::tropical_nights(ds, cfg),
            Self::SummerDays => temperature::summer_days(ds, cfg),
            Self::DtrMax => diurnal::dtr_max(ds, Coverage::Full, cfg),
            Self::DtrMin => diurnal::dtr_min(ds, Coverage::Full, cfg),
            Self::DtrMean => diurnal::dtr_mean(ds, Coverage::Full, cfg),
        }
    }
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for IndexKind {
    type Err = ClimexError;

    fn from_str(s: &str) -> Result<Self> {
        Self::all()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ClimexError::UnknownIndex {
                name: s.to_string(),
            })
    }
}

/// Compute `kinds` in order, stopping at the first error.
pub fn compute_all(ds: &Dataset, kinds: &[IndexKind], cfg: &IndexConfig) -> Result<Vec<AnnualIndex>> {
    kinds.iter().map(|kind| kind.compute(ds, cfg)).collect()
}

/// Compute every catalog index whose input variable is present in `ds`.
pub fn compute_available(ds: &Dataset, cfg: &IndexConfig) -> Result<Vec<AnnualIndex>> {
    let kinds: Vec<IndexKind> = IndexKind::all()
        .filter(|kind| ds.contains_variable(kind.variable(&cfg.variables)))
        .collect();
    tracing::debug!(count = kinds.len(), "computing available catalog indices");
    compute_all(ds, &kinds, cfg)
}
