//! Labeled containers for gridded daily series and their annual reductions
//!
//! A [`Dataset`] holds named `(time, lat, lon)` arrays over a shared time axis
//! and [`SpatialGrid`]. Index functions reduce it to an [`AnnualIndex`]
//! shaped `(year, lat, lon)`. Quantile thresholds are [`Threshold`] arrays
//! shaped `(lat, lon)`.

use crate::config::ReferencePeriod;
use crate::errors::{ClimexError, Result};
use chrono::{Datelike, NaiveDate};
use ndarray::{Array2, Array3, ArrayView2, ArrayView3, Axis};
use std::collections::BTreeMap;

/// Dimension names of every [`AnnualIndex`].
pub const ANNUAL_DIMS: [&str; 3] = ["year", "lat", "lon"];

/// Dimension names of every [`Threshold`] and [`Mask`].
pub const GRID_DIMS: [&str; 2] = ["lat", "lon"];

/// Latitude and longitude coordinates of a regular grid.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialGrid {
    lat: Vec<f64>,
    lon: Vec<f64>,
}

impl SpatialGrid {
    pub fn new(lat: Vec<f64>, lon: Vec<f64>) -> Self {
        Self { lat, lon }
    }

    pub fn lat(&self) -> &[f64] {
        &self.lat
    }

    pub fn lon(&self) -> &[f64] {
        &self.lon
    }

    /// `(n_lat, n_lon)`
    pub fn shape(&self) -> (usize, usize) {
        (self.lat.len(), self.lon.len())
    }

    /// Number of grid cells.
    pub fn len(&self) -> usize {
        self.lat.len() * self.lon.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn ensure_shape(&self, context: &str, found: &[usize]) -> Result<()> {
        let (n_lat, n_lon) = self.shape();
        if found != [n_lat, n_lon] {
            return Err(ClimexError::shape_mismatch(context, &[n_lat, n_lon], found));
        }
        Ok(())
    }

    pub(crate) fn ensure_same(&self, context: &str, other: &SpatialGrid) -> Result<()> {
        let (n_lat, n_lon) = other.shape();
        self.ensure_shape(context, &[n_lat, n_lon])
    }
}

/// Collection of daily gridded variables sharing one time axis.
#[derive(Debug, Clone)]
pub struct Dataset {
    time: Vec<NaiveDate>,
    grid: SpatialGrid,
    variables: BTreeMap<String, Array3<f64>>,
}

impl Dataset {
    /// Empty dataset over the given axes.
    pub fn new(time: Vec<NaiveDate>, grid: SpatialGrid) -> Self {
        Self {
            time,
            grid,
            variables: BTreeMap::new(),
        }
    }

    /// Builder form of [`Dataset::insert_variable`].
    ///
    /// # Errors
    ///
    /// Returns [`ClimexError::ShapeMismatch`] if `data` is not shaped
    /// `(time, lat, lon)` for this dataset's axes.
    pub fn with_variable(mut self, name: impl Into<String>, data: Array3<f64>) -> Result<Self> {
        self.insert_variable(name, data)?;
        Ok(self)
    }

    /// Add or replace a variable.
    ///
    /// # Errors
    ///
    /// Returns [`ClimexError::ShapeMismatch`] if `data` is not shaped
    /// `(time, lat, lon)` for this dataset's axes.
    pub fn insert_variable(&mut self, name: impl Into<String>, data: Array3<f64>) -> Result<()> {
        let name = name.into();
        let (n_lat, n_lon) = self.grid.shape();
        let expected = [self.time.len(), n_lat, n_lon];
        if data.shape() != expected {
            return Err(ClimexError::shape_mismatch(
                format!("variable '{name}'"),
                &expected,
                data.shape(),
            ));
        }
        self.variables.insert(name, data);
        Ok(())
    }

    /// Borrow a variable as a `(time, lat, lon)` view.
    ///
    /// # Errors
    ///
    /// Returns [`ClimexError::MissingVariable`] if no variable has that name.
    pub fn variable(&self, name: &str) -> Result<ArrayView3<'_, f64>> {
        self.variables
            .get(name)
            .map(|data| data.view())
            .ok_or_else(|| ClimexError::MissingVariable {
                var: name.to_string(),
            })
    }

    pub fn contains_variable(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// Variable names in sorted order.
    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }

    pub fn time(&self) -> &[NaiveDate] {
        &self.time
    }

    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    /// Calendar-year buckets of the time axis.
    pub fn year_groups(&self) -> YearGroups {
        YearGroups::from_dates(&self.time)
    }

    /// Time indices inside `period`, in axis order.
    pub fn period_indices(&self, period: &ReferencePeriod) -> Vec<usize> {
        self.time
            .iter()
            .enumerate()
            .filter(|(_, date)| period.contains(**date))
            .map(|(i, _)| i)
            .collect()
    }

    /// New dataset restricted to the time steps inside `period`.
    ///
    /// # Errors
    ///
    /// Returns [`ClimexError::EmptyReferencePeriod`] if no time step falls
    /// inside the period.
    pub fn select_period(&self, period: &ReferencePeriod) -> Result<Dataset> {
        let indices = self.period_indices(period);
        if indices.is_empty() {
            return Err(ClimexError::EmptyReferencePeriod {
                start: period.start,
                end: period.end,
            });
        }
        let variables = self
            .variables
            .iter()
            .map(|(name, data)| (name.clone(), data.select(Axis(0), &indices)))
            .collect();
        Ok(Dataset {
            time: indices.iter().map(|&i| self.time[i]).collect(),
            grid: self.grid.clone(),
            variables,
        })
    }
}

/// Time indices bucketed by calendar year, ascending by year.
///
/// Partial years at either end of a record keep whatever days are present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearGroups {
    groups: Vec<(i32, Vec<usize>)>,
}

impl YearGroups {
    pub fn from_dates(dates: &[NaiveDate]) -> Self {
        let mut by_year: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
        for (i, date) in dates.iter().enumerate() {
            by_year.entry(date.year()).or_default().push(i);
        }
        Self {
            groups: by_year.into_iter().collect(),
        }
    }

    pub fn years(&self) -> Vec<i32> {
        self.groups.iter().map(|(year, _)| *year).collect()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, &[usize])> {
        self.groups
            .iter()
            .map(|(year, indices)| (*year, indices.as_slice()))
    }

    /// Number of time steps recorded for `year`.
    pub fn days_in(&self, year: i32) -> Option<usize> {
        self.groups
            .iter()
            .find(|(y, _)| *y == year)
            .map(|(_, indices)| indices.len())
    }
}

/// Descriptive attributes attached to every index and threshold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexMetadata {
    pub unit: String,
    pub description: String,
}

impl IndexMetadata {
    pub fn new(unit: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            description: description.into(),
        }
    }
}

/// One value per year and grid cell.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnualIndex {
    name: String,
    years: Vec<i32>,
    grid: SpatialGrid,
    data: Array3<f64>,
    metadata: IndexMetadata,
}

impl AnnualIndex {
    pub(crate) fn new(
        name: impl Into<String>,
        years: Vec<i32>,
        grid: SpatialGrid,
        data: Array3<f64>,
        metadata: IndexMetadata,
    ) -> Self {
        Self {
            name: name.into(),
            years,
            grid,
            data,
            metadata,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    pub fn data(&self) -> ArrayView3<'_, f64> {
        self.data.view()
    }

    pub fn into_data(self) -> Array3<f64> {
        self.data
    }

    pub fn metadata(&self) -> &IndexMetadata {
        &self.metadata
    }

    pub fn dims(&self) -> [&'static str; 3] {
        ANNUAL_DIMS
    }

    /// `(lat, lon)` field for one year.
    pub fn year_slice(&self, year: i32) -> Option<ArrayView2<'_, f64>> {
        let i = self.years.iter().position(|&y| y == year)?;
        Some(self.data.index_axis(Axis(0), i))
    }

    /// Value at `(year, lat index, lon index)`.
    pub fn get(&self, year: i32, lat: usize, lon: usize) -> Option<f64> {
        let i = self.years.iter().position(|&y| y == year)?;
        self.data.get([i, lat, lon]).copied()
    }

    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_metadata(mut self, metadata: IndexMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Cell-wise `self / denominator`, IEEE semantics for zero denominators.
    pub(crate) fn ratio(
        &self,
        denominator: &AnnualIndex,
        name: impl Into<String>,
        metadata: IndexMetadata,
    ) -> Result<AnnualIndex> {
        if self.data.shape() != denominator.data.shape() {
            return Err(ClimexError::shape_mismatch(
                "index ratio",
                self.data.shape(),
                denominator.data.shape(),
            ));
        }
        Ok(AnnualIndex::new(
            name,
            self.years.clone(),
            self.grid.clone(),
            &self.data / &denominator.data,
            metadata,
        ))
    }
}

/// Quantile rounded to a whole percentage, as used in index names.
pub(crate) fn percent_label(q: f64) -> u32 {
    (q * 100.0).round() as u32
}

/// Per-cell threshold computed once over a reference period.
#[derive(Debug, Clone, PartialEq)]
pub struct Threshold {
    name: String,
    quantile: f64,
    grid: SpatialGrid,
    data: Array2<f64>,
    metadata: IndexMetadata,
}

impl Threshold {
    /// Wrap a caller-supplied `(lat, lon)` array.
    ///
    /// # Errors
    ///
    /// Returns [`ClimexError::InvalidQuantile`] if `quantile` is outside
    /// `[0, 1]` and [`ClimexError::ShapeMismatch`] if `data` does not match
    /// `grid`.
    pub fn from_array(
        name: impl Into<String>,
        quantile: f64,
        grid: SpatialGrid,
        data: Array2<f64>,
    ) -> Result<Self> {
        if !(0.0..=1.0).contains(&quantile) {
            return Err(ClimexError::InvalidQuantile { q: quantile });
        }
        grid.ensure_shape("threshold", data.shape())?;
        Ok(Self {
            name: name.into(),
            quantile,
            grid,
            data,
            metadata: IndexMetadata::default(),
        })
    }

    /// The same value in every cell.
    ///
    /// # Errors
    ///
    /// Returns [`ClimexError::InvalidQuantile`] if `quantile` is outside `[0, 1]`.
    pub fn constant(
        name: impl Into<String>,
        quantile: f64,
        grid: SpatialGrid,
        value: f64,
    ) -> Result<Self> {
        let data = Array2::from_elem(grid.shape(), value);
        Self::from_array(name, quantile, grid, data)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Quantile this threshold represents, in `[0, 1]`.
    pub fn quantile(&self) -> f64 {
        self.quantile
    }

    /// Quantile as a whole percentage (0.95 gives 95).
    pub fn percent(&self) -> u32 {
        percent_label(self.quantile)
    }

    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    pub fn data(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    pub fn metadata(&self) -> &IndexMetadata {
        &self.metadata
    }

    pub fn dims(&self) -> [&'static str; 2] {
        GRID_DIMS
    }

    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_metadata(mut self, metadata: IndexMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Grid cells that take part in a masked computation.
#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    grid: SpatialGrid,
    data: Array2<bool>,
}

impl Mask {
    /// Build from 1/0 flags; a cell is active where its flag equals 1.
    ///
    /// # Errors
    ///
    /// Returns [`ClimexError::ShapeMismatch`] if `flags` does not match `grid`.
    pub fn from_flags(grid: SpatialGrid, flags: ArrayView2<'_, f64>) -> Result<Self> {
        Self::from_bools(grid, flags.mapv(|flag| flag == 1.0))
    }

    /// # Errors
    ///
    /// Returns [`ClimexError::ShapeMismatch`] if `data` does not match `grid`.
    pub fn from_bools(grid: SpatialGrid, data: Array2<bool>) -> Result<Self> {
        grid.ensure_shape("mask", data.shape())?;
        Ok(Self { grid, data })
    }

    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    pub fn data(&self) -> ArrayView2<'_, bool> {
        self.data.view()
    }

    /// Number of active cells.
    pub fn active_cells(&self) -> usize {
        self.data.iter().filter(|&&active| active).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr2, Array3};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_year_groups_partial_and_unsorted() {
        let dates = vec![
            date(2001, 1, 1),
            date(2000, 12, 30),
            date(2000, 12, 31),
            date(2001, 1, 2),
        ];
        let groups = YearGroups::from_dates(&dates);
        assert_eq!(groups.years(), vec![2000, 2001]);
        let collected: Vec<(i32, Vec<usize>)> =
            groups.iter().map(|(y, idx)| (y, idx.to_vec())).collect();
        assert_eq!(collected, vec![(2000, vec![1, 2]), (2001, vec![0, 3])]);
        assert_eq!(groups.days_in(2000), Some(2));
        assert_eq!(groups.days_in(1999), None);
    }

    #[test]
    fn test_insert_variable_shape_checked() {
        let grid = SpatialGrid::new(vec![0.0, 1.0], vec![10.0]);
        let mut ds = Dataset::new(vec![date(2000, 1, 1), date(2000, 1, 2)], grid);
        assert!(ds.insert_variable("ok", Array3::zeros((2, 2, 1))).is_ok());
        let err = ds.insert_variable("bad", Array3::zeros((3, 2, 1))).unwrap_err();
        match err {
            ClimexError::ShapeMismatch {
                expected, found, ..
            } => {
                assert_eq!(expected, vec![2, 2, 1]);
                assert_eq!(found, vec![3, 2, 1]);
            }
            other => panic!("Expected ShapeMismatch, got {other:?}"),
        }
        assert!(!ds.contains_variable("bad"));
    }

    #[test]
    fn test_select_period() {
        let grid = SpatialGrid::new(vec![0.0], vec![0.0]);
        let time = vec![date(1980, 12, 31), date(1981, 1, 1), date(1981, 1, 2)];
        let data = Array3::from_shape_vec((3, 1, 1), vec![1.0, 2.0, 3.0]).unwrap();
        let ds = Dataset::new(time, grid).with_variable("x", data).unwrap();

        let period = ReferencePeriod::new(date(1981, 1, 1), date(2010, 12, 31)).unwrap();
        let selected = ds.select_period(&period).unwrap();
        assert_eq!(selected.time(), &[date(1981, 1, 1), date(1981, 1, 2)]);
        let x = selected.variable("x").unwrap();
        assert_eq!(x[[0, 0, 0]], 2.0);
        assert_eq!(x[[1, 0, 0]], 3.0);

        let later = ReferencePeriod::new(date(2020, 1, 1), date(2020, 12, 31)).unwrap();
        assert!(matches!(
            ds.select_period(&later),
            Err(ClimexError::EmptyReferencePeriod { .. })
        ));
    }

    #[test]
    fn test_threshold_validation() {
        let grid = SpatialGrid::new(vec![0.0, 1.0], vec![0.0]);
        assert!(matches!(
            Threshold::constant("Q", 1.5, grid.clone(), 1.0),
            Err(ClimexError::InvalidQuantile { .. })
        ));
        assert!(matches!(
            Threshold::from_array("Q", 0.9, grid.clone(), Array2::zeros((1, 1))),
            Err(ClimexError::ShapeMismatch { .. })
        ));
        let t = Threshold::constant("Q95", 0.95, grid, 1.0).unwrap();
        assert_eq!(t.percent(), 95);
        assert_eq!(t.data().shape(), &[2, 1]);
    }

    #[test]
    fn test_percent_label_rounds() {
        assert_eq!(percent_label(0.95), 95);
        assert_eq!(percent_label(0.29), 29);
        assert_eq!(percent_label(0.1), 10);
    }

    #[test]
    fn test_mask_from_flags() {
        let grid = SpatialGrid::new(vec![0.0, 1.0], vec![0.0, 1.0]);
        let flags = arr2(&[[1.0, 0.0], [0.5, 1.0]]);
        let mask = Mask::from_flags(grid, flags.view()).unwrap();
        assert_eq!(mask.active_cells(), 2);
        assert!(mask.data()[[0, 0]]);
        assert!(!mask.data()[[1, 0]]);
    }
}
