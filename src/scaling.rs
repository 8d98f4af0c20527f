//! Per-feature min-max scaling fitted once on a reference dataset.

use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, Result};
use crate::history::HistoryTable;

/// Learned per-feature minimum and range (`max - min`).
///
/// Immutable after fitting and safe to share read-only across runs.
/// Columns with zero range scale to `0.0` and unscale to their minimum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    min: Vec<f64>,
    range: Vec<f64>,
}

impl MinMaxScaler {
    /// Fits on `rows`, all of equal width.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::EmptyScalerData`] for no rows, and
    /// [`ForecastError::FeatureSchemaMismatch`] for ragged rows.
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self> {
        let first = rows.first().ok_or(ForecastError::EmptyScalerData)?;
        let width = first.len();
        let mut min = first.clone();
        let mut max = first.clone();

        for row in rows {
            if row.len() != width {
                return Err(ForecastError::schema_mismatch(format!(
                    "scaler rows of width {} and {width}",
                    row.len()
                )));
            }
            for (j, &x) in row.iter().enumerate() {
                min[j] = min[j].min(x);
                max[j] = max[j].max(x);
            }
        }

        let range = min.iter().zip(&max).map(|(lo, hi)| hi - lo).collect();
        Ok(Self { min, range })
    }

    /// Builds a scaler from explicit parameters.
    ///
    /// # Panics
    ///
    /// Panics if `min` and `range` differ in length.
    pub fn from_parts(min: Vec<f64>, range: Vec<f64>) -> Self {
        assert_eq!(min.len(), range.len(), "min and range must be the same length");
        Self { min, range }
    }

    pub fn n_features(&self) -> usize {
        self.min.len()
    }

    pub fn min(&self) -> &[f64] {
        &self.min
    }

    pub fn range(&self) -> &[f64] {
        &self.range
    }

    /// Scales feature `index`.
    pub fn scale_value(&self, index: usize, x: f64) -> f64 {
        let r = self.range[index];
        if r == 0.0 { 0.0 } else { (x - self.min[index]) / r }
    }

    /// Inverse of [`MinMaxScaler::scale_value`].
    pub fn unscale_value(&self, index: usize, x: f64) -> f64 {
        x * self.range[index] + self.min[index]
    }

    /// # Errors
    ///
    /// Returns [`ForecastError::FeatureSchemaMismatch`] on width mismatch.
    pub fn scale(&self, row: &[f64]) -> Result<Vec<f64>> {
        self.check_width(row)?;
        Ok(row
            .iter()
            .enumerate()
            .map(|(j, &x)| self.scale_value(j, x))
            .collect())
    }

    /// # Errors
    ///
    /// Returns [`ForecastError::FeatureSchemaMismatch`] on width mismatch.
    pub fn unscale(&self, row: &[f64]) -> Result<Vec<f64>> {
        self.check_width(row)?;
        Ok(row
            .iter()
            .enumerate()
            .map(|(j, &x)| self.unscale_value(j, x))
            .collect())
    }

    fn check_width(&self, row: &[f64]) -> Result<()> {
        if row.len() != self.n_features() {
            return Err(ForecastError::schema_mismatch(format!(
                "row has {} values, scaler was fitted on {}",
                row.len(),
                self.n_features()
            )));
        }
        Ok(())
    }
}

/// Scaler bound to the index of the target feature.
///
/// Lets the driver unscale a single scalar prediction without
/// round-tripping a whole row.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalingAdapter {
    scaler: MinMaxScaler,
    target_index: usize,
}

impl ScalingAdapter {
    /// # Errors
    ///
    /// Returns [`ForecastError::FeatureSchemaMismatch`] if `target_index`
    /// is outside the scaler's features.
    pub fn new(scaler: MinMaxScaler, target_index: usize) -> Result<Self> {
        if target_index >= scaler.n_features() {
            return Err(ForecastError::schema_mismatch(format!(
                "target index {target_index} outside scaler with {} features",
                scaler.n_features()
            )));
        }
        Ok(Self {
            scaler,
            target_index,
        })
    }

    pub fn scaler(&self) -> &MinMaxScaler {
        &self.scaler
    }

    pub fn target_index(&self) -> usize {
        self.target_index
    }

    pub fn n_features(&self) -> usize {
        self.scaler.n_features()
    }

    /// See [`MinMaxScaler::scale`].
    pub fn scale(&self, row: &[f64]) -> Result<Vec<f64>> {
        self.scaler.scale(row)
    }

    /// See [`MinMaxScaler::unscale`].
    pub fn unscale(&self, row: &[f64]) -> Result<Vec<f64>> {
        self.scaler.unscale(row)
    }

    pub fn scale_target(&self, x: f64) -> f64 {
        self.scaler.scale_value(self.target_index, x)
    }

    pub fn unscale_target(&self, x: f64) -> f64 {
        self.scaler.unscale_value(self.target_index, x)
    }
}

/// Dataset the inference scaler is fitted on.
///
/// Fitting on the full history sees every value range the window can
/// contain, but differs from the training-split scaler the model itself
/// was fitted with. `TrainingSplit` reproduces the model-side scaler.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalerReference {
    #[default]
    FullHistory,
    TrainingSplit,
}

impl ScalerReference {
    /// Fits a target-aware scaler on the rows this reference selects.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::EmptyScalerData`] if the selection is empty.
    pub fn fit(self, history: &HistoryTable, train_split_ratio: f64) -> Result<ScalingAdapter> {
        let rows = match self {
            Self::FullHistory => history.rows(),
            Self::TrainingSplit => history.training_split(train_split_ratio),
        };
        ScalingAdapter::new(MinMaxScaler::fit(rows)?, history.schema().target_index())
    }
}
