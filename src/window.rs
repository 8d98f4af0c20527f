//! Fixed-length buffer of the most recent scaled feature rows.

use crate::error::{ForecastError, Result};
use crate::scaling::ScalingAdapter;

/// Model input window: `size` scaled rows, oldest first.
///
/// Owned by a single forecast run and never shared.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowState {
    rows: Vec<Vec<f64>>,
    size: usize,
    n_features: usize,
}

impl WindowState {
    /// Scales the last `size` rows of `history` into a new window.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::InsufficientHistory`] if `history` has fewer
    /// than `size` rows, [`ForecastError::InvalidHistory`] for `size == 0`,
    /// and [`ForecastError::FeatureSchemaMismatch`] if a row does not match
    /// the scaler's width.
    pub fn initialize(history: &[Vec<f64>], size: usize, scaler: &ScalingAdapter) -> Result<Self> {
        if size == 0 {
            return Err(ForecastError::InvalidHistory(
                "window size must be > 0".into(),
            ));
        }
        let start = history
            .len()
            .checked_sub(size)
            .ok_or(ForecastError::InsufficientHistory {
                required: size,
                available: history.len(),
            })?;

        let rows = history[start..]
            .iter()
            .map(|r| scaler.scale(r))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            rows,
            size,
            n_features: scaler.n_features(),
        })
    }

    /// Drops the oldest row and appends `row` as the newest.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::FeatureSchemaMismatch`] if `row` has the
    /// wrong width; the window is left untouched.
    pub fn slide(&mut self, row: Vec<f64>) -> Result<()> {
        if row.len() != self.n_features {
            return Err(ForecastError::schema_mismatch(format!(
                "window rows have {} features, got {}",
                self.n_features,
                row.len()
            )));
        }
        self.rows.remove(0);
        self.rows.push(row);
        Ok(())
    }

    /// Read-only view, oldest row first.
    pub fn current(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn newest(&self) -> &[f64] {
        // size > 0 is enforced at construction
        &self.rows[self.rows.len() - 1]
    }
}
