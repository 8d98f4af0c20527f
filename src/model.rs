//! Trained sequence models consumed by the forecast driver.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{ForecastError, Result};

/// Failure reported by a model's inference call.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("window has {found} rows, model expects {expected}")]
    WindowLength { expected: usize, found: usize },
    #[error("window row has {found} features, model expects {expected}")]
    RowWidth { expected: usize, found: usize },
    /// Failure inside the model runtime itself (session, device, weights).
    #[error("{0}")]
    Backend(String),
}

/// A trained model mapping a scaled window to the next scaled target.
///
/// Implementations must not mutate shared state in [`SequenceModel::infer`]
/// so one instance can serve concurrent forecast runs.
pub trait SequenceModel: Send + Sync {
    /// Feature names, in the order the model was trained on.
    fn feature_names(&self) -> &[String];

    /// Number of rows the model reads per inference.
    fn window_size(&self) -> usize;

    /// Predicts the next scaled target value from `window` (oldest row first).
    fn infer(&self, window: &[Vec<f64>]) -> std::result::Result<f64, ModelError>;
}

fn check_shape(
    window: &[Vec<f64>],
    rows: usize,
    width: usize,
) -> std::result::Result<(), ModelError> {
    if window.len() != rows {
        return Err(ModelError::WindowLength {
            expected: rows,
            found: window.len(),
        });
    }
    if let Some(r) = window.iter().find(|r| r.len() != width) {
        return Err(ModelError::RowWidth {
            expected: width,
            found: r.len(),
        });
    }
    Ok(())
}

/// "Tomorrow is today" model: repeats the newest scaled target.
#[derive(Debug, Clone)]
pub struct PersistenceModel {
    features: Vec<String>,
    target_index: usize,
    window_size: usize,
}

impl PersistenceModel {
    /// # Panics
    ///
    /// Panics if `target_index` is outside `features` or `window_size` is zero.
    pub fn new(features: Vec<String>, target_index: usize, window_size: usize) -> Self {
        assert!(target_index < features.len(), "target_index out of range");
        assert!(window_size > 0, "window_size must be > 0");
        Self {
            features,
            target_index,
            window_size,
        }
    }
}

impl SequenceModel for PersistenceModel {
    fn feature_names(&self) -> &[String] {
        &self.features
    }

    fn window_size(&self) -> usize {
        self.window_size
    }

    fn infer(&self, window: &[Vec<f64>]) -> std::result::Result<f64, ModelError> {
        check_shape(window, self.window_size, self.features.len())?;
        Ok(window[window.len() - 1][self.target_index])
    }
}

/// Linear readout over every (lag, feature) cell of the window.
///
/// `weights` is row-major: lag 0 (oldest) first, features in schema order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinearWindowModel {
    pub window_size: usize,
    pub features: Vec<String>,
    pub bias: f64,
    pub weights: Vec<f64>,
}

impl LinearWindowModel {
    /// # Errors
    ///
    /// Returns [`ForecastError::FeatureSchemaMismatch`] if the weight count
    /// is not `window_size * features.len()`.
    pub fn new(window_size: usize, features: Vec<String>, bias: f64, weights: Vec<f64>) -> Result<Self> {
        let model = Self {
            window_size,
            features,
            bias,
            weights,
        };
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(ForecastError::schema_mismatch("model window_size must be > 0"));
        }
        let expected = self
            .window_size
            .checked_mul(self.features.len())
            .ok_or_else(|| {
                ForecastError::schema_mismatch(format!(
                    "model window {} x {} features overflows",
                    self.window_size,
                    self.features.len()
                ))
            })?;
        if self.weights.len() != expected {
            return Err(ForecastError::schema_mismatch(format!(
                "model has {} weights, window {} x {} features needs {expected}",
                self.weights.len(),
                self.window_size,
                self.features.len()
            )));
        }
        Ok(())
    }

    /// Parses and validates a model from TOML.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let model: Self = toml::from_str(s)?;
        model.validate()?;
        Ok(model)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        Self::from_toml_str(&fs::read_to_string(path)?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }
}

impl SequenceModel for LinearWindowModel {
    fn feature_names(&self) -> &[String] {
        &self.features
    }

    fn window_size(&self) -> usize {
        self.window_size
    }

    fn infer(&self, window: &[Vec<f64>]) -> std::result::Result<f64, ModelError> {
        check_shape(window, self.window_size, self.features.len())?;
        let dot: f64 = window
            .iter()
            .flatten()
            .zip(&self.weights)
            .map(|(x, w)| x * w)
            .sum();
        Ok(dot + self.bias)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        vec!["y".to_string(), "month_sin".to_string()]
    }

    #[test]
    fn persistence_repeats_newest_target() {
        let m = PersistenceModel::new(names(), 0, 2);
        let w = vec![vec![0.1, 0.0], vec![0.7, 0.5]];
        assert_eq!(m.infer(&w).unwrap(), 0.7);
    }

    #[test]
    fn shape_errors() {
        let m = PersistenceModel::new(names(), 0, 2);
        assert!(matches!(
            m.infer(&[vec![0.1, 0.0]]),
            Err(ModelError::WindowLength { .. })
        ));
        assert!(matches!(
            m.infer(&[vec![0.1], vec![0.2]]),
            Err(ModelError::RowWidth { .. })
        ));
    }

    #[test]
    fn linear_model_dot_product() {
        let m = LinearWindowModel::new(2, names(), 0.1, vec![0.5, 0.0, 0.5, 1.0]).unwrap();
        let w = vec![vec![0.2, 0.3], vec![0.4, 0.1]];
        // 0.5*0.2 + 0*0.3 + 0.5*0.4 + 1*0.1 + 0.1
        assert!((m.infer(&w).unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn linear_model_weight_count_checked() {
        assert!(LinearWindowModel::new(2, names(), 0.0, vec![1.0; 3]).is_err());
        assert!(LinearWindowModel::new(0, names(), 0.0, vec![]).is_err());
    }

    #[test]
    fn linear_model_toml_roundtrip() {
        let m = LinearWindowModel::new(1, names(), 0.25, vec![1.0, -0.5]).unwrap();
        let text = m.to_toml_string().unwrap();
        assert_eq!(LinearWindowModel::from_toml_str(&text).unwrap(), m);

        let bad = "window_size = 2\nfeatures = [\"y\"]\nbias = 0.0\nweights = [1.0]\n";
        assert!(LinearWindowModel::from_toml_str(bad).is_err());
    }

    #[test]
    fn oversized_window_in_toml_is_rejected() {
        let text = format!(
            "window_size = {}\nfeatures = [\"y\", \"month_sin\"]\nbias = 0.0\nweights = [1.0]\n",
            i64::MAX
        );
        assert!(matches!(
            LinearWindowModel::from_toml_str(&text),
            Err(ForecastError::FeatureSchemaMismatch { .. })
        ));
        assert!(LinearWindowModel::new(usize::MAX, names(), 0.0, vec![1.0]).is_err());
    }
}
