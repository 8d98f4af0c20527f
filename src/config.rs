//! TOML-based run configuration and preset definitions.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::features::{CarryForwardPolicy, FeatureSchema};
use crate::history::DATE_FORMAT;
use crate::io::export::SeriesLabels;
use crate::scaling::ScalerReference;
use crate::sim::economics::DieselEconomics;
use crate::sim::scenarios::{ScenarioParams, SolarScenario};
use crate::synthetic::SyntheticParams;

/// Top-level configuration parsed from TOML.
///
/// All fields have defaults matching the baseline run. Load from TOML
/// with [`AppConfig::from_toml_file`] or use [`AppConfig::baseline`].
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Input and output locations.
    #[serde(default)]
    pub data: DataConfig,
    /// Feature schema and target.
    #[serde(default)]
    pub features: FeaturesConfig,
    /// Sequence model and scaler.
    #[serde(default)]
    pub model: ModelConfig,
    /// Forecast horizon.
    #[serde(default)]
    pub prediction: PredictionConfig,
    /// Site irradiation and candidate capacities.
    #[serde(default)]
    pub solar: SolarConfig,
    /// Diesel conversion and price factors.
    #[serde(default)]
    pub economic: EconomicConfig,
    /// Labels written in the combined table.
    #[serde(default)]
    pub labels: LabelsConfig,
    /// Built-in history used when no history file is given.
    #[serde(default)]
    pub synthetic: SyntheticConfig,
}

/// Input and output locations.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataConfig {
    /// Cleaned daily history CSV; synthetic history is used when absent.
    pub history_path: Option<String>,
    /// Combined historical + forecast CSV.
    pub output_path: Option<String>,
    /// Scenario summary CSV.
    pub scenarios_output_path: Option<String>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            history_path: None,
            output_path: None,
            scenarios_output_path: None,
        }
    }
}

/// Feature schema and target.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeaturesConfig {
    /// Target column name.
    pub target: String,
    /// Ordered schema columns, target included. When absent, the daily
    /// default schema is built around `target`.
    pub columns: Option<Vec<String>>,
    /// Treatment of columns that cannot be derived for future dates.
    pub carry_forward: CarryForwardPolicy,
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            target: "demand_kwh".to_string(),
            columns: None,
            carry_forward: CarryForwardPolicy::CarryForward,
        }
    }
}

/// Sequence model and scaler.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    /// Model type: `"persistence"` or `"linear"`.
    pub kind: String,
    /// TOML weights file, required for `"linear"`.
    pub path: Option<String>,
    /// Rows per model input window (must be > 0).
    pub window_size: usize,
    /// Rows the inference scaler is fitted on.
    pub scaler_reference: ScalerReference,
    /// Leading share of history used by `training_split` (0.0–1.0].
    pub train_split_ratio: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            kind: "persistence".to_string(),
            path: None,
            window_size: 7,
            scaler_reference: ScalerReference::FullHistory,
            train_split_ratio: 0.8,
        }
    }
}

/// Forecast horizon.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PredictionConfig {
    /// Days to forecast (>= 0).
    pub horizon: i64,
    /// Horizons offered to dashboard consumers.
    pub horizons: Vec<i64>,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            horizon: 30,
            horizons: vec![7, 15, 30],
        }
    }
}

/// Site irradiation and candidate capacities.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolarConfig {
    /// Mean daily irradiation (kWh/m²/day).
    pub h_radiation: f64,
    /// PV performance ratio (0.0–1.0].
    pub performance_ratio: f64,
    /// Candidate PV capacities.
    pub scenarios: Vec<SolarScenario>,
}

impl Default for SolarConfig {
    fn default() -> Self {
        Self {
            h_radiation: 4.5,
            performance_ratio: 0.80,
            scenarios: vec![
                SolarScenario::new("small", 100.0),
                SolarScenario::new("medium", 250.0),
                SolarScenario::new("large", 500.0),
            ],
        }
    }
}

/// Diesel conversion and price factors.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EconomicConfig {
    /// Electrical output per litre of diesel (kWh/L).
    pub kwh_per_liter_diesel: f64,
    /// CO2 per litre burned (kg/L).
    pub co2_kg_per_liter: f64,
    /// Diesel price per litre.
    pub diesel_price_per_liter: f64,
}

impl Default for EconomicConfig {
    fn default() -> Self {
        Self {
            kwh_per_liter_diesel: 3.0,
            co2_kg_per_liter: 2.20,
            diesel_price_per_liter: 2553.59,
        }
    }
}

/// Labels written in the combined table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LabelsConfig {
    pub historical: String,
    pub forecast: String,
}

impl Default for LabelsConfig {
    fn default() -> Self {
        let d = SeriesLabels::default();
        Self {
            historical: d.historical,
            forecast: d.forecast,
        }
    }
}

/// Built-in history used when no history file is given.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyntheticConfig {
    /// First day, `YYYY-MM-DD`.
    pub start: String,
    /// Number of days (must cover the model window).
    pub days: usize,
    /// Mean daily demand (kWh).
    pub base_kwh: f64,
    /// Yearly sinusoid amplitude (kWh).
    pub seasonal_amp_kwh: f64,
    /// Weekend demand multiplier.
    pub weekend_factor: f64,
    /// Gaussian noise standard deviation (kWh).
    pub noise_std: f64,
    /// Random seed.
    pub seed: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            start: "2023-01-01".to_string(),
            days: 730,
            base_kwh: 950.0,
            seasonal_amp_kwh: 120.0,
            weekend_factor: 0.85,
            noise_std: 30.0,
            seed: 42,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"model.window_size"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl AppConfig {
    /// Returns the baseline configuration.
    pub fn baseline() -> Self {
        Self {
            data: DataConfig::default(),
            features: FeaturesConfig::default(),
            model: ModelConfig::default(),
            prediction: PredictionConfig::default(),
            solar: SolarConfig::default(),
            economic: EconomicConfig::default(),
            labels: LabelsConfig::default(),
            synthetic: SyntheticConfig::default(),
        }
    }

    /// Returns the weekly preset: one-week horizon, short window.
    pub fn weekly() -> Self {
        Self {
            model: ModelConfig {
                window_size: 5,
                ..ModelConfig::default()
            },
            prediction: PredictionConfig {
                horizon: 7,
                ..PredictionConfig::default()
            },
            ..Self::baseline()
        }
    }

    /// Returns the monthly preset: 30-day horizon, two-week window, larger arrays.
    pub fn monthly() -> Self {
        Self {
            model: ModelConfig {
                window_size: 14,
                ..ModelConfig::default()
            },
            prediction: PredictionConfig {
                horizon: 30,
                ..PredictionConfig::default()
            },
            solar: SolarConfig {
                scenarios: vec![
                    SolarScenario::new("medium", 250.0),
                    SolarScenario::new("large", 500.0),
                    SolarScenario::new("utility", 1000.0),
                ],
                ..SolarConfig::default()
            },
            ..Self::baseline()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "weekly", "monthly"];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "weekly" => Ok(Self::weekly()),
            "monthly" => Ok(Self::monthly()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("config", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Builds the feature schema from `[features]`.
    ///
    /// Without explicit `columns`, the daily default schema is built around
    /// the configured target.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` on `features.columns` if the list is empty,
    /// has duplicates, or lacks the target, and on `features.target` if the
    /// default schema is requested with an empty target.
    pub fn schema(&self) -> Result<FeatureSchema, ConfigError> {
        let target = &self.features.target;
        match self.features.columns {
            Some(ref columns) => FeatureSchema::new(columns.as_slice(), target)
                .map_err(|e| ConfigError::new("features.columns", e.to_string())),
            None if target.is_empty() => {
                Err(ConfigError::new("features.target", "must not be empty"))
            }
            None => Ok(FeatureSchema::daily_default(target)),
        }
    }

    /// Irradiation and diesel factors for scenario evaluation.
    pub fn scenario_params(&self) -> ScenarioParams {
        ScenarioParams {
            h_radiation: self.solar.h_radiation,
            performance_ratio: self.solar.performance_ratio,
            economics: DieselEconomics {
                kwh_per_liter: self.economic.kwh_per_liter_diesel,
                co2_kg_per_liter: self.economic.co2_kg_per_liter,
                price_per_liter: self.economic.diesel_price_per_liter,
            },
        }
    }

    /// Parameters for the built-in synthetic history.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if `synthetic.start` is not `YYYY-MM-DD`.
    pub fn synthetic_params(&self) -> Result<SyntheticParams, ConfigError> {
        let s = &self.synthetic;
        let start = NaiveDate::parse_from_str(&s.start, DATE_FORMAT).map_err(|e| {
            ConfigError::new("synthetic.start", format!("\"{}\" is not YYYY-MM-DD: {e}", s.start))
        })?;
        Ok(SyntheticParams {
            start,
            days: s.days,
            base_kwh: s.base_kwh,
            seasonal_amp_kwh: s.seasonal_amp_kwh,
            weekend_factor: s.weekend_factor,
            noise_std: s.noise_std,
            seed: s.seed,
        })
    }

    pub fn labels(&self) -> SeriesLabels {
        SeriesLabels {
            historical: self.labels.historical.clone(),
            forecast: self.labels.forecast.clone(),
        }
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if let Err(e) = self.schema() {
            errors.push(e);
        }

        let m = &self.model;
        if m.window_size == 0 {
            errors.push(ConfigError::new("model.window_size", "must be > 0"));
        }
        match m.kind.as_str() {
            "persistence" => {}
            "linear" => {
                if m.path.is_none() {
                    errors.push(ConfigError::new(
                        "model.path",
                        "required when model.kind is \"linear\"",
                    ));
                }
            }
            other => errors.push(ConfigError::new(
                "model.kind",
                format!("must be \"persistence\" or \"linear\", got \"{other}\""),
            )),
        }
        if !(m.train_split_ratio > 0.0 && m.train_split_ratio <= 1.0) {
            errors.push(ConfigError::new("model.train_split_ratio", "must be in (0.0, 1.0]"));
        }

        let p = &self.prediction;
        if p.horizon < 0 {
            errors.push(ConfigError::new("prediction.horizon", "must be >= 0"));
        }
        if p.horizons.iter().any(|h| *h <= 0) {
            errors.push(ConfigError::new("prediction.horizons", "every horizon must be > 0"));
        }

        let sol = &self.solar;
        if sol.h_radiation <= 0.0 {
            errors.push(ConfigError::new("solar.h_radiation", "must be > 0"));
        }
        if !(sol.performance_ratio > 0.0 && sol.performance_ratio <= 1.0) {
            errors.push(ConfigError::new("solar.performance_ratio", "must be in (0.0, 1.0]"));
        }
        let mut names = HashSet::new();
        for s in &sol.scenarios {
            if !names.insert(s.name.as_str()) {
                errors.push(ConfigError::new(
                    "solar.scenarios",
                    format!("duplicate scenario name \"{}\"", s.name),
                ));
            }
            if s.capacity_kw < 0.0 {
                errors.push(ConfigError::new(
                    "solar.scenarios",
                    format!("capacity of \"{}\" must be >= 0", s.name),
                ));
            }
        }

        if self.economic.kwh_per_liter_diesel <= 0.0 {
            errors.push(ConfigError::new("economic.kwh_per_liter_diesel", "must be > 0"));
        }

        if self.data.history_path.is_none() {
            if let Err(e) = self.synthetic_params() {
                errors.push(e);
            }
            if self.synthetic.days < m.window_size {
                errors.push(ConfigError::new(
                    "synthetic.days",
                    "must be >= model.window_size",
                ));
            }
        }

        errors
    }
}
