//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;

use chrono::NaiveDate;
use offgrid_forecast::features::{FeatureSchema, build_feature_table};
use offgrid_forecast::history::HistoryTable;
use offgrid_forecast::model::{ModelError, PersistenceModel, SequenceModel};
use offgrid_forecast::scaling::{ScalerReference, ScalingAdapter};
use offgrid_forecast::synthetic::{SyntheticParams, synthetic_history};

/// Default 14-column daily schema with target `demand_kwh`.
pub fn daily_schema() -> FeatureSchema {
    FeatureSchema::daily_default("demand_kwh")
}

/// Synthetic parameters: one year from 2023-01-01, 950 kWh base, seed 42.
pub fn default_params() -> SyntheticParams {
    SyntheticParams {
        start: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        days: 365,
        base_kwh: 950.0,
        seasonal_amp_kwh: 120.0,
        weekend_factor: 0.85,
        noise_std: 30.0,
        seed: 42,
    }
}

/// Synthetic year of history on the default schema.
pub fn default_history() -> HistoryTable {
    synthetic_history(&default_params(), &daily_schema()).unwrap()
}

/// History on `schema` with target values `target`, one day apart from `start`.
pub fn history_from_values(schema: &FeatureSchema, start: NaiveDate, target: &[f64]) -> HistoryTable {
    let dates: Vec<NaiveDate> = start.iter_days().take(target.len()).collect();
    build_feature_table(schema, &dates, target, &HashMap::new()).unwrap()
}

/// Scaler fitted on the full history.
pub fn full_history_scaler(history: &HistoryTable) -> ScalingAdapter {
    ScalerReference::FullHistory.fit(history, 0.8).unwrap()
}

/// Persistence model over `schema` with window `window_size`.
pub fn persistence_model(schema: &FeatureSchema, window_size: usize) -> PersistenceModel {
    PersistenceModel::new(schema.names().to_vec(), schema.target_index(), window_size)
}

/// Model that always predicts the same scaled value.
pub struct FixedModel {
    pub features: Vec<String>,
    pub window_size: usize,
    pub scaled: f64,
}

impl SequenceModel for FixedModel {
    fn feature_names(&self) -> &[String] {
        &self.features
    }

    fn window_size(&self) -> usize {
        self.window_size
    }

    fn infer(&self, _window: &[Vec<f64>]) -> Result<f64, ModelError> {
        Ok(self.scaled)
    }
}
