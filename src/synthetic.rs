//! Seeded synthetic daily demand history.

use std::collections::HashMap;
use std::f64::consts::PI;

use chrono::{Datelike, NaiveDate};
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::error::{ForecastError, Result};
use crate::features::{FeatureSchema, build_feature_table};
use crate::history::HistoryTable;

/// Shape of the generated demand curve.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticParams {
    /// First generated day.
    pub start: NaiveDate,
    /// Number of days.
    pub days: usize,
    /// Mean daily demand (kWh).
    pub base_kwh: f64,
    /// Amplitude of the yearly sinusoid (kWh).
    pub seasonal_amp_kwh: f64,
    /// Multiplier applied on Saturdays and Sundays.
    pub weekend_factor: f64,
    /// Gaussian noise standard deviation (kWh).
    pub noise_std: f64,
    pub seed: u64,
}

/// Box-Muller Gaussian sample with mean 0.
fn gaussian_noise(rng: &mut StdRng, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }
    let u1: f64 = rng.random::<f64>().clamp(1e-12, 1.0);
    let u2: f64 = rng.random::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos() * std_dev
}

/// Daily demand values for `params`, never negative.
pub fn synthetic_demand(params: &SyntheticParams) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(params.seed);
    params
        .start
        .iter_days()
        .take(params.days)
        .map(|d| {
            let season = (2.0 * PI * f64::from(d.ordinal()) / 365.0).sin();
            let weekday = d.weekday().num_days_from_monday();
            let factor = if weekday >= 5 { params.weekend_factor } else { 1.0 };
            let kwh = (params.base_kwh + params.seasonal_amp_kwh * season) * factor
                + gaussian_noise(&mut rng, params.noise_std);
            kwh.max(0.0)
        })
        .collect()
}

/// Generates a feature-complete history for `schema`.
///
/// # Errors
///
/// Returns [`ForecastError::InvalidHistory`] if `schema` has exogenous
/// columns (they cannot be synthesized) or `params.days` is zero.
pub fn synthetic_history(params: &SyntheticParams, schema: &FeatureSchema) -> Result<HistoryTable> {
    if params.days == 0 {
        return Err(ForecastError::InvalidHistory(
            "synthetic history needs at least one day".into(),
        ));
    }
    let dates: Vec<NaiveDate> = params.start.iter_days().take(params.days).collect();
    let demand = synthetic_demand(params);
    build_feature_table(schema, &dates, &demand, &HashMap::new())
}
