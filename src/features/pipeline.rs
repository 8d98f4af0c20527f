//! Derives the full historical feature table from a daily target series.

use std::collections::HashMap;

use chrono::NaiveDate;

use super::cyclic::CyclicFeatures;
use super::schema::{FeatureKind, FeatureSchema};
use super::temporal::TemporalFeatures;
use crate::error::{ForecastError, Result};
use crate::history::HistoryTable;

/// Builds a [`HistoryTable`] for `schema` from dates and target values.
///
/// Calendar columns are derived from each date. Every exogenous column in
/// the schema must be present in `exogenous`, one value per date.
///
/// # Errors
///
/// Returns [`ForecastError::InvalidHistory`] on length mismatches or a
/// missing exogenous column, and whatever [`HistoryTable::new`] rejects.
pub fn build_feature_table(
    schema: &FeatureSchema,
    dates: &[NaiveDate],
    target: &[f64],
    exogenous: &HashMap<String, Vec<f64>>,
) -> Result<HistoryTable> {
    if dates.len() != target.len() {
        return Err(ForecastError::InvalidHistory(format!(
            "{} dates but {} target values",
            dates.len(),
            target.len()
        )));
    }
    for name in schema.exogenous_columns() {
        match exogenous.get(name) {
            Some(col) if col.len() == dates.len() => {}
            Some(col) => {
                return Err(ForecastError::InvalidHistory(format!(
                    "column `{name}` has {} values for {} dates",
                    col.len(),
                    dates.len()
                )));
            }
            None => {
                return Err(ForecastError::InvalidHistory(format!(
                    "exogenous column `{name}` not supplied"
                )));
            }
        }
    }

    let mut rows = Vec::with_capacity(dates.len());
    for (t, &date) in dates.iter().enumerate() {
        let temporal = TemporalFeatures::from_date(date);
        let cyclic = CyclicFeatures::from_date(date);
        let row = schema
            .names()
            .iter()
            .enumerate()
            .map(|(i, name)| match schema.kind(i) {
                FeatureKind::Target => target[t],
                FeatureKind::Temporal => temporal.get(name).unwrap_or(f64::NAN),
                FeatureKind::Cyclic => cyclic.get(name).unwrap_or(f64::NAN),
                FeatureKind::Exogenous => exogenous.get(name).map_or(f64::NAN, |c| c[t]),
            })
            .collect();
        rows.push(row);
    }

    HistoryTable::new(schema.clone(), dates.to_vec(), rows)
}
