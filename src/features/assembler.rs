//! Builds the unscaled feature row for a future date.

use chrono::NaiveDate;

use super::cyclic::CyclicFeatures;
use super::schema::{CarryForwardPolicy, FeatureKind, FeatureSchema};
use super::temporal::TemporalFeatures;
use crate::error::{ForecastError, Result};

/// Produces feature rows for dates that do not exist in the dataset.
///
/// Starts from the previous unscaled row and overwrites every column the
/// date or the prediction determines. Exogenous columns follow the
/// configured [`CarryForwardPolicy`].
#[derive(Debug, Clone)]
pub struct FeatureAssembler<'a> {
    schema: &'a FeatureSchema,
    policy: CarryForwardPolicy,
}

impl<'a> FeatureAssembler<'a> {
    /// # Errors
    ///
    /// With [`CarryForwardPolicy::Reject`], returns
    /// [`ForecastError::FeatureSchemaMismatch`] when the schema holds any
    /// exogenous column.
    pub fn new(schema: &'a FeatureSchema, policy: CarryForwardPolicy) -> Result<Self> {
        if policy == CarryForwardPolicy::Reject {
            let exogenous = schema.exogenous_columns();
            if !exogenous.is_empty() {
                return Err(ForecastError::schema_mismatch(format!(
                    "columns [{}] cannot be derived for future dates and carry-forward is disabled",
                    exogenous.join(", ")
                )));
            }
        }
        Ok(Self { schema, policy })
    }

    pub fn policy(&self) -> CarryForwardPolicy {
        self.policy
    }

    /// Assembles the row for `date` with `target_value` in the target slot.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::FeatureSchemaMismatch`] if `template` is
    /// not schema-wide.
    pub fn assemble(&self, date: NaiveDate, template: &[f64], target_value: f64) -> Result<Vec<f64>> {
        if template.len() != self.schema.len() {
            return Err(ForecastError::schema_mismatch(format!(
                "template row has {} values, schema has {}",
                template.len(),
                self.schema.len()
            )));
        }

        let temporal = TemporalFeatures::from_date(date);
        let cyclic = CyclicFeatures::from_date(date);

        let mut row = template.to_vec();
        for (i, (name, slot)) in self.schema.names().iter().zip(row.iter_mut()).enumerate() {
            match self.schema.kind(i) {
                FeatureKind::Target => *slot = target_value,
                FeatureKind::Temporal => {
                    if let Some(v) = temporal.get(name) {
                        *slot = v;
                    }
                }
                FeatureKind::Cyclic => {
                    if let Some(v) = cyclic.get(name) {
                        *slot = v;
                    }
                }
                FeatureKind::Exogenous => {}
            }
        }
        Ok(row)
    }
}
