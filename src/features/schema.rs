//! Ordered feature schema and the role of each column.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::cyclic::CYCLIC_COLUMNS;
use super::temporal::TEMPORAL_COLUMNS;
use crate::error::{ForecastError, Result};

/// How a schema column is produced for a date that is not in the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    /// The forecast target; filled with the unscaled prediction.
    Target,
    /// Integer calendar feature, recomputed from the date.
    Temporal,
    /// Sine/cosine calendar feature, recomputed from the date.
    Cyclic,
    /// Anything else; handled by [`CarryForwardPolicy`].
    Exogenous,
}

/// Treatment of exogenous columns when building future rows.
///
/// Carrying the last known value forward assumes the driver is
/// stationary over the horizon. Any slow-moving column that actually
/// trends will drift the forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CarryForwardPolicy {
    /// Keep the previous row's value.
    #[default]
    CarryForward,
    /// Refuse to forecast with exogenous columns in the schema.
    Reject,
}

impl fmt::Display for CarryForwardPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CarryForward => f.write_str("carry_forward"),
            Self::Reject => f.write_str("reject"),
        }
    }
}

/// Fixed, ordered list of feature names shared by training and inference.
///
/// The target is itself one of the columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSchema {
    names: Vec<String>,
    kinds: Vec<FeatureKind>,
    target_index: usize,
}

impl FeatureSchema {
    /// Builds a schema, classifying each column by name.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::InvalidSchema`] if `names` is empty, holds a
    /// duplicate, or does not contain `target`.
    pub fn new<S: AsRef<str>>(names: &[S], target: &str) -> Result<Self> {
        if names.is_empty() {
            return Err(ForecastError::InvalidSchema("no feature columns".into()));
        }
        let names: Vec<String> = names.iter().map(|n| n.as_ref().to_string()).collect();

        let mut seen = HashSet::with_capacity(names.len());
        for n in &names {
            if !seen.insert(n.as_str()) {
                return Err(ForecastError::InvalidSchema(format!(
                    "duplicate column `{n}`"
                )));
            }
        }

        let target_index = names.iter().position(|n| n == target).ok_or_else(|| {
            ForecastError::InvalidSchema(format!("target `{target}` is not a schema column"))
        })?;

        let kinds = names
            .iter()
            .enumerate()
            .map(|(i, n)| classify(n, i == target_index))
            .collect();

        Ok(Self {
            names,
            kinds,
            target_index,
        })
    }

    /// Default daily-demand schema: target, integer calendar columns, cyclic pairs.
    pub fn daily_default(target: &str) -> Self {
        let mut names = vec![target.to_string()];
        names.extend(
            ["year", "month", "dayofyear", "weekday", "weekofyear"]
                .iter()
                .map(|s| s.to_string()),
        );
        names.extend(CYCLIC_COLUMNS.iter().map(|s| s.to_string()));
        let kinds = names
            .iter()
            .enumerate()
            .map(|(i, n)| classify(n, i == 0))
            .collect();
        Self {
            names,
            kinds,
            target_index: 0,
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn target_index(&self) -> usize {
        self.target_index
    }

    pub fn target_name(&self) -> &str {
        &self.names[self.target_index]
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn kind(&self, index: usize) -> FeatureKind {
        self.kinds[index]
    }

    pub fn kinds(&self) -> &[FeatureKind] {
        &self.kinds
    }

    /// Names of columns that are neither target nor calendar-derived.
    pub fn exogenous_columns(&self) -> Vec<&str> {
        self.names
            .iter()
            .zip(&self.kinds)
            .filter(|(_, k)| **k == FeatureKind::Exogenous)
            .map(|(n, _)| n.as_str())
            .collect()
    }

    /// Checks that `names` is exactly this schema, same order.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::FeatureSchemaMismatch`] naming the first
    /// differing position.
    pub fn ensure_matches<S: AsRef<str>>(&self, names: &[S]) -> Result<()> {
        if names.len() != self.names.len() {
            return Err(ForecastError::schema_mismatch(format!(
                "expected {} features, got {}",
                self.names.len(),
                names.len()
            )));
        }
        for (i, (expected, found)) in self.names.iter().zip(names).enumerate() {
            if expected != found.as_ref() {
                return Err(ForecastError::schema_mismatch(format!(
                    "position {i}: expected `{expected}`, got `{}`",
                    found.as_ref()
                )));
            }
        }
        Ok(())
    }
}

fn classify(name: &str, is_target: bool) -> FeatureKind {
    if is_target {
        FeatureKind::Target
    } else if TEMPORAL_COLUMNS.contains(&name) {
        FeatureKind::Temporal
    } else if CYCLIC_COLUMNS.contains(&name) {
        FeatureKind::Cyclic
    } else {
        FeatureKind::Exogenous
    }
}
