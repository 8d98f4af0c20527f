//! Chronological table of daily feature rows.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use chrono::NaiveDate;

use crate::error::{ForecastError, Result};
use crate::features::FeatureSchema;

/// Date format used in every CSV the crate reads or writes.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Cleaned historical data: one unscaled, schema-ordered row per day.
///
/// Dates are strictly increasing. Gaps are allowed here; the forecast
/// starts the day after [`HistoryTable::last_date`] regardless.
#[derive(Debug, Clone)]
pub struct HistoryTable {
    schema: FeatureSchema,
    dates: Vec<NaiveDate>,
    rows: Vec<Vec<f64>>,
}

impl HistoryTable {
    /// # Errors
    ///
    /// Returns [`ForecastError::InvalidHistory`] for ragged rows, a
    /// date/row count mismatch, or dates that are not strictly increasing.
    pub fn new(schema: FeatureSchema, dates: Vec<NaiveDate>, rows: Vec<Vec<f64>>) -> Result<Self> {
        if dates.len() != rows.len() {
            return Err(ForecastError::InvalidHistory(format!(
                "{} dates but {} rows",
                dates.len(),
                rows.len()
            )));
        }
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != schema.len()) {
            return Err(ForecastError::InvalidHistory(format!(
                "row {i} ({}) has {} values, schema has {}",
                dates[i],
                row.len(),
                schema.len()
            )));
        }
        if let Some(w) = dates.windows(2).find(|w| w[1] <= w[0]) {
            return Err(ForecastError::InvalidHistory(format!(
                "dates must be strictly increasing: {} followed by {}",
                w[0], w[1]
            )));
        }
        Ok(Self {
            schema,
            dates,
            rows,
        })
    }

    /// Reads a CSV with a leading `date` column followed by the schema columns.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::FeatureSchemaMismatch`] if the header does not
    /// list exactly the schema columns in order, and
    /// [`ForecastError::InvalidHistory`] for unparseable cells.
    pub fn from_csv_reader<R: Read>(schema: FeatureSchema, reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let headers = rdr.headers()?.clone();

        let mut columns = headers.iter();
        match columns.next() {
            Some("date") => {}
            other => {
                return Err(ForecastError::schema_mismatch(format!(
                    "first CSV column must be `date`, got `{}`",
                    other.unwrap_or("")
                )));
            }
        }
        let feature_cols: Vec<&str> = columns.collect();
        schema.ensure_matches(&feature_cols)?;

        let mut dates = Vec::new();
        let mut rows = Vec::new();
        for (line, record) in rdr.records().enumerate() {
            let record = record?;
            let raw_date = record.get(0).unwrap_or_default();
            let date = NaiveDate::parse_from_str(raw_date, DATE_FORMAT).map_err(|e| {
                ForecastError::InvalidHistory(format!("record {}: bad date `{raw_date}`: {e}", line + 1))
            })?;
            let row = record
                .iter()
                .skip(1)
                .zip(schema.names())
                .map(|(cell, name)| {
                    cell.parse::<f64>().map_err(|e| {
                        ForecastError::InvalidHistory(format!(
                            "record {} column `{name}`: `{cell}`: {e}",
                            line + 1
                        ))
                    })
                })
                .collect::<Result<Vec<f64>>>()?;
            dates.push(date);
            rows.push(row);
        }

        Self::new(schema, dates, rows)
    }

    /// Reads a history CSV from disk.
    ///
    /// # Errors
    ///
    /// See [`HistoryTable::from_csv_reader`]; I/O failures map to
    /// [`ForecastError::Io`].
    pub fn from_csv_path(schema: FeatureSchema, path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_csv_reader(schema, io::BufReader::new(file))
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Last `n` dates and rows, or `None` if the table is shorter than `n`.
    pub fn tail(&self, n: usize) -> Option<(&[NaiveDate], &[Vec<f64>])> {
        let start = self.rows.len().checked_sub(n)?;
        Some((&self.dates[start..], &self.rows[start..]))
    }

    /// Target column in date order.
    pub fn target_values(&self) -> Vec<f64> {
        let idx = self.schema.target_index();
        self.rows.iter().map(|r| r[idx]).collect()
    }

    /// Leading share of rows, as used for fitting on a training split.
    ///
    /// `ratio` is clamped to `[0, 1]`; the split index is floored.
    pub fn training_split(&self, ratio: f64) -> &[Vec<f64>] {
        let n = (self.rows.len() as f64 * ratio.clamp(0.0, 1.0)).floor() as usize;
        &self.rows[..n]
    }
}
