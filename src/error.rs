//! Error types shared by the forecasting core.

use chrono::NaiveDate;
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Failures that abort a forecast run or the loading of its inputs.
///
/// Every variant is unrecoverable for the current run: the driver never
/// retries and never returns a partial horizon.
#[derive(Debug, Error)]
pub enum ForecastError {
    /// History is shorter than the model window.
    #[error("insufficient history: window needs {required} rows, history has {available}")]
    InsufficientHistory { required: usize, available: usize },

    /// Feature list or window shape disagrees with what the model was trained on.
    #[error("feature schema mismatch: {detail}")]
    FeatureSchemaMismatch { detail: String },

    /// Model call failed or produced a non-finite value.
    #[error("inference failed at step {step}: {reason}")]
    Inference { step: usize, reason: String },

    /// Requested horizon is negative.
    #[error("invalid horizon {0}: must be >= 0")]
    InvalidHorizon(i64),

    /// Schema itself is malformed (empty, duplicate names, missing target).
    #[error("invalid feature schema: {0}")]
    InvalidSchema(String),

    /// History table is structurally invalid.
    #[error("invalid history: {0}")]
    InvalidHistory(String),

    /// A value inside the initial window is NaN or infinite.
    #[error("non-finite value for `{feature}` on {date}")]
    NonFiniteHistory { date: NaiveDate, feature: String },

    /// Scaler fitted on no rows.
    #[error("cannot fit scaler on an empty dataset")]
    EmptyScalerData,

    /// Forecast points are not one calendar day apart from the anchor date.
    #[error("forecast point {index} dated {found}, expected {expected}")]
    NonContiguousForecast {
        index: usize,
        expected: NaiveDate,
        found: NaiveDate,
    },

    /// Run stopped through its cancel token between two steps.
    #[error("forecast cancelled after {completed} of {horizon} steps")]
    Cancelled { completed: usize, horizon: usize },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("toml parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("toml serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

impl ForecastError {
    pub(crate) fn schema_mismatch(detail: impl Into<String>) -> Self {
        Self::FeatureSchemaMismatch {
            detail: detail.into(),
        }
    }
}
