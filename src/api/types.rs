//! API response and query types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::forecast::ForecastPoint;

/// Run overview returned by `/summary`.
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    /// Name of the forecast column.
    pub target_column: String,
    /// Number of observed days.
    pub history_days: usize,
    pub last_history_date: Option<NaiveDate>,
    /// Number of forecast days.
    pub forecast_days: usize,
    pub first_forecast_date: Option<NaiveDate>,
    /// Sum of forecast values over the whole horizon.
    pub forecast_total: f64,
    /// Horizons offered to dashboard consumers.
    pub horizons: Vec<i64>,
}

/// One dated target value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyValue {
    pub date: NaiveDate,
    pub value: f64,
}

impl From<&ForecastPoint> for DailyValue {
    fn from(p: &ForecastPoint) -> Self {
        Self {
            date: p.date,
            value: p.value,
        }
    }
}

/// Optional filters for `/history` and `/forecast`.
#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    /// First date (inclusive).
    pub from: Option<NaiveDate>,
    /// Last date (inclusive).
    pub to: Option<NaiveDate>,
    /// Limit to this many days: the first ones for `/forecast`, the most
    /// recent ones for `/history`.
    pub days: Option<usize>,
}

impl RangeQuery {
    /// Whether `date` lies in `[from, to]`; open bounds always match.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|f| date >= f) && self.to.is_none_or(|t| date <= t)
    }
}

/// Error response body for 400-class errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    #[test]
    fn open_range_contains_everything() {
        let q = RangeQuery {
            from: None,
            to: None,
            days: None,
        };
        assert!(q.contains(d(1, 1)));
        assert!(q.contains(d(12, 31)));
    }

    #[test]
    fn bounds_are_inclusive() {
        let q = RangeQuery {
            from: Some(d(3, 1)),
            to: Some(d(3, 5)),
            days: None,
        };
        assert!(q.contains(d(3, 1)));
        assert!(q.contains(d(3, 5)));
        assert!(!q.contains(d(2, 29)));
        assert!(!q.contains(d(3, 6)));
    }
}
