//! Dated forecast output.

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::error::{ForecastError, Result};

/// One forecast day with its unscaled target value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Contiguous daily forecast starting the day after the last historical date.
///
/// Dates increase by exactly one day per point; construction enforces it.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ForecastSeries {
    points: Vec<ForecastPoint>,
}

impl ForecastSeries {
    /// Wraps `points` after checking they run day by day from `anchor + 1`.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::NonContiguousForecast`] at the first gap,
    /// duplicate, or out-of-order date.
    pub fn from_points(anchor: NaiveDate, points: Vec<ForecastPoint>) -> Result<Self> {
        let mut expected = anchor;
        for (index, p) in points.iter().enumerate() {
            expected = expected
                .checked_add_days(Days::new(1))
                .ok_or_else(|| ForecastError::NonContiguousForecast {
                    index,
                    expected,
                    found: p.date,
                })?;
            if p.date != expected {
                return Err(ForecastError::NonContiguousForecast {
                    index,
                    expected,
                    found: p.date,
                });
            }
        }
        Ok(Self { points })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ForecastPoint> {
        self.points.iter()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Value forecast for `date`, if within the horizon.
    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        let first = self.first_date()?;
        let offset = usize::try_from((date - first).num_days()).ok()?;
        self.points.get(offset).map(|p| p.value)
    }

    /// First `days` points (all of them if shorter).
    pub fn head(&self, days: usize) -> &[ForecastPoint] {
        &self.points[..days.min(self.points.len())]
    }

    /// Points dated within `[from, to]`.
    pub fn range(&self, from: NaiveDate, to: NaiveDate) -> &[ForecastPoint] {
        let start = self.points.partition_point(|p| p.date < from);
        let end = self.points.partition_point(|p| p.date <= to);
        if start >= end {
            return &[];
        }
        &self.points[start..end]
    }

    /// Sum of all forecast values.
    pub fn total(&self) -> f64 {
        self.points.iter().map(|p| p.value).sum()
    }

    pub fn into_points(self) -> Vec<ForecastPoint> {
        self.points
    }
}

impl<'a> IntoIterator for &'a ForecastSeries {
    type Item = &'a ForecastPoint;
    type IntoIter = std::slice::Iter<'a, ForecastPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    fn series() -> ForecastSeries {
        let points = vec![
            ForecastPoint { date: d(2, 28), value: 1.0 },
            ForecastPoint { date: d(2, 29), value: 2.0 },
            ForecastPoint { date: d(3, 1), value: 3.0 },
        ];
        ForecastSeries::from_points(d(2, 27), points).unwrap()
    }

    #[test]
    fn accepts_contiguous_across_leap_day() {
        let s = series();
        assert_eq!(s.len(), 3);
        assert_eq!(s.first_date(), Some(d(2, 28)));
        assert_eq!(s.last_date(), Some(d(3, 1)));
        assert_eq!(s.total(), 6.0);
    }

    #[test]
    fn rejects_gap_and_wrong_start() {
        let gap = vec![
            ForecastPoint { date: d(1, 2), value: 1.0 },
            ForecastPoint { date: d(1, 4), value: 1.0 },
        ];
        let err = ForecastSeries::from_points(d(1, 1), gap).unwrap_err();
        assert!(matches!(err, ForecastError::NonContiguousForecast { index: 1, .. }));

        let late = vec![ForecastPoint { date: d(1, 3), value: 1.0 }];
        assert!(ForecastSeries::from_points(d(1, 1), late).is_err());
    }

    #[test]
    fn lookups() {
        let s = series();
        assert_eq!(s.get(d(2, 29)), Some(2.0));
        assert_eq!(s.get(d(2, 27)), None);
        assert_eq!(s.get(d(3, 2)), None);
        assert_eq!(s.head(2).len(), 2);
        assert_eq!(s.head(10).len(), 3);
        assert_eq!(s.range(d(2, 29), d(3, 5)).len(), 2);
        assert!(s.range(d(3, 1), d(2, 28)).is_empty());
    }
}
