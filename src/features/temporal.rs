//! Integer calendar features extracted from a date.

use chrono::{Datelike, NaiveDate};

/// Column names produced by [`TemporalFeatures`], in emission order.
pub const TEMPORAL_COLUMNS: [&str; 7] = [
    "year",
    "month",
    "day",
    "weekday",
    "weekofyear",
    "quarter",
    "dayofyear",
];

/// Raw calendar position of one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemporalFeatures {
    pub year: i32,
    /// 1–12.
    pub month: u32,
    /// Day of month, 1–31.
    pub day: u32,
    /// Monday = 0 … Sunday = 6.
    pub weekday: u32,
    /// ISO week, 1–53.
    pub week_of_year: u32,
    /// 1–4.
    pub quarter: u32,
    /// 1–366.
    pub day_of_year: u32,
}

impl TemporalFeatures {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
            weekday: date.weekday().num_days_from_monday(),
            week_of_year: date.iso_week().week(),
            quarter: (date.month() - 1) / 3 + 1,
            day_of_year: date.ordinal(),
        }
    }

    /// Named values in [`TEMPORAL_COLUMNS`] order.
    pub fn named_values(&self) -> [(&'static str, f64); 7] {
        [
            (TEMPORAL_COLUMNS[0], f64::from(self.year)),
            (TEMPORAL_COLUMNS[1], f64::from(self.month)),
            (TEMPORAL_COLUMNS[2], f64::from(self.day)),
            (TEMPORAL_COLUMNS[3], f64::from(self.weekday)),
            (TEMPORAL_COLUMNS[4], f64::from(self.week_of_year)),
            (TEMPORAL_COLUMNS[5], f64::from(self.quarter)),
            (TEMPORAL_COLUMNS[6], f64::from(self.day_of_year)),
        ]
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.named_values()
            .into_iter()
            .find_map(|(n, v)| (n == name).then_some(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_year_sunday() {
        // 2023-01-01 was a Sunday in ISO week 52 of 2022
        let t = TemporalFeatures::from_date(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        assert_eq!(t.year, 2023);
        assert_eq!(t.month, 1);
        assert_eq!(t.day_of_year, 1);
        assert_eq!(t.weekday, 6);
        assert_eq!(t.week_of_year, 52);
        assert_eq!(t.quarter, 1);
    }

    #[test]
    fn quarter_boundaries() {
        for (m, q) in [(3, 1), (4, 2), (6, 2), (7, 3), (10, 4), (12, 4)] {
            let t = TemporalFeatures::from_date(NaiveDate::from_ymd_opt(2024, m, 1).unwrap());
            assert_eq!(t.quarter, q, "month {m}");
        }
    }

    #[test]
    fn lookup_by_name() {
        let t = TemporalFeatures::from_date(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
        assert_eq!(t.get("dayofyear"), Some(366.0));
        assert_eq!(t.get("day"), Some(31.0));
        assert_eq!(t.get("unknown"), None);
    }
}
