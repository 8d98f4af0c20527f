//! Sine/cosine encoding of calendar position.

use std::f64::consts::PI;

use chrono::{Datelike, NaiveDate};

/// Months per year.
pub const MONTH_PERIOD: f64 = 12.0;
/// Days per year. Leap years are not special-cased.
pub const DAY_OF_YEAR_PERIOD: f64 = 365.0;
/// Days per week.
pub const WEEKDAY_PERIOD: f64 = 7.0;
/// ISO weeks per year. Week 53 lands slightly past a full turn.
pub const WEEK_OF_YEAR_PERIOD: f64 = 52.0;

/// Column names produced by [`CyclicFeatures`], in emission order.
pub const CYCLIC_COLUMNS: [&str; 8] = [
    "month_sin",
    "month_cos",
    "dayofyear_sin",
    "dayofyear_cos",
    "weekday_sin",
    "weekday_cos",
    "weekofyear_sin",
    "weekofyear_cos",
];

/// One sine/cosine pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CyclicPair {
    pub sin: f64,
    pub cos: f64,
}

impl CyclicPair {
    /// Encodes `value` on a circle of circumference `period`.
    pub fn encode(value: f64, period: f64) -> Self {
        let angle = 2.0 * PI * value / period;
        Self {
            sin: angle.sin(),
            cos: angle.cos(),
        }
    }
}

/// Periodic encoding of a calendar date.
///
/// Pure function of the date; each component lies in `[-1, 1]`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use offgrid_forecast::features::cyclic::CyclicFeatures;
///
/// let june = NaiveDate::from_ymd_opt(2023, 6, 15).unwrap();
/// let cyc = CyclicFeatures::from_date(june);
/// assert!(cyc.month.sin.abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CyclicFeatures {
    /// Month of year, 1–12, period 12.
    pub month: CyclicPair,
    /// Day of year, 1–366, period 365.
    pub day_of_year: CyclicPair,
    /// Weekday with Monday = 0, period 7.
    pub weekday: CyclicPair,
    /// ISO week of year, 1–53, period 52.
    pub week_of_year: CyclicPair,
}

impl CyclicFeatures {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            month: CyclicPair::encode(f64::from(date.month()), MONTH_PERIOD),
            day_of_year: CyclicPair::encode(f64::from(date.ordinal()), DAY_OF_YEAR_PERIOD),
            weekday: CyclicPair::encode(
                f64::from(date.weekday().num_days_from_monday()),
                WEEKDAY_PERIOD,
            ),
            week_of_year: CyclicPair::encode(
                f64::from(date.iso_week().week()),
                WEEK_OF_YEAR_PERIOD,
            ),
        }
    }

    /// Named values in [`CYCLIC_COLUMNS`] order.
    pub fn named_values(&self) -> [(&'static str, f64); 8] {
        [
            (CYCLIC_COLUMNS[0], self.month.sin),
            (CYCLIC_COLUMNS[1], self.month.cos),
            (CYCLIC_COLUMNS[2], self.day_of_year.sin),
            (CYCLIC_COLUMNS[3], self.day_of_year.cos),
            (CYCLIC_COLUMNS[4], self.weekday.sin),
            (CYCLIC_COLUMNS[5], self.weekday.cos),
            (CYCLIC_COLUMNS[6], self.week_of_year.sin),
            (CYCLIC_COLUMNS[7], self.week_of_year.cos),
        ]
    }

    /// Looks up a single column by name.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.named_values()
            .into_iter()
            .find_map(|(n, v)| (n == name).then_some(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn values_bounded_for_every_day_of_a_leap_year() {
        let mut d = date(2024, 1, 1);
        while d.year() == 2024 {
            for (name, v) in CyclicFeatures::from_date(d).named_values() {
                assert!((-1.0..=1.0).contains(&v), "{name} out of range on {d}: {v}");
            }
            d = d.succ_opt().unwrap();
        }
    }

    #[test]
    fn june_month_sin_is_zero() {
        let cyc = CyclicFeatures::from_date(date(2023, 6, 15));
        assert!(cyc.month.sin.abs() < 1e-9);
        assert!((cyc.month.cos + 1.0).abs() < 1e-9);
    }

    #[test]
    fn monday_weekday_is_angle_zero() {
        // 2024-01-01 was a Monday
        let cyc = CyclicFeatures::from_date(date(2024, 1, 1));
        assert!(cyc.weekday.sin.abs() < 1e-12);
        assert!((cyc.weekday.cos - 1.0).abs() < 1e-12);
    }

    #[test]
    fn iso_week_53_wraps_past_full_turn() {
        // 2020-12-31 falls in ISO week 53
        let d = date(2020, 12, 31);
        assert_eq!(d.iso_week().week(), 53);
        let cyc = CyclicFeatures::from_date(d);
        let expected = CyclicPair::encode(53.0, WEEK_OF_YEAR_PERIOD);
        assert_eq!(cyc.week_of_year, expected);
        // one week past a full turn equals week 1
        let week1 = CyclicPair::encode(1.0, WEEK_OF_YEAR_PERIOD);
        assert!((cyc.week_of_year.sin - week1.sin).abs() < 1e-9);
    }

    #[test]
    fn lookup_by_name() {
        let cyc = CyclicFeatures::from_date(date(2023, 3, 1));
        assert_eq!(cyc.get("month_cos"), Some(cyc.month.cos));
        assert_eq!(cyc.get("weekofyear_sin"), Some(cyc.week_of_year.sin));
        assert_eq!(cyc.get("nope"), None);
    }
}
