//! Autoregressive forecasting: driver loop and dated output.

pub mod driver;
pub mod series;

pub use driver::{AutoregressiveDriver, CancelToken, DriverState, ForecastContext, forecast};
pub use series::{ForecastPoint, ForecastSeries};
