//! Autoregressive daily electricity demand forecaster for off-grid sites.
//!
//! A trained [`model::SequenceModel`] is rolled forward one day at a time
//! over a scaled sliding window; each prediction is written back into the
//! window alongside calendar features recomputed for the next date. The
//! resulting [`forecast::ForecastSeries`] feeds solar sizing scenarios in
//! [`sim`].

#[cfg(feature = "api")]
pub mod api;
pub mod config;
pub mod error;
pub mod features;
pub mod forecast;
pub mod history;
pub mod io;
pub mod model;
pub mod scaling;
pub mod sim;
pub mod synthetic;
/// Sliding window of scaled feature rows.
pub mod window;
