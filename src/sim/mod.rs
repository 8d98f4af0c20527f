//! Solar sizing scenarios evaluated against a demand forecast.

/// Diesel displacement, cost and emission savings.
pub mod economics;
pub mod scenarios;
/// Daily PV energy yield.
pub mod solar;
