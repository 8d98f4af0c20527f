//! Daily PV energy yield.

/// Daily energy from a PV array: `E = P × H × PR`.
///
/// # Arguments
///
/// * `capacity_kw` - Nominal array power (kW)
/// * `h_radiation` - Mean daily irradiation (kWh/m²/day, i.e. peak sun hours)
/// * `performance_ratio` - System losses factor, typically 0.6–0.95
///
/// # Returns
///
/// Energy generated per day in kWh. Negative inputs are treated as zero.
///
/// # Examples
///
/// ```
/// use offgrid_forecast::sim::solar::daily_solar_energy_kwh;
///
/// assert!((daily_solar_energy_kwh(100.0, 4.5, 0.8) - 360.0).abs() < 1e-9);
/// ```
pub fn daily_solar_energy_kwh(capacity_kw: f64, h_radiation: f64, performance_ratio: f64) -> f64 {
    capacity_kw.max(0.0) * h_radiation.max(0.0) * performance_ratio.max(0.0)
}
