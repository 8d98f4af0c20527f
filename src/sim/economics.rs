//! Diesel displacement, CO2 and cost savings from solar generation.

use serde::Serialize;

/// Diesel generator conversion and price factors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DieselEconomics {
    /// Electrical energy per litre of diesel (kWh/L).
    pub kwh_per_liter: f64,
    /// CO2 emitted per litre burned (kg/L).
    pub co2_kg_per_liter: f64,
    /// Fuel price per litre (local currency).
    pub price_per_liter: f64,
}

/// Savings accumulated over a demand series.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct DieselSavings {
    /// Solar energy actually consumed (kWh), capped daily at demand.
    pub solar_energy_used_kwh: f64,
    /// Diesel not burned (L).
    pub diesel_saved_liters: f64,
    /// CO2 not emitted (kg).
    pub co2_avoided_kg: f64,
    /// Fuel cost avoided.
    pub cost_savings: f64,
}

impl DieselSavings {
    /// Solar displaces diesel up to each day's demand.
    ///
    /// # Arguments
    ///
    /// * `daily_solar_kwh` - Solar energy available every day
    /// * `demand_kwh` - Daily demand series (e.g. a forecast horizon)
    /// * `economics` - Conversion factors; `kwh_per_liter <= 0` yields zero savings
    pub fn compute(daily_solar_kwh: f64, demand_kwh: &[f64], economics: &DieselEconomics) -> Self {
        let used: f64 = demand_kwh
            .iter()
            .map(|&d| daily_solar_kwh.min(d.max(0.0)))
            .sum();

        let diesel = if economics.kwh_per_liter > 0.0 {
            used / economics.kwh_per_liter
        } else {
            0.0
        };

        Self {
            solar_energy_used_kwh: used,
            diesel_saved_liters: diesel,
            co2_avoided_kg: diesel * economics.co2_kg_per_liter,
            cost_savings: diesel * economics.price_per_liter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn econ() -> DieselEconomics {
        DieselEconomics {
            kwh_per_liter: 3.0,
            co2_kg_per_liter: 2.20,
            price_per_liter: 2553.59,
        }
    }

    #[test]
    fn solar_below_demand_is_fully_used() {
        let s = DieselSavings::compute(360.0, &[500.0, 500.0, 500.0], &econ());
        assert!((s.solar_energy_used_kwh - 1080.0).abs() < 1e-9);
        assert!((s.diesel_saved_liters - 360.0).abs() < 1e-9);
        assert!((s.co2_avoided_kg - 792.0).abs() < 1e-9);
        assert!((s.cost_savings - 360.0 * 2553.59).abs() < 1e-6);
    }

    #[test]
    fn usage_capped_at_demand() {
        let s = DieselSavings::compute(500.0, &[100.0, 100.0], &econ());
        assert!((s.solar_energy_used_kwh - 200.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_inputs() {
        assert_eq!(DieselSavings::compute(100.0, &[], &econ()), DieselSavings::default());
        let zero = DieselEconomics {
            kwh_per_liter: 0.0,
            ..econ()
        };
        let s = DieselSavings::compute(100.0, &[50.0], &zero);
        assert_eq!(s.diesel_saved_liters, 0.0);
        assert_eq!(s.solar_energy_used_kwh, 50.0);
    }
}
