//! Candidate solar capacities evaluated against a demand forecast.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::economics::{DieselEconomics, DieselSavings};
use super::solar::daily_solar_energy_kwh;

/// A named candidate PV capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SolarScenario {
    pub name: String,
    pub capacity_kw: f64,
}

impl SolarScenario {
    pub fn new(name: impl Into<String>, capacity_kw: f64) -> Self {
        Self {
            name: name.into(),
            capacity_kw,
        }
    }
}

/// Site irradiation and diesel factors shared by every scenario.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenarioParams {
    /// Mean daily irradiation (kWh/m²/day).
    pub h_radiation: f64,
    /// PV performance ratio.
    pub performance_ratio: f64,
    pub economics: DieselEconomics,
}

/// Aggregate benefit of one scenario over the demand horizon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioSummary {
    pub name: String,
    pub capacity_kw: f64,
    /// Sum of daily demand (kWh).
    pub total_demand_kwh: f64,
    /// Solar generation over the horizon, used or not (kWh).
    pub total_solar_kwh: f64,
    /// Share of demand met by solar (%).
    pub demand_satisfaction_pct: f64,
    pub diesel_saved_liters: f64,
    pub cost_savings: f64,
    pub co2_avoided_kg: f64,
}

impl ScenarioSummary {
    /// Evaluates `scenario` against `demand_kwh` (one value per day).
    pub fn evaluate(scenario: &SolarScenario, demand_kwh: &[f64], params: &ScenarioParams) -> Self {
        let daily_solar = daily_solar_energy_kwh(
            scenario.capacity_kw,
            params.h_radiation,
            params.performance_ratio,
        );
        let savings = DieselSavings::compute(daily_solar, demand_kwh, &params.economics);
        let total_demand: f64 = demand_kwh.iter().sum();
        let satisfaction = if total_demand > 0.0 {
            100.0 * savings.solar_energy_used_kwh / total_demand
        } else {
            0.0
        };

        Self {
            name: scenario.name.clone(),
            capacity_kw: scenario.capacity_kw,
            total_demand_kwh: total_demand,
            total_solar_kwh: daily_solar * demand_kwh.len() as f64,
            demand_satisfaction_pct: satisfaction,
            diesel_saved_liters: savings.diesel_saved_liters,
            cost_savings: savings.cost_savings,
            co2_avoided_kg: savings.co2_avoided_kg,
        }
    }
}

impl fmt::Display for ScenarioSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- {} ({:.0} kW) ---", self.name, self.capacity_kw)?;
        writeln!(f, "Forecast demand:       {:.1} kWh", self.total_demand_kwh)?;
        writeln!(f, "Solar generation:      {:.1} kWh", self.total_solar_kwh)?;
        writeln!(f, "Demand met by solar:   {:.1}%", self.demand_satisfaction_pct)?;
        writeln!(f, "Diesel saved:          {:.1} L", self.diesel_saved_liters)?;
        writeln!(f, "CO2 avoided:           {:.1} kg", self.co2_avoided_kg)?;
        write!(f, "Cost savings:          {:.2}", self.cost_savings)
    }
}

/// Evaluates every scenario, preserving input order.
pub fn simulate_scenarios(
    scenarios: &[SolarScenario],
    demand_kwh: &[f64],
    params: &ScenarioParams,
) -> Vec<ScenarioSummary> {
    scenarios
        .iter()
        .map(|s| ScenarioSummary::evaluate(s, demand_kwh, params))
        .collect()
}

/// Scenarios whose name appears in `selected`, in their original order.
pub fn select_scenarios<'a, S: AsRef<str>>(
    scenarios: &'a [SolarScenario],
    selected: &[S],
) -> Vec<&'a SolarScenario> {
    scenarios
        .iter()
        .filter(|s| selected.iter().any(|n| n.as_ref() == s.name))
        .collect()
}
