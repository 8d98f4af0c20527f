//! CSV export of the combined historical + forecast table and scenario summaries.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;

use crate::forecast::ForecastSeries;
use crate::history::{DATE_FORMAT, HistoryTable};
use crate::sim::scenarios::ScenarioSummary;

/// Row labels distinguishing observed from forecast days.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesLabels {
    pub historical: String,
    pub forecast: String,
}

impl Default for SeriesLabels {
    fn default() -> Self {
        Self {
            historical: "historical".to_string(),
            forecast: "forecast".to_string(),
        }
    }
}

/// One row of the combined table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedRecord {
    pub date: NaiveDate,
    pub value: f64,
    pub label: String,
}

/// Merges history and forecast into one date-sorted table.
pub fn combine(
    history: &HistoryTable,
    forecast: &ForecastSeries,
    labels: &SeriesLabels,
) -> Vec<CombinedRecord> {
    let mut records: Vec<CombinedRecord> = history
        .dates()
        .iter()
        .zip(history.target_values())
        .map(|(d, v)| CombinedRecord {
            date: *d,
            value: v,
            label: labels.historical.clone(),
        })
        .chain(forecast.iter().map(|p| CombinedRecord {
            date: p.date,
            value: p.value,
            label: labels.forecast.clone(),
        }))
        .collect();
    // stable: a historical row stays ahead of a forecast row on the same date
    records.sort_by_key(|r| r.date);
    records
}

/// Writes `date,<target>,label` rows to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_combined_csv(
    records: &[CombinedRecord],
    target_column: &str,
    writer: impl Write,
) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(["date", target_column, "label"])?;
    for r in records {
        wtr.write_record(&[
            r.date.format(DATE_FORMAT).to_string(),
            format!("{:.4}", r.value),
            r.label.clone(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes the combined table to `path`.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_combined_csv(
    records: &[CombinedRecord],
    target_column: &str,
    path: &Path,
) -> io::Result<()> {
    let file = File::create(path)?;
    write_combined_csv(records, target_column, io::BufWriter::new(file))
}

/// Column header for scenario summary export.
const SCENARIO_HEADER: &str = "scenario,capacity_kw,total_demand_kwh,total_solar_kwh,\
                               demand_satisfaction_pct,diesel_saved_liters,cost_savings,\
                               co2_avoided_kg";

/// Writes one row per scenario summary.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_scenarios_csv(summaries: &[ScenarioSummary], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(SCENARIO_HEADER.split(',').map(str::trim))?;
    for s in summaries {
        wtr.write_record(&[
            s.name.clone(),
            format!("{:.2}", s.capacity_kw),
            format!("{:.4}", s.total_demand_kwh),
            format!("{:.4}", s.total_solar_kwh),
            format!("{:.4}", s.demand_satisfaction_pct),
            format!("{:.4}", s.diesel_saved_liters),
            format!("{:.2}", s.cost_savings),
            format!("{:.4}", s.co2_avoided_kg),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes scenario summaries to `path`.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_scenarios_csv(summaries: &[ScenarioSummary], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_scenarios_csv(summaries, io::BufWriter::new(file))
}
