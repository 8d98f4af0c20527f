//! Presets and config files drive complete runs, in-process and via the CLI.

use std::path::Path;
use std::process::Command;

use chrono::NaiveDate;

use offgrid_forecast::config::AppConfig;
use offgrid_forecast::forecast::{ForecastContext, ForecastSeries, forecast};
use offgrid_forecast::model::PersistenceModel;
use offgrid_forecast::sim::scenarios::{ScenarioSummary, simulate_scenarios};
use offgrid_forecast::synthetic::synthetic_history;

fn run_in_process(cfg: &AppConfig) -> (ForecastSeries, Vec<ScenarioSummary>) {
    assert!(cfg.validate().is_empty(), "{:?}", cfg.validate());
    let schema = cfg.schema().unwrap();
    let history = synthetic_history(&cfg.synthetic_params().unwrap(), &schema).unwrap();
    let model = PersistenceModel::new(
        schema.names().to_vec(),
        schema.target_index(),
        cfg.model.window_size,
    );
    let scaler = cfg
        .model
        .scaler_reference
        .fit(&history, cfg.model.train_split_ratio)
        .unwrap();
    let ctx = ForecastContext::new(&model, &scaler, &schema, cfg.features.carry_forward).unwrap();
    let series = forecast(ctx, &history, cfg.prediction.horizon).unwrap();
    let summaries = simulate_scenarios(&cfg.solar.scenarios, &series.values(), &cfg.scenario_params());
    (series, summaries)
}

#[test]
fn every_preset_runs_end_to_end() {
    for name in AppConfig::PRESETS {
        let cfg = AppConfig::from_preset(name).unwrap();
        let (series, summaries) = run_in_process(&cfg);
        assert_eq!(series.len() as i64, cfg.prediction.horizon, "preset {name}");
        assert_eq!(summaries.len(), cfg.solar.scenarios.len(), "preset {name}");
    }
}

#[test]
fn larger_capacity_never_saves_less() {
    let cfg = AppConfig::monthly();
    let (_, summaries) = run_in_process(&cfg);
    for pair in summaries.windows(2) {
        assert!(pair[0].capacity_kw < pair[1].capacity_kw);
        assert!(pair[0].diesel_saved_liters <= pair[1].diesel_saved_liters + 1e-9);
        assert!(pair[1].demand_satisfaction_pct <= 100.0 + 1e-9);
    }
}

#[test]
fn config_files_parse_and_run() {
    for path in ["configs/baseline.toml", "configs/dry_season.toml"] {
        let cfg = AppConfig::from_toml_file(Path::new(path)).unwrap();
        let (series, _) = run_in_process(&cfg);
        assert!(!series.is_empty(), "{path}");
    }
}

#[test]
fn cli_weekly_preset_prints_forecast_and_writes_csv() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("combined.csv");
    let scenarios_out = dir.path().join("scenarios.csv");

    let output = Command::new(env!("CARGO_BIN_EXE_offgrid-forecast"))
        .args(["--preset", "weekly", "--seed", "11", "--out"])
        .arg(&out)
        .arg("--scenarios-out")
        .arg(&scenarios_out)
        .output()
        .expect("offgrid-forecast process should run");

    assert!(
        output.status.success(),
        "weekly run failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8(output.stdout).expect("stdout should be valid UTF-8");
    let table_rows = stdout
        .lines()
        .filter(|l| {
            let first = l.split_whitespace().next().unwrap_or_default();
            NaiveDate::parse_from_str(first, "%Y-%m-%d").is_ok()
        })
        .count();
    assert_eq!(table_rows, 7, "unexpected forecast table: {stdout}");
    assert!(stdout.contains("Next   7 days"));
    assert!(stdout.contains("--- small (100 kW) ---"));

    let combined = std::fs::read_to_string(&out).unwrap();
    assert_eq!(combined.lines().filter(|l| l.ends_with(",forecast")).count(), 7);
    let scenarios = std::fs::read_to_string(&scenarios_out).unwrap();
    assert_eq!(scenarios.lines().count(), 1 + 3);
}

#[test]
fn cli_rejects_negative_horizon() {
    let output = Command::new(env!("CARGO_BIN_EXE_offgrid-forecast"))
        .args(["--horizon", "-5"])
        .output()
        .expect("offgrid-forecast process should run");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("prediction.horizon"), "stderr={stderr}");
}

#[test]
fn cli_scenarios_flag_filters_in_config_order() {
    let dir = tempfile::tempdir().unwrap();
    let scenarios_out = dir.path().join("scenarios.csv");

    let output = Command::new(env!("CARGO_BIN_EXE_offgrid-forecast"))
        .args(["--preset", "weekly", "--scenarios", "large,small", "--scenarios-out"])
        .arg(&scenarios_out)
        .output()
        .expect("offgrid-forecast process should run");

    assert!(
        output.status.success(),
        "filtered run failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("--- medium"), "stdout={stdout}");

    let csv = std::fs::read_to_string(&scenarios_out).unwrap();
    let names: Vec<&str> = csv
        .lines()
        .skip(1)
        .filter_map(|l| l.split(',').next())
        .collect();
    assert_eq!(names, ["small", "large"]);
}

#[test]
fn cli_rejects_unknown_scenario_name() {
    let output = Command::new(env!("CARGO_BIN_EXE_offgrid-forecast"))
        .args(["--preset", "weekly", "--scenarios", "small,huge"])
        .output()
        .expect("offgrid-forecast process should run");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown scenario \"huge\""), "stderr={stderr}");
}
