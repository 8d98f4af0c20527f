//! Demand forecaster entry point: CLI wiring and config-driven run construction.

use std::fmt::Display;
use std::path::Path;
use std::process;

use offgrid_forecast::config::AppConfig;
use offgrid_forecast::features::FeatureSchema;
use offgrid_forecast::forecast::{ForecastContext, ForecastSeries, forecast};
use offgrid_forecast::history::{DATE_FORMAT, HistoryTable};
use offgrid_forecast::io::export::{combine, export_combined_csv, export_scenarios_csv};
use offgrid_forecast::model::{LinearWindowModel, PersistenceModel, SequenceModel};
use offgrid_forecast::sim::scenarios::{ScenarioSummary, select_scenarios, simulate_scenarios};
use offgrid_forecast::synthetic::synthetic_history;
use tracing::{Level, info, warn};

/// Parsed CLI arguments.
struct CliArgs {
    config_path: Option<String>,
    preset: Option<String>,
    history_path: Option<String>,
    model_path: Option<String>,
    horizon: Option<i64>,
    out: Option<String>,
    scenarios_out: Option<String>,
    scenario_names: Option<Vec<String>>,
    seed_override: Option<u64>,
    verbose: bool,
    #[cfg(feature = "api")]
    serve: bool,
    #[cfg(feature = "api")]
    port: u16,
}

fn print_help() {
    eprintln!("offgrid-forecast: autoregressive daily demand forecaster");
    eprintln!();
    eprintln!("Usage: offgrid-forecast [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>          Load run configuration from TOML file");
    eprintln!("  --preset <name>          Use a built-in preset (baseline, weekly, monthly)");
    eprintln!("  --history <csv>          Daily history CSV (default: synthetic history)");
    eprintln!("  --model <toml>           Linear window model weights (default: persistence)");
    eprintln!("  --horizon <i64>          Days to forecast");
    eprintln!("  --out <path>             Export combined history + forecast CSV");
    eprintln!("  --scenarios-out <path>   Export solar scenario summaries CSV");
    eprintln!("  --scenarios <a,b,...>    Evaluate only the named solar scenarios");
    eprintln!("  --seed <u64>             Override synthetic history seed");
    eprintln!("  --verbose                Log every forecast step");
    #[cfg(feature = "api")]
    {
        eprintln!("  --serve                  Start REST API server after the run");
        eprintln!("  --port <u16>             API server port (default: 3000)");
    }
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If no --config or --preset is given, the baseline preset is used.");
}

/// Returns the value following flag `name`, or exits.
fn flag_value(args: &[String], i: &mut usize, name: &str, what: &str) -> String {
    *i += 1;
    if *i >= args.len() {
        eprintln!("error: {name} requires {what} argument");
        process::exit(1);
    }
    args[*i].clone()
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        config_path: None,
        preset: None,
        history_path: None,
        model_path: None,
        horizon: None,
        out: None,
        scenarios_out: None,
        scenario_names: None,
        seed_override: None,
        verbose: false,
        #[cfg(feature = "api")]
        serve: false,
        #[cfg(feature = "api")]
        port: 3000,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--config" => cli.config_path = Some(flag_value(&args, &mut i, "--config", "a path")),
            "--preset" => cli.preset = Some(flag_value(&args, &mut i, "--preset", "a name")),
            "--history" => {
                cli.history_path = Some(flag_value(&args, &mut i, "--history", "a path"));
            }
            "--model" => cli.model_path = Some(flag_value(&args, &mut i, "--model", "a path")),
            "--horizon" => {
                let v = flag_value(&args, &mut i, "--horizon", "an i64");
                if let Ok(h) = v.parse::<i64>() {
                    cli.horizon = Some(h);
                } else {
                    eprintln!("error: --horizon value \"{v}\" is not a valid i64");
                    process::exit(1);
                }
            }
            "--out" => cli.out = Some(flag_value(&args, &mut i, "--out", "a path")),
            "--scenarios-out" => {
                cli.scenarios_out = Some(flag_value(&args, &mut i, "--scenarios-out", "a path"));
            }
            "--scenarios" => {
                let v = flag_value(&args, &mut i, "--scenarios", "a comma-separated list");
                cli.scenario_names = Some(
                    v.split(',')
                        .map(str::trim)
                        .filter(|n| !n.is_empty())
                        .map(String::from)
                        .collect(),
                );
            }
            "--seed" => {
                let v = flag_value(&args, &mut i, "--seed", "a u64");
                if let Ok(s) = v.parse::<u64>() {
                    cli.seed_override = Some(s);
                } else {
                    eprintln!("error: --seed value \"{v}\" is not a valid u64");
                    process::exit(1);
                }
            }
            "--verbose" | "-v" => cli.verbose = true,
            #[cfg(feature = "api")]
            "--serve" => {
                cli.serve = true;
            }
            #[cfg(feature = "api")]
            "--port" => {
                let v = flag_value(&args, &mut i, "--port", "a u16");
                if let Ok(p) = v.parse::<u16>() {
                    cli.port = p;
                } else {
                    eprintln!("error: --port value \"{v}\" is not a valid u16");
                    process::exit(1);
                }
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

/// Unwraps `result` or prints the error and exits with status 1.
fn or_exit<T, E: Display>(result: Result<T, E>) -> T {
    result.unwrap_or_else(|e| {
        eprintln!("error: {e}");
        process::exit(1);
    })
}

/// Loads the history table named in the config, or generates one.
fn load_history(cfg: &AppConfig, schema: &FeatureSchema) -> HistoryTable {
    match cfg.data.history_path {
        Some(ref path) => {
            info!(%path, "loading history");
            or_exit(HistoryTable::from_csv_path(schema.clone(), Path::new(path)))
        }
        None => {
            let params = or_exit(cfg.synthetic_params());
            info!(days = params.days, seed = params.seed, "generating synthetic history");
            or_exit(synthetic_history(&params, schema))
        }
    }
}

/// Builds the configured sequence model.
fn load_model(cfg: &AppConfig, schema: &FeatureSchema) -> Box<dyn SequenceModel> {
    match (cfg.model.kind.as_str(), cfg.model.path.as_deref()) {
        ("linear", Some(path)) => {
            let model = or_exit(LinearWindowModel::from_toml_file(Path::new(path)));
            if model.window_size() != cfg.model.window_size {
                warn!(
                    model = model.window_size(),
                    config = cfg.model.window_size,
                    "model window size overrides configured window size"
                );
            }
            Box::new(model)
        }
        _ => Box::new(PersistenceModel::new(
            schema.names().to_vec(),
            schema.target_index(),
            cfg.model.window_size,
        )),
    }
}

/// Runs the full pipeline and returns history, forecast and scenario summaries.
fn run(cfg: &AppConfig) -> (HistoryTable, ForecastSeries, Vec<ScenarioSummary>) {
    let schema = or_exit(cfg.schema());
    let history = load_history(cfg, &schema);
    let model = load_model(cfg, &schema);
    let scaler = or_exit(
        cfg.model
            .scaler_reference
            .fit(&history, cfg.model.train_split_ratio),
    );
    let ctx = or_exit(ForecastContext::new(
        model.as_ref(),
        &scaler,
        &schema,
        cfg.features.carry_forward,
    ));
    let series = or_exit(forecast(ctx, &history, cfg.prediction.horizon));
    let scenarios = simulate_scenarios(
        &cfg.solar.scenarios,
        &series.values(),
        &cfg.scenario_params(),
    );
    (history, series, scenarios)
}

fn main() {
    let cli = parse_args();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .init();

    // Load config: --config takes priority, then --preset, then baseline default
    let mut cfg = if let Some(ref path) = cli.config_path {
        or_exit(AppConfig::from_toml_file(Path::new(path)))
    } else if let Some(ref name) = cli.preset {
        or_exit(AppConfig::from_preset(name))
    } else {
        AppConfig::baseline()
    };

    // Apply CLI overrides
    if let Some(path) = cli.history_path {
        cfg.data.history_path = Some(path);
    }
    if let Some(path) = cli.model_path {
        cfg.model.kind = "linear".to_string();
        cfg.model.path = Some(path);
    }
    if let Some(h) = cli.horizon {
        cfg.prediction.horizon = h;
    }
    if let Some(path) = cli.out {
        cfg.data.output_path = Some(path);
    }
    if let Some(path) = cli.scenarios_out {
        cfg.data.scenarios_output_path = Some(path);
    }
    if let Some(seed) = cli.seed_override {
        cfg.synthetic.seed = seed;
    }
    if let Some(ref names) = cli.scenario_names {
        let selected: Vec<_> = select_scenarios(&cfg.solar.scenarios, names)
            .into_iter()
            .cloned()
            .collect();
        if let Some(missing) = names
            .iter()
            .find(|n| !selected.iter().any(|s| &s.name == *n))
        {
            let available: Vec<&str> =
                cfg.solar.scenarios.iter().map(|s| s.name.as_str()).collect();
            eprintln!(
                "error: unknown scenario \"{missing}\", available: {}",
                available.join(", ")
            );
            process::exit(1);
        }
        cfg.solar.scenarios = selected;
    }

    let errors = cfg.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let (history, series, scenarios) = run(&cfg);
    let target = history.schema().target_name().to_string();

    // Print forecast table
    println!("{:<12} {:>12}", "date", target);
    for p in &series {
        println!("{:<12} {:>12.2}", p.date.format(DATE_FORMAT), p.value);
    }

    println!();
    for &h in &cfg.prediction.horizons {
        let days = usize::try_from(h).unwrap_or(0);
        let head = series.head(days);
        let total: f64 = head.iter().map(|p| p.value).sum();
        println!("Next {:>3} days: {total:>12.1} ({} forecast)", h, head.len());
    }

    for s in &scenarios {
        println!("\n{s}");
    }

    if let Some(ref path) = cfg.data.output_path {
        let records = combine(&history, &series, &cfg.labels());
        or_exit(export_combined_csv(&records, &target, Path::new(path)));
        info!(%path, rows = records.len(), "combined table written");
    }
    if let Some(ref path) = cfg.data.scenarios_output_path {
        or_exit(export_scenarios_csv(&scenarios, Path::new(path)));
        info!(%path, "scenario summaries written");
    }

    // Start API server if requested
    #[cfg(feature = "api")]
    if cli.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;

        let state = Arc::new(offgrid_forecast::api::AppState {
            history,
            forecast: series,
            scenarios,
            horizons: cfg.prediction.horizons.clone(),
        });
        let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
        let rt = or_exit(tokio::runtime::Runtime::new());
        or_exit(rt.block_on(offgrid_forecast::api::serve(state, addr)));
    }
}
