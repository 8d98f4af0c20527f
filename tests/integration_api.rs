//! Integration tests for the REST API feature.

#![cfg(feature = "api")]

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::util::ServiceExt;

use offgrid_forecast::api::{AppState, router};
use offgrid_forecast::config::AppConfig;
use offgrid_forecast::features::CarryForwardPolicy;
use offgrid_forecast::forecast::{ForecastContext, forecast};
use offgrid_forecast::sim::scenarios::simulate_scenarios;

use common::{daily_schema, default_history, full_history_scaler, persistence_model};

fn state_from_run() -> Arc<AppState> {
    let cfg = AppConfig::baseline();
    let schema = daily_schema();
    let history = default_history();
    let scaler = full_history_scaler(&history);
    let model = persistence_model(&schema, 7);
    let ctx = ForecastContext::new(&model, &scaler, &schema, CarryForwardPolicy::CarryForward).unwrap();
    let series = forecast(ctx, &history, 30).unwrap();
    let scenarios = simulate_scenarios(&cfg.solar.scenarios, &series.values(), &cfg.scenario_params());

    Arc::new(AppState {
        history,
        forecast: series,
        scenarios,
        horizons: cfg.prediction.horizons,
    })
}

async fn get(uri: &str) -> (StatusCode, serde_json::Value) {
    let app = router(state_from_run());
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null))
}

#[tokio::test]
async fn forecast_endpoint_serves_run_output() {
    let (status, json) = get("/forecast").await;
    assert_eq!(status, StatusCode::OK);
    let points = json.as_array().cloned().unwrap_or_default();
    assert_eq!(points.len(), 30);
    assert_eq!(points[0]["date"], "2024-01-01");
    assert_eq!(points[29]["date"], "2024-01-30");
}

#[tokio::test]
async fn each_offered_horizon_is_a_prefix() {
    for days in [7, 15, 30] {
        let (status, json) = get(&format!("/forecast?days={days}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().map(Vec::len), Some(days));
    }
}

#[tokio::test]
async fn history_range_spans_requested_dates() {
    let (status, json) = get("/history?from=2023-12-25&to=2023-12-31").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().map(Vec::len), Some(7));
}

#[tokio::test]
async fn scenarios_endpoint_matches_config() {
    let (status, json) = get("/scenarios").await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = json
        .as_array()
        .map(|a| a.iter().filter_map(|s| s["name"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(names, vec!["small", "medium", "large"]);
}

#[tokio::test]
async fn summary_reports_extents() {
    let (status, json) = get("/summary").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["history_days"], 365);
    assert_eq!(json["last_history_date"], "2023-12-31");
    assert_eq!(json["forecast_days"], 30);
}
