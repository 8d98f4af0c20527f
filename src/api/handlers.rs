//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;

use super::AppState;
use super::types::{DailyValue, ErrorResponse, RangeQuery, SummaryResponse};
use crate::sim::scenarios::ScenarioSummary;

type ApiError = (StatusCode, Json<ErrorResponse>);

/// `GET /summary` → 200 + `SummaryResponse` JSON
pub async fn get_summary(State(state): State<Arc<AppState>>) -> Json<SummaryResponse> {
    Json(SummaryResponse {
        target_column: state.history.schema().target_name().to_string(),
        history_days: state.history.len(),
        last_history_date: state.history.last_date(),
        forecast_days: state.forecast.len(),
        first_forecast_date: state.forecast.first_date(),
        forecast_total: state.forecast.total(),
        horizons: state.horizons.clone(),
    })
}

/// Returns observed daily target values.
///
/// `GET /history` → 200 + `Vec<DailyValue>` JSON
/// `GET /history?days=N` → the `N` most recent days
/// `GET /history?from=2024-02-01&to=2024-01-01` → 400 + `ErrorResponse`
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Vec<DailyValue>>, ApiError> {
    check_range(&query)?;

    let mut values: Vec<DailyValue> = state
        .history
        .dates()
        .iter()
        .zip(state.history.target_values())
        .filter(|(d, _)| query.contains(**d))
        .map(|(d, v)| DailyValue { date: *d, value: v })
        .collect();
    if let Some(days) = query.days {
        let skip = values.len().saturating_sub(days);
        values.drain(..skip);
    }

    Ok(Json(values))
}

/// Returns forecast daily values.
///
/// `GET /forecast` → 200 + `Vec<DailyValue>` JSON for the whole horizon
/// `GET /forecast?days=7` → first week only
/// `GET /forecast?from=...&to=...` → inclusive date range
pub async fn get_forecast(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Vec<DailyValue>>, ApiError> {
    check_range(&query)?;

    let values: Vec<DailyValue> = state
        .forecast
        .iter()
        .filter(|p| query.contains(p.date))
        .take(query.days.unwrap_or(usize::MAX))
        .map(DailyValue::from)
        .collect();

    Ok(Json(values))
}

/// `GET /scenarios` → 200 + `Vec<ScenarioSummary>` JSON
pub async fn get_scenarios(State(state): State<Arc<AppState>>) -> Json<Vec<ScenarioSummary>> {
    Json(state.scenarios.clone())
}

fn check_range(query: &RangeQuery) -> Result<(), ApiError> {
    if let (Some(from), Some(to)) = (query.from, query.to) {
        if from > to {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!("`from` ({from}) must be <= `to` ({to})"),
                }),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use chrono::NaiveDate;
    use tower::util::ServiceExt;

    use super::*;
    use crate::api::router;
    use crate::features::FeatureSchema;
    use crate::forecast::{ForecastPoint, ForecastSeries};
    use crate::history::HistoryTable;
    use crate::sim::economics::DieselEconomics;
    use crate::sim::scenarios::{ScenarioParams, SolarScenario, simulate_scenarios};

    fn make_test_state() -> Arc<AppState> {
        let schema = FeatureSchema::new(&["demand_kwh"], "demand_kwh").unwrap();
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let dates: Vec<NaiveDate> = start.iter_days().take(10).collect();
        let rows = (0..10).map(|i| vec![400.0 + f64::from(i)]).collect();
        let history = HistoryTable::new(schema, dates, rows).unwrap();

        let anchor = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let points = anchor
            .iter_days()
            .skip(1)
            .take(30)
            .map(|date| ForecastPoint { date, value: 500.0 })
            .collect();
        let forecast = ForecastSeries::from_points(anchor, points).unwrap();

        let params = ScenarioParams {
            h_radiation: 4.5,
            performance_ratio: 0.8,
            economics: DieselEconomics {
                kwh_per_liter: 3.0,
                co2_kg_per_liter: 2.2,
                price_per_liter: 2553.59,
            },
        };
        let scenarios = simulate_scenarios(
            &[SolarScenario::new("small", 100.0), SolarScenario::new("large", 500.0)],
            &forecast.values(),
            &params,
        );

        Arc::new(AppState {
            history,
            forecast,
            scenarios,
            horizons: vec![7, 15, 30],
        })
    }

    async fn get_json(uri: &str) -> (StatusCode, serde_json::Value) {
        let app = router(make_test_state());
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null))
    }

    #[tokio::test]
    async fn summary_returns_200() {
        let (status, json) = get_json("/summary").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["target_column"], "demand_kwh");
        assert_eq!(json["history_days"], 10);
        assert_eq!(json["forecast_days"], 30);
        assert_eq!(json["first_forecast_date"], "2024-01-11");
        assert_eq!(json["horizons"].as_array().map(Vec::len), Some(3));
    }

    #[tokio::test]
    async fn forecast_returns_whole_horizon() {
        let (status, json) = get_json("/forecast").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().map(Vec::len), Some(30));
        assert_eq!(json[0]["date"], "2024-01-11");
        assert_eq!(json[0]["value"], 500.0);
    }

    #[tokio::test]
    async fn forecast_days_query() {
        let (status, json) = get_json("/forecast?days=7").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().map(Vec::len), Some(7));
        assert_eq!(json[6]["date"], "2024-01-17");
    }

    #[tokio::test]
    async fn forecast_range_query() {
        let (status, json) = get_json("/forecast?from=2024-01-15&to=2024-01-20").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().map(Vec::len), Some(6));
        assert_eq!(json[0]["date"], "2024-01-15");
        assert_eq!(json[5]["date"], "2024-01-20");
    }

    #[tokio::test]
    async fn forecast_invalid_range_returns_400() {
        let (status, json) = get_json("/forecast?from=2024-02-01&to=2024-01-15").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json.get("error").is_some());
    }

    #[tokio::test]
    async fn malformed_date_is_rejected() {
        let (status, _) = get_json("/forecast?from=yesterday").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn history_days_returns_most_recent() {
        let (status, json) = get_json("/history?days=3").await;
        assert_eq!(status, StatusCode::OK);
        let values = json.as_array().cloned().unwrap_or_default();
        assert_eq!(values.len(), 3);
        assert_eq!(values[0]["date"], "2024-01-08");
        assert_eq!(values[2]["value"], 409.0);
    }

    #[tokio::test]
    async fn scenarios_returns_all() {
        let (status, json) = get_json("/scenarios").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().map(Vec::len), Some(2));
        assert_eq!(json[0]["name"], "small");
    }
}
