//! REST API over a completed forecast run.
//!
//! Provides four GET endpoints:
//! - `/summary`: target column, history and forecast extents, dashboard horizons
//! - `/history`: observed daily target values, optionally filtered by date
//! - `/forecast`: forecast daily values, optionally filtered by date or horizon
//! - `/scenarios`: solar scenario summaries

mod handlers;
mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tracing::info;

use crate::forecast::ForecastSeries;
use crate::history::HistoryTable;
use crate::sim::scenarios::ScenarioSummary;

/// Immutable application state shared across all request handlers.
///
/// Built once after the forecast run completes and wrapped in `Arc`.
pub struct AppState {
    /// Cleaned history the forecast was seeded from.
    pub history: HistoryTable,
    /// Forecast produced by the run.
    pub forecast: ForecastSeries,
    /// One summary per configured solar scenario.
    pub scenarios: Vec<ScenarioSummary>,
    /// Horizons (days) offered to dashboard consumers.
    pub horizons: Vec<i64>,
}

/// Builds the axum router with all API routes.
///
/// # Arguments
///
/// * `state` - Shared application state
///
/// # Returns
///
/// Configured `Router` ready to serve.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/summary", get(handlers::get_summary))
        .route("/history", get(handlers::get_history))
        .route("/forecast", get(handlers::get_forecast))
        .route("/scenarios", get(handlers::get_scenarios))
        .with_state(state)
}

/// Binds to the given address and serves the API.
///
/// # Arguments
///
/// * `state` - Shared application state
/// * `addr` - Socket address to bind to
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
