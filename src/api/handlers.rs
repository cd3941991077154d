//! REST handlers for the risk dashboard
//!
//! Every request loads the CSV files afresh and renders on a blocking thread;
//! nothing is cached between requests.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

use crate::config::DashboardConfig;
use crate::loader::{self, LoadOutcome};
use crate::view::{self, CountryFilter, RenderPlan};

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct CountriesResponse {
    pub countries: Vec<String>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl ToString) -> ApiError {
    (status, Json(ErrorResponse { error: error.to_string() }))
}

// ============================================================================
// Query Parameters
// ============================================================================

#[derive(Deserialize)]
pub struct DashboardQuery {
    pub country: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

pub type AppState = Arc<DashboardConfig>;

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// GET /
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /api/v1/health
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

/// GET /api/v1/dashboard?country=X
pub async fn get_dashboard(
    State(config): State<AppState>,
    Query(params): Query<DashboardQuery>,
) -> Result<Json<RenderPlan>, ApiError> {
    let selected = CountryFilter::from(params.country.as_deref());

    match tokio::task::spawn_blocking(move || view::refresh(&config, &selected)).await {
        Ok(Ok(plan)) => Ok(Json(plan)),
        Ok(Err(e)) => {
            error!("Failed to load data: {}", e);
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e))
        }
        Err(e) => Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e)),
    }
}

/// GET /api/v1/countries
pub async fn get_countries(
    State(config): State<AppState>,
) -> Result<Json<CountriesResponse>, ApiError> {
    match tokio::task::spawn_blocking(move || loader::load(&config.data)).await {
        Ok(Ok(LoadOutcome::Ready { orders, .. })) => Ok(Json(CountriesResponse {
            countries: view::country_options(&orders),
        })),
        Ok(Ok(LoadOutcome::Missing(missing))) => {
            Err(api_error(StatusCode::SERVICE_UNAVAILABLE, missing))
        }
        Ok(Err(e)) => {
            error!("Failed to load data: {}", e);
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e))
        }
        Err(e) => Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e)),
    }
}
