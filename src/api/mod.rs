//! HTTP surface for the risk dashboard
//!
//! Serves the render plan as JSON and a static page that draws it.

pub mod handlers;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::DashboardConfig;

pub use handlers::AppState;

pub fn create_router(config: DashboardConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index))
        .route("/api/v1/health", get(handlers::health))
        .route("/api/v1/dashboard", get(handlers::get_dashboard))
        .route("/api/v1/countries", get(handlers::get_countries))
        .with_state(Arc::new(config))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
