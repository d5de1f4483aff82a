//! API Routes
//!
//! - `POST /generate-story` - accept a request and start a background job
//! - `GET /story/{id}` - poll one job
//! - `GET /stories` - list all known jobs
//! - `GET /api/health` - health check
//! - `GET /` - minimal HTML landing page

pub mod health;
pub mod stories;
pub mod ui;

use crate::models::AppState;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(stories::router(state.clone()))
        .merge(health::router(state))
        .merge(ui::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
