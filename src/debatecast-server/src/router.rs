//! Axum Router Configuration

use crate::{handlers, state::AppState};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/debate", post(handlers::debate))
        // Older clients still post here.
        .route("/debate_script", post(handlers::debate))
        .with_state(app_state)
}
