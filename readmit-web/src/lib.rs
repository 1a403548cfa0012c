//! readmit-web library - readmission risk assessment service
//!
//! Serves the single-page clinical form and the assessment API on top of
//! a process-wide [`AssessmentEngine`] built once at startup.

use std::sync::Arc;

use axum::Router;
use readmit_common::assess::AssessmentEngine;

pub mod api;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Loaded model, encoding tables, and risk policy (read-only)
    pub engine: Arc<AssessmentEngine>,
}

impl AppState {
    /// Create new application state
    pub fn new(engine: Arc<AssessmentEngine>) -> Self {
        Self { engine }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};
    use tower_http::trace::TraceLayer;

    Router::new()
        .route("/", get(api::serve_index))
        .route("/static/app.js", get(api::serve_app_js))
        .route("/api/assess", post(api::assess))
        .route("/api/assess/batch", post(api::assess_batch))
        .route("/api/options", get(api::get_form_options))
        .route("/api/buildinfo", get(api::get_build_info))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
