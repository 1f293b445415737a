use axum::{
    routing::{get, post},
    Router,
};

use crate::controllers::planner_controller::{
    create_assessment, estimate_area, export_assessment_csv, geocode, get_defaults, health,
};
use crate::shared_state::AppState;

/// Build the `/api/*` sub-router.
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/health",          get(health))
        .route("/defaults",        get(get_defaults))
        .route("/geocode",         get(geocode))
        .route("/assessment",      post(create_assessment))
        .route("/assessment/csv",  post(export_assessment_csv))
        .route("/area",            post(estimate_area))
        .with_state(state)
}
