use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::PlannerError;
use crate::models::solar::{
    AreaEstimate, Assessment, AssessmentRequest, GeocodedLocation, Geometry, HealthStatus,
    PlannerDefaults,
};
use crate::services::{area, export};
use crate::shared_state::AppState;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GeocodeQuery {
    /// Free-text property address
    pub address: String,
}

/// GET /api/health
#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, description = "Service status", body = HealthStatus))
)]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        cached_locations: state.planner.cached_locations(),
        cached_series: state.planner.cached_series(),
    })
}

/// GET /api/defaults
/// Default system parameters and the financial baseline year
#[utoipa::path(
    get,
    path = "/api/defaults",
    responses((status = 200, description = "Configured defaults", body = PlannerDefaults))
)]
pub async fn get_defaults(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.planner.defaults())
}

/// GET /api/geocode
/// Resolve an address to coordinates
#[utoipa::path(
    get,
    path = "/api/geocode",
    params(GeocodeQuery),
    responses(
        (status = 200, description = "Resolved location", body = GeocodedLocation),
        (status = 404, description = "Address not found"),
        (status = 502, description = "Geocoder unreachable")
    )
)]
pub async fn geocode(
    State(state): State<AppState>,
    Query(query): Query<GeocodeQuery>,
) -> Result<Json<GeocodedLocation>, PlannerError> {
    Ok(Json(state.planner.locate(&query.address).await?))
}

/// POST /api/assessment
/// Production, savings and environmental impact for a property
///
/// Fetches a full calendar year of hourly irradiance (the latest complete
/// year unless `year` is given) and rolls it up.
#[utoipa::path(
    post,
    path = "/api/assessment",
    request_body = AssessmentRequest,
    responses(
        (status = 200, description = "Assessment", body = Assessment),
        (status = 400, description = "Invalid system parameters or request"),
        (status = 404, description = "Address not found"),
        (status = 422, description = "No irradiance data for the period"),
        (status = 502, description = "Upstream service failed")
    )
)]
pub async fn create_assessment(
    State(state): State<AppState>,
    Json(req): Json<AssessmentRequest>,
) -> Result<Json<Assessment>, PlannerError> {
    Ok(Json(state.planner.assess(&req).await?))
}

/// POST /api/assessment/csv
/// Hourly production series as CSV (Timestamp, ghi, production)
#[utoipa::path(
    post,
    path = "/api/assessment/csv",
    request_body = AssessmentRequest,
    responses(
        (status = 200, description = "CSV export", content_type = "text/csv", body = String),
        (status = 404, description = "Address not found"),
        (status = 422, description = "No irradiance data for the period")
    )
)]
pub async fn export_assessment_csv(
    State(state): State<AppState>,
    Json(req): Json<AssessmentRequest>,
) -> Result<impl IntoResponse, PlannerError> {
    let production = state.planner.production(&req).await?;
    let body = export::to_csv_string(&production)?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"solar_production.csv\""),
        ],
        body,
    ))
}

/// POST /api/area
/// Geodesic area of a drawn rooftop polygon and the capacity it fits
#[utoipa::path(
    post,
    path = "/api/area",
    request_body = Geometry,
    responses(
        (status = 200, description = "Area estimate", body = AreaEstimate),
        (status = 400, description = "Geometry is not a usable polygon")
    )
)]
pub async fn estimate_area(Json(geometry): Json<Geometry>) -> Result<Json<AreaEstimate>, PlannerError> {
    Ok(Json(area::estimate_area(&geometry)?))
}
