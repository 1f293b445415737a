use utoipa::OpenApi;

use crate::controllers::planner_controller;
use crate::models::solar;

#[derive(OpenApi)]
#[openapi(
    paths(
        planner_controller::health,
        planner_controller::get_defaults,
        planner_controller::geocode,
        planner_controller::create_assessment,
        planner_controller::export_assessment_csv,
        planner_controller::estimate_area
    ),
    components(
        schemas(
            solar::SystemConfig,
            solar::AssessmentRequest,
            solar::Assessment,
            solar::AnalysisPeriod,
            solar::FinancialSummary,
            solar::MonthlyAggregate,
            solar::ProductionSample,
            solar::GeocodedLocation,
            solar::Geometry,
            solar::AreaEstimate,
            solar::PlannerDefaults,
            solar::HealthStatus
        )
    ),
    tags(
        (name = "solar-planner", description = "Solar Rooftop Planner API")
    )
)]
pub struct ApiDoc;
