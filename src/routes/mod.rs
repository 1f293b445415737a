pub mod planner_routes;
