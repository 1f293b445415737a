pub mod planner_controller;
