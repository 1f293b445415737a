use std::sync::Arc;
use std::time::Instant;

use crate::services::planner::SolarPlanner;

#[derive(Clone)]
pub struct AppState {
    /// Pipeline and its memo caches, shared by all requests
    pub planner: Arc<SolarPlanner>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(planner: SolarPlanner) -> Self {
        Self {
            planner: Arc::new(planner),
            started_at: Instant::now(),
        }
    }
}
