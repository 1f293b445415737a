pub mod aggregator;
pub mod area;
pub mod cache;
pub mod export;
pub mod geocoder;
pub mod irradiance;
pub mod planner;
pub mod yield_estimator;
