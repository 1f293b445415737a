mod routes;
mod controllers;
mod services;
mod models;
mod api_docs;
mod shared_state;
mod config;
mod error;

use std::net::SocketAddr;

use anyhow::Context;
use axum::{Router, routing::get, response::Html};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_scalar::Scalar;

use crate::api_docs::ApiDoc;
use crate::config::Config;
use crate::routes::planner_routes::api_routes;
use crate::services::planner::SolarPlanner;
use crate::shared_state::AppState;

#[cfg(feature = "verbose_log")]
const DEFAULT_FILTER: &str = "debug,hyper=info,reqwest=info";
#[cfg(not(feature = "verbose_log"))]
const DEFAULT_FILTER: &str = "info,hyper=warn,reqwest=warn,tower_http=info";

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    // 1. Load configuration
    let config_path = Config::path_from_env();
    let config = Config::load(&config_path)?;
    info!(
        path = %config_path,
        geocoder = %config.geocoder.base_url,
        archive = %config.irradiance.base_url,
        cache_ttl_s = ?config.cache.ttl_s,
        "configuration loaded"
    );

    // 2. Build the pipeline and shared state
    let planner = SolarPlanner::new(&config).context("building upstream clients")?;
    let state = AppState::new(planner);

    // 3. Start Axum HTTP server
    let app = Router::new()
        .nest("/api", api_routes(state))
        .route("/scalar", get(|| async {
            Html(Scalar::new(ApiDoc::openapi()).to_html())
        }))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("API server listening on http://{}", addr);
    info!("Scalar UI: http://{}/scalar", addr);

    axum_server::bind(addr)
        .serve(app.into_make_service())
        .await
        .with_context(|| format!("serving on {addr}"))?;
    Ok(())
}
