use anyhow::Result;
use axum::{
    routing::{get, post},
    Json, Router,
};
use fleet_analyzer::FleetAnalyzer;
use std::path::Path;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod air_traffic;
mod config;
mod error;
mod feed;
mod routes;

use air_traffic::AirTrafficClient;
use config::GatewayConfig;
use error::GatewayError;
use feed::FeedClient;

#[derive(Clone)]
pub struct AppState {
    pub feed: Arc<FeedClient>,
    pub air_traffic: Arc<AirTrafficClient>,
    pub analyzer: Arc<FleetAnalyzer>,
}

impl AppState {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        Ok(Self {
            feed: Arc::new(FeedClient::new(config)?),
            air_traffic: Arc::new(AirTrafficClient::new(config)?),
            analyzer: Arc::new(FleetAnalyzer::default()),
        })
    }
}

/// API routes, plus static files when `static_dir` exists
pub fn app(state: AppState, static_dir: &Path) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health))
        .route("/api/data", get(routes::get_data))
        .route("/api/v1/fleet/analyze", post(routes::analyze))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        );

    if static_dir.exists() {
        tracing::info!("   Serving static files from {}", static_dir.display());
        api_routes.fallback_service(ServeDir::new(static_dir))
    } else {
        tracing::warn!("   Static directory {} not found", static_dir.display());
        api_routes
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "constellation_gateway=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = GatewayConfig::from_env();
    let state = AppState::new(&config)?;
    let app = app(state, &config.static_dir);

    let addr = format!("0.0.0.0:{}", config.port);

    tracing::info!("🎈 Constellation Gateway starting on {}", addr);
    tracing::info!("   Feed: {} ({} hours)", config.feed_base_url, config.feed_hours);
    tracing::info!("   Air traffic: {}", config.opensky_base_url);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "constellation-gateway",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
