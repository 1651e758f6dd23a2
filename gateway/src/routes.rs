use axum::{
    extract::{Query, State},
    Json,
};
use balloon_tracking::Snapshot;
use conflict_analysis::airspace::{BoundingBox, DEFAULT_BUFFER_DEG};
use conflict_analysis::AircraftState;
use fleet_analyzer::FleetResult;
use serde::{Deserialize, Serialize};

use crate::{AppState, GatewayError};

#[derive(Debug, Deserialize)]
pub struct DataQuery {
    #[serde(default)]
    pub air_traffic: bool,
}

/// Fleet analysis plus the live-request context
#[derive(Debug, Serialize)]
pub struct FleetResponse {
    #[serde(flatten)]
    pub result: FleetResult,
    pub aircraft: Vec<AircraftState>,
    pub air_traffic_enabled: bool,
    pub last_updated: String,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub snapshot: Snapshot,
    #[serde(default)]
    pub aircraft: Vec<AircraftState>,
}

/// Fetch the live feed, optionally the surrounding air traffic, and analyze
pub async fn get_data(
    State(state): State<AppState>,
    Query(query): Query<DataQuery>,
) -> Result<Json<FleetResponse>, GatewayError> {
    let snapshot = state.feed.fetch_snapshot().await?;
    let balloons = state.analyzer.balloons(&snapshot);

    let aircraft = if query.air_traffic {
        match BoundingBox::around_balloons(&balloons, DEFAULT_BUFFER_DEG) {
            Some(bbox) => state.air_traffic.aircraft_in(&bbox).await,
            None => Vec::new(),
        }
    } else {
        Vec::new()
    };

    let result = state.analyzer.analyze_balloons(balloons, &aircraft);

    Ok(Json(FleetResponse {
        result,
        aircraft,
        air_traffic_enabled: query.air_traffic,
        last_updated: chrono::Utc::now().to_rfc3339(),
    }))
}

/// Analyze caller-supplied data without touching the network
pub async fn analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Json<FleetResult> {
    tracing::debug!(
        "Offline analysis: {} reports, {} aircraft",
        request.snapshot.total_reports(),
        request.aircraft.len()
    );
    Json(state.analyzer.analyze(&request.snapshot, &request.aircraft))
}
