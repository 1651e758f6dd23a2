//! OpenSky air-traffic client
//!
//! Any failure degrades to "no aircraft" so a flaky upstream never blocks
//! the balloon analysis.

use crate::config::GatewayConfig;
use crate::GatewayError;
use conflict_analysis::airspace::{parse_states_response, BoundingBox};
use conflict_analysis::AircraftState;
use std::time::Duration;

pub struct AirTrafficClient {
    client: reqwest::Client,
    base_url: String,
    credentials: Option<(String, String)>,
}

impl AirTrafficClient {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.opensky_base_url.clone(),
            credentials: config.opensky_credentials.clone(),
        })
    }

    async fn fetch_states(&self, bbox: &BoundingBox) -> Result<Vec<AircraftState>, reqwest::Error> {
        let mut request = self
            .client
            .get(format!("{}/states/all", self.base_url))
            .query(&bbox.query_params());
        if let Some((user, pass)) = &self.credentials {
            request = request.basic_auth(user, Some(pass));
        }

        let body: serde_json::Value = request.send().await?.error_for_status()?.json().await?;
        Ok(parse_states_response(&body))
    }

    /// Aircraft currently inside `bbox`; empty on any upstream failure
    pub async fn aircraft_in(&self, bbox: &BoundingBox) -> Vec<AircraftState> {
        match self.fetch_states(bbox).await {
            Ok(aircraft) => {
                tracing::info!("Fetched {} aircraft in {:?}", aircraft.len(), bbox);
                aircraft
            }
            Err(e) => {
                tracing::warn!("Air traffic unavailable: {}", e);
                Vec::new()
            }
        }
    }
}
