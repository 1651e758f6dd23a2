//! Conflict Analysis Library
//!
//! Separation screening between the balloon fleet and nearby aircraft.
//! Every balloon's current position is checked against every aircraft state;
//! pairs inside the safety zone are classified into HIGH/MEDIUM/LOW risk bands
//! by horizontal separation.
//!
//! Balloons carry no per-balloon altitude, so all are assumed to fly at
//! [`BALLOON_ALTITUDE_M`].

use balloon_tracking::{geodesy, Balloon};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

pub mod airspace;

/// Assumed float altitude for every balloon (typical stratospheric balloon)
pub const BALLOON_ALTITUDE_M: f64 = 20000.0;

#[derive(Error, Debug)]
pub enum ConflictError {
    #[error("Invalid area: {0}")]
    InvalidArea(String),
    #[error("Malformed state vector: {0}")]
    MalformedStateVector(String),
}

pub type Result<T> = std::result::Result<T, ConflictError>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Externally supplied aircraft state report
///
/// Position fields are optional because upstream feeds omit them; records
/// without a position are excluded from analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AircraftState {
    #[serde(default)]
    pub callsign: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Barometric altitude in meters
    pub altitude: Option<f64>,
    /// Geometric altitude in meters
    pub geo_altitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icao24: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub true_track: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_ground: Option<bool>,
}

impl AircraftState {
    pub fn new(
        callsign: impl Into<String>,
        latitude: f64,
        longitude: f64,
        altitude: Option<f64>,
    ) -> Self {
        Self {
            callsign: callsign.into(),
            latitude: Some(latitude),
            longitude: Some(longitude),
            altitude,
            geo_altitude: None,
            icao24: None,
            origin_country: None,
            velocity: None,
            true_track: None,
            on_ground: None,
        }
    }

    /// `(latitude, longitude)` when both are present
    pub fn position(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }

    /// First nonzero of barometric and geometric altitude
    ///
    /// Feeds report 0 for an unknown barometric altitude, so 0 falls
    /// through to the geometric reading.
    pub fn reported_altitude(&self) -> Option<f64> {
        let nonzero = |alt: &f64| *alt != 0.0;
        self.altitude
            .filter(nonzero)
            .or(self.geo_altitude.filter(nonzero))
    }

    /// [`reported_altitude`](Self::reported_altitude), defaulting to 0
    pub fn effective_altitude(&self) -> f64 {
        self.reported_altitude().unwrap_or(0.0)
    }
}

/// A balloon-aircraft pair inside the safety zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskEncounter {
    pub balloon_id: usize,
    pub aircraft_callsign: String,
    pub horizontal_distance_m: f64,
    pub vertical_distance_m: f64,
    pub aircraft_altitude: f64,
    pub balloon_altitude: f64,
    pub risk_level: RiskLevel,
}

/// Accumulated screening result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SafetyAnalysis {
    pub total_balloons: usize,
    pub total_aircraft: usize,
    pub near_misses: Vec<RiskEncounter>,
    pub high_risk_encounters: Vec<RiskEncounter>,
    pub medium_risk_encounters: Vec<RiskEncounter>,
    pub low_risk_encounters: Vec<RiskEncounter>,
    pub safety_zones_violated: usize,
    pub altitude_conflicts: usize,
}

impl SafetyAnalysis {
    fn record_violation(&mut self, encounter: RiskEncounter) {
        self.safety_zones_violated += 1;
        match encounter.risk_level {
            RiskLevel::High => self.high_risk_encounters.push(encounter),
            RiskLevel::Medium => self.medium_risk_encounters.push(encounter),
            RiskLevel::Low => self.low_risk_encounters.push(encounter),
        }
    }

    pub fn total_encounters(&self) -> usize {
        self.high_risk_encounters.len()
            + self.medium_risk_encounters.len()
            + self.low_risk_encounters.len()
    }
}

/// Separation thresholds, all in meters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConflictConfig {
    pub balloon_altitude_m: f64,
    pub horizontal_safety_m: f64,
    pub vertical_safety_m: f64,
    pub high_risk_m: f64,
    pub medium_risk_m: f64,
    pub near_miss_horizontal_m: f64,
    pub near_miss_vertical_m: f64,
    /// Commercial flight corridor floor
    pub corridor_floor_m: f64,
    /// Commercial flight corridor ceiling
    pub corridor_ceiling_m: f64,
}

impl Default for ConflictConfig {
    fn default() -> Self {
        Self {
            balloon_altitude_m: BALLOON_ALTITUDE_M,
            horizontal_safety_m: 5000.0,
            vertical_safety_m: 300.0,
            high_risk_m: 2000.0,
            medium_risk_m: 3500.0,
            near_miss_horizontal_m: 1000.0,
            near_miss_vertical_m: 100.0,
            corridor_floor_m: 8000.0,
            corridor_ceiling_m: 12000.0,
        }
    }
}

#[derive(Default)]
pub struct ConflictAnalyzer {
    config: ConflictConfig,
}

impl ConflictAnalyzer {
    pub fn new(config: ConflictConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConflictConfig {
        &self.config
    }

    /// Risk band for a pair already inside the safety zone
    pub fn assess(&self, horizontal_m: f64) -> RiskLevel {
        match horizontal_m {
            h if h <= self.config.high_risk_m => RiskLevel::High,
            h if h <= self.config.medium_risk_m => RiskLevel::Medium,
            _ => RiskLevel::Low,
        }
    }

    pub fn in_flight_corridor(&self, altitude_m: f64) -> bool {
        (self.config.corridor_floor_m..=self.config.corridor_ceiling_m).contains(&altitude_m)
    }

    /// Screen every balloon's current position against every aircraft
    pub fn analyze(&self, balloons: &[Balloon], aircraft: &[AircraftState]) -> SafetyAnalysis {
        let mut analysis = SafetyAnalysis {
            total_balloons: balloons.len(),
            total_aircraft: aircraft.len(),
            ..SafetyAnalysis::default()
        };

        let positioned: Vec<(&AircraftState, (f64, f64))> = aircraft
            .iter()
            .filter_map(|a| a.position().map(|pos| (a, pos)))
            .collect();
        if positioned.len() < aircraft.len() {
            debug!(
                "Excluded {} aircraft without a position",
                aircraft.len() - positioned.len()
            );
        }

        let balloon_altitude = self.config.balloon_altitude_m;

        for balloon in balloons {
            let Some(current) = balloon.current_position() else {
                continue;
            };

            for (state, (lat, lon)) in &positioned {
                let aircraft_altitude = state.effective_altitude();
                let horizontal =
                    geodesy::distance_m(current.longitude, current.latitude, *lon, *lat);
                let vertical = (balloon_altitude - aircraft_altitude).abs();

                let encounter = |risk_level| RiskEncounter {
                    balloon_id: balloon.id,
                    aircraft_callsign: state.callsign.clone(),
                    horizontal_distance_m: horizontal,
                    vertical_distance_m: vertical,
                    aircraft_altitude,
                    balloon_altitude,
                    risk_level,
                };

                if horizontal <= self.config.horizontal_safety_m
                    && vertical <= self.config.vertical_safety_m
                {
                    analysis.record_violation(encounter(self.assess(horizontal)));
                }

                if horizontal <= self.config.near_miss_horizontal_m
                    && vertical <= self.config.near_miss_vertical_m
                {
                    analysis.near_misses.push(encounter(self.assess(horizontal)));
                }

                if self.in_flight_corridor(aircraft_altitude) {
                    analysis.altitude_conflicts += 1;
                }
            }
        }

        info!(
            "Safety screening: {} balloons x {} aircraft, {} violations, {} near misses",
            analysis.total_balloons,
            positioned.len(),
            analysis.safety_zones_violated,
            analysis.near_misses.len()
        );

        analysis
    }
}
