//! Airspace query helpers
//!
//! The air-traffic feed is queried for a box around the fleet's current
//! positions, and its OpenSky-style state vectors are decoded and filtered
//! here so the HTTP client stays a thin transport.

use crate::{AircraftState, ConflictError, Result};
use balloon_tracking::Balloon;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Degrees added on every side of the fleet's extent
pub const DEFAULT_BUFFER_DEG: f64 = 1.0;

/// Aircraft outside this altitude range (meters) are dropped
pub const MIN_AIRCRAFT_ALTITUDE_M: f64 = 0.0;
pub const MAX_AIRCRAFT_ALTITUDE_M: f64 = 50000.0;

/// Geographic query area in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl BoundingBox {
    pub fn new(lat_min: f64, lat_max: f64, lon_min: f64, lon_max: f64) -> Result<Self> {
        if !(lat_min.is_finite() && lat_max.is_finite() && lon_min.is_finite() && lon_max.is_finite())
        {
            return Err(ConflictError::InvalidArea("non-finite bound".to_string()));
        }
        if lat_min > lat_max || lon_min > lon_max {
            return Err(ConflictError::InvalidArea(format!(
                "min exceeds max: lat {}..{}, lon {}..{}",
                lat_min, lat_max, lon_min, lon_max
            )));
        }
        Ok(Self {
            lat_min: lat_min.max(-90.0),
            lat_max: lat_max.min(90.0),
            lon_min: lon_min.max(-180.0),
            lon_max: lon_max.min(180.0),
        })
    }

    /// Extent of all current balloon positions plus `buffer_deg`
    ///
    /// `None` when no balloon has a position.
    pub fn around_balloons(balloons: &[Balloon], buffer_deg: f64) -> Option<Self> {
        let mut positions = balloons.iter().filter_map(Balloon::current_position);
        let first = positions.next()?;

        let (mut lat_min, mut lat_max) = (first.latitude, first.latitude);
        let (mut lon_min, mut lon_max) = (first.longitude, first.longitude);
        for p in positions {
            lat_min = lat_min.min(p.latitude);
            lat_max = lat_max.max(p.latitude);
            lon_min = lon_min.min(p.longitude);
            lon_max = lon_max.max(p.longitude);
        }

        Self::new(
            lat_min - buffer_deg,
            lat_max + buffer_deg,
            lon_min - buffer_deg,
            lon_max + buffer_deg,
        )
        .ok()
    }

    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.lat_min..=self.lat_max).contains(&lat) && (self.lon_min..=self.lon_max).contains(&lon)
    }

    /// OpenSky `states/all` query parameters
    pub fn query_params(&self) -> [(&'static str, f64); 4] {
        [
            ("lamin", self.lat_min),
            ("lamax", self.lat_max),
            ("lomin", self.lon_min),
            ("lomax", self.lon_max),
        ]
    }
}

/// Position present and effective altitude within `[min_alt, max_alt]`
pub fn is_valid_aircraft(state: &AircraftState, min_alt: f64, max_alt: f64) -> bool {
    if state.position().is_none() {
        return false;
    }
    match state.reported_altitude() {
        Some(alt) => (min_alt..=max_alt).contains(&alt),
        None => false,
    }
}

/// Decode one positional OpenSky state vector
///
/// Layout: 0 icao24, 1 callsign, 2 origin country, 5 longitude, 6 latitude,
/// 7 baro altitude, 8 on ground, 9 velocity, 10 true track, 13 geo altitude.
pub fn parse_state_vector(state: &[Value]) -> Result<AircraftState> {
    if state.len() < 17 {
        return Err(ConflictError::MalformedStateVector(format!(
            "expected 17 fields, got {}",
            state.len()
        )));
    }

    let text = |i: usize| state[i].as_str().map(|s| s.trim().to_string());
    let number = |i: usize| state[i].as_f64();

    Ok(AircraftState {
        callsign: text(1).unwrap_or_default(),
        latitude: number(6),
        longitude: number(5),
        altitude: number(7),
        geo_altitude: number(13),
        icao24: text(0),
        origin_country: text(2),
        velocity: number(9),
        true_track: number(10),
        on_ground: state[8].as_bool(),
    })
}

/// Decode a `states/all` response body and keep only valid aircraft
pub fn parse_states_response(body: &Value) -> Vec<AircraftState> {
    let Some(states) = body.get("states").and_then(Value::as_array) else {
        return Vec::new();
    };

    states
        .iter()
        .filter_map(Value::as_array)
        .filter_map(|sv| parse_state_vector(sv).ok())
        .filter(|a| is_valid_aircraft(a, MIN_AIRCRAFT_ALTITUDE_M, MAX_AIRCRAFT_ALTITUDE_M))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use balloon_tracking::{Position, Velocity};
    use serde_json::json;

    fn balloon_at(id: usize, lat: f64, lon: f64) -> Balloon {
        Balloon {
            id,
            path: vec![Position::new(lat, lon)],
            velocities: vec![Velocity::STATIONARY],
        }
    }

    #[test]
    fn test_bbox_around_balloons() {
        let balloons = vec![
            balloon_at(0, 10.0, -20.0),
            balloon_at(1, 12.0, -25.0),
            Balloon {
                id: 2,
                path: vec![],
                velocities: vec![],
            },
        ];
        let bbox = BoundingBox::around_balloons(&balloons, DEFAULT_BUFFER_DEG).unwrap();

        assert_eq!(bbox, BoundingBox::new(9.0, 13.0, -26.0, -19.0).unwrap());
        assert!(bbox.contains(11.0, -22.0));
        assert!(!bbox.contains(14.0, -22.0));
    }

    #[test]
    fn test_bbox_none_without_positions() {
        assert!(BoundingBox::around_balloons(&[], DEFAULT_BUFFER_DEG).is_none());
    }

    #[test]
    fn test_bbox_clamps_to_globe() {
        let bbox = BoundingBox::around_balloons(&[balloon_at(0, 89.5, 179.8)], 1.0).unwrap();
        assert_eq!(bbox.lat_max, 90.0);
        assert_eq!(bbox.lon_max, 180.0);
    }

    #[test]
    fn test_bbox_rejects_inverted_bounds() {
        assert!(matches!(
            BoundingBox::new(10.0, 5.0, 0.0, 1.0),
            Err(ConflictError::InvalidArea(_))
        ));
    }

    #[test]
    fn test_parse_state_vector() {
        let sv = json!([
            "abc123", "DAL42   ", "United States", 1700000000, 1700000000,
            -84.4, 33.6, 10668.0, false, 230.5, 90.0, 0.0, null, 10700.0,
            "1200", false, 0
        ]);
        let state = parse_state_vector(sv.as_array().unwrap()).unwrap();

        assert_eq!(state.callsign, "DAL42");
        assert_eq!(state.icao24.as_deref(), Some("abc123"));
        assert_eq!(state.position(), Some((33.6, -84.4)));
        assert_eq!(state.altitude, Some(10668.0));
        assert_eq!(state.geo_altitude, Some(10700.0));
        assert_eq!(state.on_ground, Some(false));
    }

    #[test]
    fn test_parse_short_state_vector_fails() {
        let sv = json!(["abc123", "DAL42"]);
        assert!(parse_state_vector(sv.as_array().unwrap()).is_err());
    }

    #[test]
    fn test_parse_states_response_filters_invalid() {
        let body = json!({
            "time": 1700000000,
            "states": [
                ["a1", "OK1", "X", 0, 0, 10.0, 20.0, 9000.0, false, 0, 0, 0, null, null, null, false, 0],
                ["a2", "NOPOS", "X", 0, 0, null, null, 9000.0, false, 0, 0, 0, null, null, null, false, 0],
                ["a3", "NOALT", "X", 0, 0, 10.0, 20.0, null, false, 0, 0, 0, null, null, null, false, 0],
                ["a4", "GEO", "X", 0, 0, 10.0, 20.0, null, false, 0, 0, 0, null, 1200.0, null, false, 0]
            ]
        });
        let aircraft = parse_states_response(&body);
        let callsigns: Vec<&str> = aircraft.iter().map(|a| a.callsign.as_str()).collect();
        assert_eq!(callsigns, vec!["OK1", "GEO"]);
    }

    #[test]
    fn test_zero_altitude_is_unreported() {
        let mut state = AircraftState::new("GND", 10.0, 20.0, Some(0.0));
        assert!(!is_valid_aircraft(&state, MIN_AIRCRAFT_ALTITUDE_M, MAX_AIRCRAFT_ALTITUDE_M));

        state.geo_altitude = Some(1200.0);
        assert!(is_valid_aircraft(&state, MIN_AIRCRAFT_ALTITUDE_M, MAX_AIRCRAFT_ALTITUDE_M));
    }

    #[test]
    fn test_parse_states_response_null_states() {
        assert!(parse_states_response(&json!({"time": 0, "states": null})).is_empty());
    }
}
