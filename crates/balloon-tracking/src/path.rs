//! Path and velocity synthesis
//!
//! Turns each reconstructed [`Track`] into a [`Balloon`]: a newest-first path
//! plus one velocity estimate per point. Consecutive track entries are one
//! hour apart, so the great-circle distance in km doubles as speed in km/h.

use crate::geodesy;
use crate::tracker::Track;
use serde::{Deserialize, Serialize};

/// A `[lat, lon]` pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn distance_km(&self, other: &Position) -> f64 {
        geodesy::distance_km(self.longitude, self.latitude, other.longitude, other.latitude)
    }
}

impl From<[f64; 2]> for Position {
    fn from([latitude, longitude]: [f64; 2]) -> Self {
        Self::new(latitude, longitude)
    }
}

impl From<Position> for [f64; 2] {
    fn from(p: Position) -> Self {
        [p.latitude, p.longitude]
    }
}

/// A `[speed_kmph, bearing_deg]` pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Velocity {
    pub speed_kmph: f64,
    pub bearing_deg: f64,
}

impl Velocity {
    /// Placeholder for the oldest point, which has nothing older to compare with
    pub const STATIONARY: Velocity = Velocity {
        speed_kmph: 0.0,
        bearing_deg: 0.0,
    };

    /// Velocity over a one-hour step from `older` to `newer`
    pub fn between(older: &Position, newer: &Position) -> Self {
        Self {
            speed_kmph: geodesy::distance_km(
                older.longitude,
                older.latitude,
                newer.longitude,
                newer.latitude,
            ),
            bearing_deg: geodesy::bearing_deg(
                older.longitude,
                older.latitude,
                newer.longitude,
                newer.latitude,
            ),
        }
    }
}

impl From<[f64; 2]> for Velocity {
    fn from([speed_kmph, bearing_deg]: [f64; 2]) -> Self {
        Self {
            speed_kmph,
            bearing_deg,
        }
    }
}

impl From<Velocity> for [f64; 2] {
    fn from(v: Velocity) -> Self {
        [v.speed_kmph, v.bearing_deg]
    }
}

/// A reconstructed balloon
///
/// `path` is newest first and `velocities` is aligned with it index for index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balloon {
    pub id: usize,
    pub path: Vec<Position>,
    pub velocities: Vec<Velocity>,
}

impl Balloon {
    pub fn current_position(&self) -> Option<&Position> {
        self.path.first()
    }

    pub fn current_velocity(&self) -> Option<&Velocity> {
        self.velocities.first()
    }

    /// A balloon is active when it has at least one position
    pub fn is_active(&self) -> bool {
        !self.path.is_empty()
    }
}

pub struct PathSynthesizer;

impl PathSynthesizer {
    /// Build a balloon from a track; `id` is the track's index
    pub fn synthesize(id: usize, track: &Track) -> Balloon {
        let path: Vec<Position> = track
            .reports()
            .iter()
            .map(|r| Position::new(r.latitude, r.longitude))
            .collect();

        let mut velocities: Vec<Velocity> = path
            .windows(2)
            .map(|pair| Velocity::between(&pair[1], &pair[0]))
            .collect();
        if !path.is_empty() {
            velocities.push(Velocity::STATIONARY);
        }

        Balloon {
            id,
            path,
            velocities,
        }
    }

    pub fn synthesize_all(tracks: &[Track]) -> Vec<Balloon> {
        tracks
            .iter()
            .enumerate()
            .map(|(id, track)| Self::synthesize(id, track))
            .collect()
    }
}
