//! Balloon Tracking Library
//!
//! Reconstructs per-balloon trajectories from anonymous, unordered hourly
//! position reports. No report carries an identity across hours, so continuity
//! is inferred from spatial proximity between consecutive snapshots:
//!
//! - [`geodesy`]: great-circle distance and initial bearing
//! - [`snapshot`]: the 24-hour window of reports
//! - [`tracker`]: greedy nearest-neighbor frame-to-frame association
//! - [`path`]: path and velocity synthesis for each reconstructed track
//! - [`patterns`]: fleet-wide descriptive statistics
//!
//! Everything in this crate is synchronous and allocation-local; a full run
//! owns its inputs and shares no state with other runs.

use thiserror::Error;

pub mod geodesy;
pub mod path;
pub mod patterns;
pub mod snapshot;
pub mod tracker;

pub use path::{Balloon, PathSynthesizer, Position, Velocity};
pub use patterns::{FlightInsights, FlightPatternAnalyzer, PatternConfig};
pub use snapshot::{Report, Snapshot, WINDOW_HOURS};
pub use tracker::{Track, TrackBuilder, TrackerConfig};

#[derive(Error, Debug)]
pub enum TrackingError {
    #[error("Hour index {0} is outside the 24-hour window")]
    HourOutOfWindow(u8),
}

pub type Result<T> = std::result::Result<T, TrackingError>;
