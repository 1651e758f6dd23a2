//! Frame-to-frame track association
//!
//! Tracks are seeded from hour 0 and extended backwards in time, one hour at a
//! time, by greedy nearest-neighbor matching:
//!
//! ```text
//! for hour in 1..window:
//!     pool = reports[hour]                       (skip hour if absent/empty)
//!     for track in tracks (creation order):
//!         nearest = argmin dist(track.last, pool[i]) over unclaimed i
//!         if dist < threshold: claim nearest, append to track
//!     every unclaimed report in pool -> new singleton track
//! ```
//!
//! This is intentionally not a globally optimal assignment. A track processed
//! earlier in an hour can claim a report that a later track would have
//! preferred, and nothing is ever re-matched. A track that fails to extend
//! keeps its last real point as its reference for later hours.

use crate::snapshot::{Report, Snapshot, WINDOW_HOURS};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Max distance in km for an implied one-hour step (300 km/h speed cap)
pub const MATCH_THRESHOLD_KM: f64 = 300.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Candidates at or beyond this distance never continue a track
    pub match_threshold_km: f64,
    /// Hours 0..window_hours are considered
    pub window_hours: u8,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            match_threshold_km: MATCH_THRESHOLD_KM,
            window_hours: WINDOW_HOURS,
        }
    }
}

/// Reports believed to belong to one balloon, newest first
///
/// A track's identity is its index in the builder's output, not anything
/// carried by its reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    reports: Vec<Report>,
}

impl Track {
    pub fn seed(report: Report) -> Self {
        Self {
            reports: vec![report],
        }
    }

    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Most recent report
    pub fn current(&self) -> Option<&Report> {
        self.reports.first()
    }

    /// Last successfully matched report, used as the association reference
    pub fn reference(&self) -> Option<&Report> {
        self.reports.last()
    }

    fn extend(&mut self, report: Report) {
        self.reports.push(report);
    }
}

impl From<Vec<Report>> for Track {
    fn from(reports: Vec<Report>) -> Self {
        Self { reports }
    }
}

/// Per-hour association outcome
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HourSummary {
    pub extended: usize,
    pub spawned: usize,
}

/// Nearest unclaimed report to `reference`
///
/// Scans in ascending pool order with strict less-than, so ties resolve to the
/// lowest index. Returns the index and distance in km.
pub fn nearest_unclaimed(
    reference: &Report,
    pool: &[Report],
    claimed: &[bool],
) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    let mut min_dist = f64::INFINITY;

    for (i, candidate) in pool.iter().enumerate() {
        if claimed[i] {
            continue;
        }
        let dist = reference.distance_km(candidate);
        if dist < min_dist {
            min_dist = dist;
            best = Some((i, dist));
        }
    }

    best
}

pub struct TrackBuilder {
    config: TrackerConfig,
}

impl Default for TrackBuilder {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

impl TrackBuilder {
    pub fn new(config: TrackerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Reconstruct tracks from a snapshot window
    ///
    /// Without hour 0 there is no reference frame and the result is empty.
    pub fn build(&self, snapshot: &Snapshot) -> Vec<Track> {
        let Some(latest) = snapshot.hour(0) else {
            info!("No hour-0 snapshot; skipping track reconstruction");
            return Vec::new();
        };

        let mut tracks: Vec<Track> = latest.iter().copied().map(Track::seed).collect();
        debug!("Seeded {} tracks from hour 0", tracks.len());

        for hour in 1..self.config.window_hours.min(WINDOW_HOURS) {
            let Some(reports) = snapshot.hour(hour) else {
                debug!("Hour {:02} missing; tracks pass through", hour);
                continue;
            };
            if reports.is_empty() {
                continue;
            }

            let summary = self.associate_hour(&mut tracks, reports);
            debug!(
                "Hour {:02}: {} reports, {} tracks extended, {} spawned",
                hour,
                reports.len(),
                summary.extended,
                summary.spawned
            );
        }

        info!(
            "Reconstructed {} tracks from {} reports",
            tracks.len(),
            snapshot.total_reports()
        );

        tracks
    }

    /// Match one hour's reports against the current tracks
    fn associate_hour(&self, tracks: &mut Vec<Track>, pool: &[Report]) -> HourSummary {
        let mut claimed = vec![false; pool.len()];
        let mut summary = HourSummary::default();

        for track in tracks.iter_mut() {
            let Some(reference) = track.reference() else {
                continue;
            };

            if let Some((idx, dist)) = nearest_unclaimed(reference, pool, &claimed) {
                if dist < self.config.match_threshold_km {
                    claimed[idx] = true;
                    track.extend(pool[idx]);
                    summary.extended += 1;
                }
            }
        }

        for (report, _) in pool.iter().zip(&claimed).filter(|(_, taken)| !**taken) {
            tracks.push(Track::seed(*report));
            summary.spawned += 1;
        }

        summary
    }
}
