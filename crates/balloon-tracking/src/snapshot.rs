//! Hourly report window
//!
//! Hour 0 is the most recent snapshot, hours 1..23 are progressively older.
//! Missing hours are a normal state (the feed could not be fetched) and are
//! simply absent from the map.

use crate::{geodesy, Result, TrackingError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of hourly slots in the tracking window
pub const WINDOW_HOURS: u8 = 24;

/// A single anonymous position observation
///
/// Serialized as a `[latitude, longitude, altitude]` triple to match the feed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Report {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

impl Report {
    pub fn new(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
        }
    }

    /// Great-circle distance to another report in km
    pub fn distance_km(&self, other: &Report) -> f64 {
        geodesy::distance_km(self.longitude, self.latitude, other.longitude, other.latitude)
    }
}

impl From<[f64; 3]> for Report {
    fn from([latitude, longitude, altitude]: [f64; 3]) -> Self {
        Self::new(latitude, longitude, altitude)
    }
}

impl From<Report> for [f64; 3] {
    fn from(report: Report) -> Self {
        [report.latitude, report.longitude, report.altitude]
    }
}

/// Reports keyed by hour index within the window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<u8, Vec<Report>>", into = "BTreeMap<u8, Vec<Report>>")]
pub struct Snapshot {
    hours: BTreeMap<u8, Vec<Report>>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(hour, reports)` pairs, rejecting hours outside the window
    pub fn from_hours<I>(hours: I) -> Result<Self>
    where
        I: IntoIterator<Item = (u8, Vec<Report>)>,
    {
        let mut snapshot = Self::new();
        for (hour, reports) in hours {
            snapshot.insert(hour, reports)?;
        }
        Ok(snapshot)
    }

    /// Set the reports for an hour, replacing anything already there
    pub fn insert(&mut self, hour: u8, reports: Vec<Report>) -> Result<()> {
        if hour >= WINDOW_HOURS {
            return Err(TrackingError::HourOutOfWindow(hour));
        }
        self.hours.insert(hour, reports);
        Ok(())
    }

    /// Reports for an hour, or `None` if that hour was not fetched
    pub fn hour(&self, hour: u8) -> Option<&[Report]> {
        self.hours.get(&hour).map(Vec::as_slice)
    }

    pub fn contains_hour(&self, hour: u8) -> bool {
        self.hours.contains_key(&hour)
    }

    /// Hour indices that are present, ascending
    pub fn hours_present(&self) -> impl Iterator<Item = u8> + '_ {
        self.hours.keys().copied()
    }

    pub fn total_reports(&self) -> usize {
        self.hours.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.hours.is_empty()
    }
}

impl TryFrom<BTreeMap<u8, Vec<Report>>> for Snapshot {
    type Error = TrackingError;

    fn try_from(hours: BTreeMap<u8, Vec<Report>>) -> Result<Self> {
        Self::from_hours(hours)
    }
}

impl From<Snapshot> for BTreeMap<u8, Vec<Report>> {
    fn from(snapshot: Snapshot) -> Self {
        snapshot.hours
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_rejects_hour_outside_window() {
        let mut snapshot = Snapshot::new();
        assert!(snapshot.insert(23, vec![]).is_ok());
        assert!(matches!(
            snapshot.insert(24, vec![]),
            Err(TrackingError::HourOutOfWindow(24))
        ));
    }

    #[test]
    fn test_missing_hours_are_absent() {
        let snapshot = Snapshot::from_hours([
            (0, vec![Report::new(10.0, 20.0, 15.0)]),
            (3, vec![]),
        ])
        .unwrap();

        assert!(snapshot.contains_hour(0));
        assert!(!snapshot.contains_hour(1));
        assert_eq!(snapshot.hour(3), Some(&[][..]));
        assert_eq!(snapshot.hours_present().collect::<Vec<_>>(), vec![0, 3]);
        assert_eq!(snapshot.total_reports(), 1);
    }

    #[test]
    fn test_deserialize_from_feed_shape() {
        let json = r#"{"0": [[10.5, -20.25, 14.2], [1.0, 2.0, 3.0]], "5": []}"#;
        let snapshot: Snapshot = serde_json::from_str(json).unwrap();

        let hour0 = snapshot.hour(0).unwrap();
        assert_eq!(hour0.len(), 2);
        assert_eq!(hour0[0], Report::new(10.5, -20.25, 14.2));
        assert!(snapshot.contains_hour(5));
    }

    #[test]
    fn test_deserialize_rejects_out_of_window_hour() {
        let json = r#"{"30": [[1.0, 2.0, 3.0]]}"#;
        assert!(serde_json::from_str::<Snapshot>(json).is_err());
    }
}
