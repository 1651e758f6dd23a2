//! Data loading from JSON files

use crate::feed::{parse_feed_payload, reports_from_values};
use crate::{AnalyzerError, Result};
use balloon_tracking::{Snapshot, WINDOW_HOURS};
use conflict_analysis::airspace::parse_states_response;
use conflict_analysis::AircraftState;
use serde_json::Value;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;
use tracing::{info, warn};

/// Load a snapshot from a file or a directory
///
/// A directory is read like the live feed: one `HH.json` payload per hour,
/// each decoded leniently. A file must hold a JSON object mapping hour
/// indices to report arrays.
pub fn load_snapshot(path: impl AsRef<Path>) -> Result<Snapshot> {
    let path = path.as_ref();
    if path.is_dir() {
        load_snapshot_dir(path)
    } else {
        load_snapshot_file(path)
    }
}

/// Load `{"0": [[lat, lon, alt], ...], "1": [...], ...}`
pub fn load_snapshot_file(path: impl AsRef<Path>) -> Result<Snapshot> {
    let path = path.as_ref();
    info!("Loading snapshot from {:?}", path);

    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let raw: Value = serde_json::from_reader(reader)?;

    let Some(hours) = raw.as_object() else {
        return Err(AnalyzerError::UnrecognizedFormat(
            "snapshot file must be a JSON object keyed by hour".to_string(),
        ));
    };

    let mut snapshot = Snapshot::new();
    for (key, value) in hours {
        let hour: u8 = key.trim().parse().map_err(|_| {
            AnalyzerError::UnrecognizedFormat(format!("hour key {:?} is not an integer", key))
        })?;
        let Some(entries) = value.as_array() else {
            warn!("Hour {} is not an array; treating as missing", hour);
            continue;
        };
        snapshot.insert(hour, reports_from_values(entries))?;
    }

    info!(
        "Loaded {} reports across {} hours",
        snapshot.total_reports(),
        snapshot.hours_present().count()
    );

    Ok(snapshot)
}

/// Load `00.json` .. `23.json` payloads from a directory; absent or
/// unreadable hours are left missing
pub fn load_snapshot_dir(dir: impl AsRef<Path>) -> Result<Snapshot> {
    let dir = dir.as_ref();
    info!("Loading hourly payloads from {:?}", dir);

    let mut snapshot = Snapshot::new();
    for hour in 0..WINDOW_HOURS {
        let path = dir.join(format!("{:02}.json", hour));
        if !path.exists() {
            continue;
        }
        let text = fs::read_to_string(&path)?;
        match parse_feed_payload(&text) {
            Some(reports) => snapshot.insert(hour, reports)?,
            None => warn!("Hour {:02} payload unreadable; treating as missing", hour),
        }
    }

    info!(
        "Loaded {} reports across {} hours",
        snapshot.total_reports(),
        snapshot.hours_present().count()
    );

    Ok(snapshot)
}

/// Load aircraft states
///
/// Accepts either a JSON array of aircraft objects or a raw OpenSky
/// `states/all` response.
pub fn load_aircraft(path: impl AsRef<Path>) -> Result<Vec<AircraftState>> {
    let path = path.as_ref();
    info!("Loading aircraft from {:?}", path);

    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let raw: Value = serde_json::from_reader(reader)?;

    let aircraft: Vec<AircraftState> = if raw.get("states").is_some() {
        parse_states_response(&raw)
    } else if raw.is_array() {
        serde_json::from_value(raw)?
    } else {
        return Err(AnalyzerError::UnrecognizedFormat(
            "aircraft file must be an array or a states response".to_string(),
        ));
    };

    info!("Loaded {} aircraft", aircraft.len());

    Ok(aircraft)
}

#[cfg(test)]
mod tests {
    use super::*;
    use balloon_tracking::Report;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn test_load_snapshot_file() {
        let json = r#"{
            "0": [[10.0, 20.0, 15.0], [11.0, 21.0, null]],
            "2": [[null, 1.0, 2.0]],
            "3": "not an array"
        }"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let snapshot = load_snapshot(file.path()).unwrap();
        assert_eq!(
            snapshot.hour(0).unwrap(),
            &[Report::new(10.0, 20.0, 15.0), Report::new(11.0, 21.0, 0.0)]
        );
        assert_eq!(snapshot.hour(2), Some(&[][..]));
        assert!(!snapshot.contains_hour(3));
    }

    #[test]
    fn test_load_snapshot_file_rejects_bad_hour() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"99": []}"#).unwrap();
        assert!(matches!(
            load_snapshot_file(file.path()),
            Err(AnalyzerError::Snapshot(_))
        ));

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"[[1.0, 2.0, 3.0]]"#).unwrap();
        assert!(matches!(
            load_snapshot_file(file.path()),
            Err(AnalyzerError::UnrecognizedFormat(_))
        ));
    }

    #[test]
    fn test_load_snapshot_dir() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("00.json"), "[[1.0, 2.0, 3.0]]").unwrap();
        fs::write(dir.path().join("01.json"), "[1.5, 2.0, 3.0]]").unwrap();
        fs::write(dir.path().join("02.json"), "<html>502</html>").unwrap();

        let snapshot = load_snapshot(dir.path()).unwrap();
        assert_eq!(snapshot.hours_present().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(snapshot.hour(1).unwrap(), &[Report::new(1.5, 2.0, 3.0)]);
    }

    #[test]
    fn test_load_aircraft_array() {
        let json = r#"[
            {"callsign": "DAL1", "latitude": 1.0, "longitude": 2.0, "altitude": 9000.0},
            {"callsign": "NOPOS", "altitude": 9000.0}
        ]"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let aircraft = load_aircraft(file.path()).unwrap();
        assert_eq!(aircraft.len(), 2);
        assert!(aircraft[1].position().is_none());
    }

    #[test]
    fn test_load_aircraft_states_response() {
        let json = r#"{"time": 0, "states": [
            ["a1", "OK1 ", "X", 0, 0, 10.0, 20.0, 9000.0, false, 0, 0, 0, null, null, null, false, 0]
        ]}"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let aircraft = load_aircraft(file.path()).unwrap();
        assert_eq!(aircraft.len(), 1);
        assert_eq!(aircraft[0].callsign, "OK1");
    }
}
