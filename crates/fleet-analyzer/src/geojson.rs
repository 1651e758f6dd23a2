//! GeoJSON export of reconstructed flight paths

use crate::FleetResult;
use balloon_tracking::Balloon;
use serde_json::{json, Value};

fn geometry(balloon: &Balloon) -> Value {
    let coordinates: Vec<[f64; 2]> = balloon
        .path
        .iter()
        .map(|p| [p.longitude, p.latitude])
        .collect();

    match coordinates.as_slice() {
        [single] => json!({ "type": "Point", "coordinates": single }),
        _ => json!({ "type": "LineString", "coordinates": coordinates }),
    }
}

/// One feature per balloon with a path, newest position first
pub fn to_geojson(result: &FleetResult) -> Value {
    let features: Vec<Value> = result
        .balloons
        .iter()
        .filter(|b| b.is_active())
        .map(|b| {
            let velocity = b.current_velocity();
            json!({
                "type": "Feature",
                "geometry": geometry(b),
                "properties": {
                    "id": b.id,
                    "points": b.path.len(),
                    "current_speed_kmph": velocity.map(|v| v.speed_kmph),
                    "current_bearing_deg": velocity.map(|v| v.bearing_deg)
                }
            })
        })
        .collect();

    json!({
        "type": "FeatureCollection",
        "features": features,
        "metadata": result.data_quality
    })
}
