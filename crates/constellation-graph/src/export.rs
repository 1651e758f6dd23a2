//! Graph export formats for visualization
//!
//! Supports:
//! - Cytoscape.js format

use crate::{ConstellationGraph, Result};
use serde::{Deserialize, Serialize};

/// Cytoscape.js element format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CytoscapeElement {
    pub data: CytoscapeData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<CytoscapePosition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CytoscapeData {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degree: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CytoscapePosition {
    pub x: f64,
    pub y: f64,
}

/// Link distance to color
fn distance_to_color(distance_km: f64) -> String {
    if distance_km < 100.0 {
        "#ef4444".to_string() // Red
    } else if distance_km < 250.0 {
        "#f97316".to_string() // Orange
    } else {
        "#22c55e".to_string() // Green
    }
}

fn node_id(id: usize) -> String {
    format!("balloon-{}", id)
}

impl ConstellationGraph {
    /// Export to Cytoscape.js format
    ///
    /// Balloons without a position are omitted.
    pub fn to_cytoscape(&self) -> Vec<CytoscapeElement> {
        let mut elements = Vec::new();

        for node in self.nodes() {
            let Some(position) = node.position else {
                continue;
            };
            let degree = self.neighbors(node.id).map(|n| n.len()).unwrap_or(0);

            // Equirectangular projection
            let x = (position.longitude + 180.0) * 3.0;
            let y = (90.0 - position.latitude) * 3.0;

            elements.push(CytoscapeElement {
                data: CytoscapeData {
                    id: node_id(node.id),
                    label: Some(format!("Balloon {}", node.id)),
                    source: None,
                    target: None,
                    color: Some(if degree == 0 { "#6b7280" } else { "#3b82f6" }.to_string()),
                    distance_km: None,
                    degree: Some(degree),
                },
                position: Some(CytoscapePosition { x, y }),
                classes: Some("balloon".to_string()),
            });
        }

        for (source, target, link) in self.edges() {
            elements.push(CytoscapeElement {
                data: CytoscapeData {
                    id: format!("link-{}-{}", source.id, target.id),
                    label: None,
                    source: Some(node_id(source.id)),
                    target: Some(node_id(target.id)),
                    color: Some(distance_to_color(link.distance_km)),
                    distance_km: Some(link.distance_km),
                    degree: None,
                },
                position: None,
                classes: Some("proximity".to_string()),
            });
        }

        elements
    }

    /// Export to JSON string (Cytoscape format)
    pub fn to_cytoscape_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_cytoscape())?)
    }
}
