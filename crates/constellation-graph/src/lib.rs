//! Constellation Graph
//!
//! Undirected proximity graph over the balloon fleet:
//!
//! - One node per balloon, carrying its current position (if any)
//! - One edge per pair of balloons currently closer than the link threshold
//! - Connected-component and density statistics
//! - Export to visualization formats (Cytoscape)
//!
//! The graph is rebuilt from scratch on every request; nothing persists.
//! Pairwise distances are computed exhaustively (O(n²)), which is fine at
//! fleet sizes of a few thousand balloons.

use balloon_tracking::{Balloon, Position};
use petgraph::algo::connected_components;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

pub mod export;

/// Balloons closer than this (km) are linked
pub const LINK_THRESHOLD_KM: f64 = 500.0;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Balloon not found: {0}")]
    BalloonNotFound(usize),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GraphConfig {
    pub link_threshold_km: f64,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            link_threshold_km: LINK_THRESHOLD_KM,
        }
    }
}

/// A balloon in the graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalloonNode {
    pub id: usize,
    /// `None` for balloons with an empty path; such nodes are never linked
    pub position: Option<Position>,
}

/// An edge between two balloons within range of each other
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProximityLink {
    pub distance_km: f64,
}

/// The proximity graph
pub struct ConstellationGraph {
    graph: UnGraph<BalloonNode, ProximityLink>,
    node_index: HashMap<usize, NodeIndex>,
}

impl ConstellationGraph {
    /// Link every pair `(i, j)`, `i < j`, whose current positions are closer
    /// than the threshold
    pub fn build(balloons: &[Balloon], config: &GraphConfig) -> Self {
        let mut graph: UnGraph<BalloonNode, ProximityLink> =
            UnGraph::with_capacity(balloons.len(), 0);
        let mut node_index = HashMap::with_capacity(balloons.len());

        let nodes: Vec<NodeIndex> = balloons
            .iter()
            .map(|balloon| {
                let idx = graph.add_node(BalloonNode {
                    id: balloon.id,
                    position: balloon.current_position().copied(),
                });
                node_index.insert(balloon.id, idx);
                idx
            })
            .collect();

        for i in 0..nodes.len() {
            let Some(pos_i) = graph[nodes[i]].position else {
                continue;
            };
            for j in (i + 1)..nodes.len() {
                let Some(pos_j) = graph[nodes[j]].position else {
                    continue;
                };
                let distance_km = pos_i.distance_km(&pos_j);
                if distance_km < config.link_threshold_km {
                    graph.add_edge(nodes[i], nodes[j], ProximityLink { distance_km });
                }
            }
        }

        debug!(
            "Constellation graph: {} balloons, {} links",
            graph.node_count(),
            graph.edge_count()
        );

        Self { graph, node_index }
    }

    /// Links as `[i, j]` balloon id pairs, in ascending `(i, j)` order
    pub fn links(&self) -> Vec<[usize; 2]> {
        self.graph
            .edge_references()
            .map(|e| [self.graph[e.source()].id, self.graph[e.target()].id])
            .collect()
    }

    pub fn link_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Get a node by balloon id
    pub fn get_node(&self, id: usize) -> Option<&BalloonNode> {
        self.node_index.get(&id).map(|idx| &self.graph[*idx])
    }

    pub fn nodes(&self) -> impl Iterator<Item = &BalloonNode> {
        self.graph.node_weights()
    }

    /// All links with their endpoints
    pub fn edges(&self) -> impl Iterator<Item = (&BalloonNode, &BalloonNode, &ProximityLink)> {
        self.graph.edge_references().map(move |e| {
            (&self.graph[e.source()], &self.graph[e.target()], e.weight())
        })
    }

    /// Balloon ids linked to `id`, ascending
    pub fn neighbors(&self, id: usize) -> Result<Vec<usize>> {
        let idx = self
            .node_index
            .get(&id)
            .ok_or(GraphError::BalloonNotFound(id))?;

        let mut ids: Vec<usize> = self
            .graph
            .neighbors(*idx)
            .map(|n| self.graph[n].id)
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }

    /// Get graph statistics
    pub fn stats(&self) -> GraphStats {
        let total_nodes = self.graph.node_count();
        let positioned_nodes = self.nodes().filter(|n| n.position.is_some()).count();
        let total_links = self.graph.edge_count();

        // Unpositioned nodes are always their own component
        let clusters = connected_components(&self.graph) - (total_nodes - positioned_nodes);

        let isolated_balloons = self
            .graph
            .node_indices()
            .filter(|idx| self.graph[*idx].position.is_some())
            .filter(|idx| self.graph.neighbors(*idx).next().is_none())
            .count();

        let density = if positioned_nodes > 1 {
            let possible = positioned_nodes * (positioned_nodes - 1) / 2;
            total_links as f64 / possible as f64
        } else {
            0.0
        };

        GraphStats {
            total_nodes,
            positioned_nodes,
            total_links,
            clusters,
            isolated_balloons,
            density,
        }
    }
}

/// Graph statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphStats {
    pub total_nodes: usize,
    pub positioned_nodes: usize,
    pub total_links: usize,
    /// Connected components among positioned balloons
    pub clusters: usize,
    pub isolated_balloons: usize,
    pub density: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use balloon_tracking::geodesy::EARTH_RADIUS_KM;
    use balloon_tracking::Velocity;

    fn balloon_at(id: usize, lat: f64, lon: f64) -> Balloon {
        Balloon {
            id,
            path: vec![Position::new(lat, lon)],
            velocities: vec![Velocity::STATIONARY],
        }
    }

    fn unpositioned(id: usize) -> Balloon {
        Balloon {
            id,
            path: vec![],
            velocities: vec![],
        }
    }

    /// Longitude offset on the equator that is `km` away from the origin
    fn lon_for_km(km: f64) -> f64 {
        (km / EARTH_RADIUS_KM).to_degrees()
    }

    #[test]
    fn test_link_threshold_boundary() {
        let near = vec![balloon_at(0, 0.0, 0.0), balloon_at(1, 0.0, lon_for_km(499.0))];
        let graph = ConstellationGraph::build(&near, &GraphConfig::default());
        assert_eq!(graph.links(), vec![[0, 1]]);

        let far = vec![balloon_at(0, 0.0, 0.0), balloon_at(1, 0.0, lon_for_km(501.0))];
        let graph = ConstellationGraph::build(&far, &GraphConfig::default());
        assert!(graph.links().is_empty());
    }

    #[test]
    fn test_links_are_ordered_and_never_self() {
        let balloons = vec![
            balloon_at(0, 0.0, 0.0),
            balloon_at(1, 0.0, 1.0),
            balloon_at(2, 0.0, 2.0),
            balloon_at(3, 50.0, 50.0),
        ];
        let graph = ConstellationGraph::build(&balloons, &GraphConfig::default());

        assert_eq!(graph.links(), vec![[0, 1], [0, 2], [1, 2]]);
        assert!(graph.links().iter().all(|[i, j]| i < j));
    }

    #[test]
    fn test_coincident_balloons_are_linked() {
        let balloons = vec![balloon_at(0, 10.0, 10.0), balloon_at(1, 10.0, 10.0)];
        let graph = ConstellationGraph::build(&balloons, &GraphConfig::default());
        assert_eq!(graph.links(), vec![[0, 1]]);
    }

    #[test]
    fn test_unpositioned_balloons_never_linked() {
        let balloons = vec![balloon_at(0, 0.0, 0.0), unpositioned(1), balloon_at(2, 0.0, 0.5)];
        let graph = ConstellationGraph::build(&balloons, &GraphConfig::default());

        assert_eq!(graph.links(), vec![[0, 2]]);
        assert!(graph.neighbors(1).unwrap().is_empty());
        assert!(graph.get_node(1).unwrap().position.is_none());
    }

    #[test]
    fn test_neighbors_unknown_balloon() {
        let graph = ConstellationGraph::build(&[], &GraphConfig::default());
        assert!(matches!(graph.neighbors(4), Err(GraphError::BalloonNotFound(4))));
    }

    #[test]
    fn test_stats() {
        let balloons = vec![
            balloon_at(0, 0.0, 0.0),
            balloon_at(1, 0.0, 1.0),
            balloon_at(2, 60.0, 60.0),
            unpositioned(3),
        ];
        let graph = ConstellationGraph::build(&balloons, &GraphConfig::default());
        let stats = graph.stats();

        assert_eq!(stats.total_nodes, 4);
        assert_eq!(stats.positioned_nodes, 3);
        assert_eq!(stats.total_links, 1);
        assert_eq!(stats.clusters, 2);
        assert_eq!(stats.isolated_balloons, 1);
        assert!((stats.density - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_custom_threshold() {
        let balloons = vec![balloon_at(0, 0.0, 0.0), balloon_at(1, 0.0, 1.0)];
        let config = GraphConfig {
            link_threshold_km: 100.0,
        };
        assert!(ConstellationGraph::build(&balloons, &config).links().is_empty());
    }
}
