//! Balloon Fleet Analyzer
//!
//! Runs the full analysis for one request:
//!
//! ```text
//! Snapshot ──► TrackBuilder ──► PathSynthesizer ──► balloons
//!                                                     │
//!                  ┌──────────────────┬───────────────┼──────────────────┐
//!                  ▼                  ▼               ▼                  ▼
//!          ConstellationGraph  ConflictAnalyzer  FlightPatternAnalyzer  data quality
//! ```
//!
//! The pipeline is synchronous and deterministic: identical inputs produce
//! byte-identical serialized output. Partial input (missing hours, no hour 0,
//! aircraft without positions) degrades to a smaller result, never an error.

use balloon_tracking::{
    Balloon, FlightInsights, FlightPatternAnalyzer, PathSynthesizer, PatternConfig, Snapshot,
    TrackBuilder, TrackerConfig, TrackingError,
};
use conflict_analysis::{AircraftState, ConflictAnalyzer, ConflictConfig, SafetyAnalysis};
use constellation_graph::{ConstellationGraph, GraphConfig, GraphStats};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

pub mod feed;
pub mod geojson;
pub mod loader;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] TrackingError),
    #[error("Unrecognized input format: {0}")]
    UnrecognizedFormat(String),
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;

/// Per-component tuning; defaults are the standard thresholds
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOptions {
    pub tracker: TrackerConfig,
    pub graph: GraphConfig,
    pub conflict: ConflictConfig,
    pub patterns: PatternConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataQuality {
    pub total_balloons: usize,
    pub total_aircraft: usize,
    pub constellation_links: usize,
}

/// The complete hand-off to the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetResult {
    pub balloons: Vec<Balloon>,
    /// `[i, j]` balloon id pairs, `i < j`
    pub constellation: Vec<[usize; 2]>,
    pub constellation_stats: GraphStats,
    /// Present only when at least one aircraft state was supplied
    pub safety_analysis: Option<SafetyAnalysis>,
    pub insights: FlightInsights,
    pub data_quality: DataQuality,
}

#[derive(Default)]
pub struct FleetAnalyzer {
    options: AnalysisOptions,
}

impl FleetAnalyzer {
    pub fn new(options: AnalysisOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    /// Reconstruct balloons from a snapshot window
    pub fn balloons(&self, snapshot: &Snapshot) -> Vec<Balloon> {
        let tracks = TrackBuilder::new(self.options.tracker).build(snapshot);
        PathSynthesizer::synthesize_all(&tracks)
    }

    pub fn graph(&self, balloons: &[Balloon]) -> ConstellationGraph {
        ConstellationGraph::build(balloons, &self.options.graph)
    }

    /// Run the whole pipeline
    pub fn analyze(&self, snapshot: &Snapshot, aircraft: &[AircraftState]) -> FleetResult {
        let balloons = self.balloons(snapshot);
        self.analyze_balloons(balloons, aircraft)
    }

    /// Run everything downstream of track reconstruction
    pub fn analyze_balloons(
        &self,
        balloons: Vec<Balloon>,
        aircraft: &[AircraftState],
    ) -> FleetResult {
        let graph = self.graph(&balloons);
        self.analyze_with_graph(balloons, &graph, aircraft)
    }

    /// Like [`analyze_balloons`](Self::analyze_balloons), reusing a graph
    /// already built from `balloons`
    pub fn analyze_with_graph(
        &self,
        balloons: Vec<Balloon>,
        graph: &ConstellationGraph,
        aircraft: &[AircraftState],
    ) -> FleetResult {
        let constellation = graph.links();
        let constellation_stats = graph.stats();

        let insights =
            FlightPatternAnalyzer::new(self.options.patterns).analyze(&balloons, constellation.len());

        let safety_analysis = if aircraft.is_empty() {
            None
        } else {
            Some(ConflictAnalyzer::new(self.options.conflict).analyze(&balloons, aircraft))
        };

        let data_quality = DataQuality {
            total_balloons: balloons.len(),
            total_aircraft: aircraft.len(),
            constellation_links: constellation.len(),
        };

        info!(
            "Fleet analysis: {} balloons ({} active), {} links, {} aircraft",
            data_quality.total_balloons,
            insights.active_balloons,
            data_quality.constellation_links,
            data_quality.total_aircraft
        );

        FleetResult {
            balloons,
            constellation,
            constellation_stats,
            safety_analysis,
            insights,
            data_quality,
        }
    }
}

/// Run the pipeline with default thresholds
pub fn analyze_fleet(snapshot: &Snapshot, aircraft: &[AircraftState]) -> FleetResult {
    FleetAnalyzer::default().analyze(snapshot, aircraft)
}
