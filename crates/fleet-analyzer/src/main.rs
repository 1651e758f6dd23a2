//! Balloon Fleet Analysis CLI
//!
//! Reconstructs balloon tracks from a 24-hour snapshot and reports the
//! constellation, airspace safety and flight pattern results.
//!
//! Usage:
//!   analyze-fleet --snapshot data/snapshot.json \
//!                 --aircraft data/aircraft.json \
//!                 --output data/fleet_analysis.json --geojson

use anyhow::Result;
use balloon_tracking::tracker::MATCH_THRESHOLD_KM;
use clap::Parser;
use constellation_graph::LINK_THRESHOLD_KM;
use fleet_analyzer::{geojson, loader, AnalysisOptions, FleetAnalyzer};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(
    name = "analyze-fleet",
    about = "Reconstruct balloon flight paths and assess constellation and airspace safety"
)]
struct Args {
    /// Snapshot JSON file (hour -> reports) or directory of HH.json payloads
    #[arg(short, long, default_value = "data/snapshot.json")]
    snapshot: PathBuf,

    /// Aircraft JSON file (array of states or an OpenSky states response)
    #[arg(short, long)]
    aircraft: Option<PathBuf>,

    /// Output JSON file
    #[arg(short, long, default_value = "data/fleet_analysis.json")]
    output: PathBuf,

    /// Also output GeoJSON flight paths
    #[arg(long)]
    geojson: bool,

    /// Also output the constellation as Cytoscape elements
    #[arg(long)]
    cytoscape: bool,

    /// Maximum hour-to-hour jump when matching reports, in km
    #[arg(long, default_value_t = MATCH_THRESHOLD_KM)]
    match_km: f64,

    /// Maximum separation for a constellation link, in km
    #[arg(long, default_value_t = LINK_THRESHOLD_KM)]
    link_km: f64,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("{}", "=".repeat(60));
    info!("Balloon Fleet Analyzer");
    info!("{}", "=".repeat(60));

    let snapshot = loader::load_snapshot(&args.snapshot)?;
    let aircraft = match &args.aircraft {
        Some(path) => loader::load_aircraft(path)?,
        None => Vec::new(),
    };

    let mut options = AnalysisOptions::default();
    options.tracker.match_threshold_km = args.match_km;
    options.graph.link_threshold_km = args.link_km;
    let analyzer = FleetAnalyzer::new(options);

    let balloons = analyzer.balloons(&snapshot);
    let graph = analyzer.graph(&balloons);
    let result = analyzer.analyze_with_graph(balloons, &graph, &aircraft);

    info!("\nWriting output to {:?}", args.output);
    let file = File::create(&args.output)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &result)?;

    if args.geojson {
        let geojson_path = args.output.with_extension("geojson");
        info!("Writing GeoJSON to {:?}", geojson_path);
        let file = File::create(&geojson_path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &geojson::to_geojson(&result))?;
    }

    if args.cytoscape {
        let cytoscape_path = args.output.with_extension("cytoscape.json");
        info!("Writing Cytoscape elements to {:?}", cytoscape_path);
        std::fs::write(&cytoscape_path, graph.to_cytoscape_json()?)?;
    }

    info!("\n{}", "=".repeat(60));
    info!("SUMMARY");
    info!("{}", "=".repeat(60));
    info!(
        "Balloons: {} ({} active)",
        result.insights.total_balloons, result.insights.active_balloons
    );
    info!(
        "Constellation: {} links, {} clusters, {} isolated",
        result.constellation_stats.total_links,
        result.constellation_stats.clusters,
        result.constellation_stats.isolated_balloons
    );
    info!(
        "Average speed: {:.1} km/h, density {:.3}",
        result.insights.avg_speed, result.insights.constellation_density
    );
    match &result.safety_analysis {
        Some(safety) => info!(
            "Airspace: {} aircraft, {} near misses, {} zones violated, {} altitude conflicts",
            result.data_quality.total_aircraft,
            safety.near_misses.len(),
            safety.safety_zones_violated,
            safety.altitude_conflicts
        ),
        None => info!("Airspace: no aircraft supplied"),
    }

    Ok(())
}
