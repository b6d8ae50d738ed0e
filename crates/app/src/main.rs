//! Headless flood overlay runner.
//!
//! Loads a simulation result and the drainage network, runs the overlay
//! animation for a fixed time, and writes every frame's feature collections
//! into an output directory.
//!
//! ```text
//! flood-heatmap <vulnerability.json> <pipes.geojson> <nodes.geojson>...
//! ```
//!
//! Environment: `FLOOD_OVERLAY_OUT` (output dir, default `./flood-overlay-out`),
//! `FLOOD_OVERLAY_SECONDS` (run time, default 10), `FLOOD_OVERLAY_CONFIG`
//! (optional JSON config file).

mod dir_sink;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;

use flood_overlay::geojson::FeatureCollection;
use flood_overlay::records::parse_records;
use flood_overlay::topology::{nodes_from_collection, GeoJsonFileTopology};
use flood_overlay::{
    DisableFloodOverlay, EnableFloodOverlay, FloodOverlayPlugin, NodeCoordinates, OverlayConfig,
    OverlayError, RenderSink, SinkFactory, VulnerabilityRecord,
};

use dir_sink::GeoJsonDirSink;

const DEFAULT_OUT_DIR: &str = "./flood-overlay-out";
const DEFAULT_RUN_SECONDS: f64 = 10.0;

struct Args {
    records: PathBuf,
    pipes: PathBuf,
    nodes: Vec<PathBuf>,
}

fn parse_args() -> Option<Args> {
    let mut args = std::env::args().skip(1).map(PathBuf::from);
    let records = args.next()?;
    let pipes = args.next()?;
    let nodes: Vec<PathBuf> = args.collect();
    if nodes.is_empty() {
        return None;
    }
    Some(Args {
        records,
        pipes,
        nodes,
    })
}

#[derive(Resource)]
struct InitialRecords(Option<Vec<VulnerabilityRecord>>);

#[derive(Resource)]
struct RunDeadline(Duration);

fn send_initial_records(
    mut initial: ResMut<InitialRecords>,
    mut enable: EventWriter<EnableFloodOverlay>,
) {
    if let Some(records) = initial.0.take() {
        enable.send(EnableFloodOverlay(records));
    }
}

/// Disable the overlay at the deadline, exit on the following frame.
fn stop_at_deadline(
    time: Res<Time>,
    deadline: Res<RunDeadline>,
    mut disabled: Local<bool>,
    mut disable: EventWriter<DisableFloodOverlay>,
    mut exit: EventWriter<AppExit>,
) {
    if time.elapsed() < deadline.0 {
        return;
    }
    if *disabled {
        exit.send(AppExit::Success);
    } else {
        disable.send(DisableFloodOverlay);
        *disabled = true;
    }
}

fn load_nodes(paths: &[PathBuf]) -> Result<NodeCoordinates, OverlayError> {
    let mut nodes = NodeCoordinates::default();
    for path in paths {
        let collection = FeatureCollection::from_json_str(&std::fs::read_to_string(path)?)?;
        nodes.extend(nodes_from_collection(&collection, None));
    }
    Ok(nodes)
}

fn build_app(args: Args) -> Result<App, OverlayError> {
    let config = match std::env::var("FLOOD_OVERLAY_CONFIG") {
        Ok(path) => OverlayConfig::load(path)?,
        Err(_) => OverlayConfig::default(),
    };
    let out_dir = PathBuf::from(
        std::env::var("FLOOD_OVERLAY_OUT").unwrap_or_else(|_| DEFAULT_OUT_DIR.to_string()),
    );
    let seconds = std::env::var("FLOOD_OVERLAY_SECONDS")
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|s| s.is_finite() && *s >= 0.0)
        .unwrap_or(DEFAULT_RUN_SECONDS);

    let records = parse_records(&std::fs::read_to_string(&args.records)?)?;
    let nodes = load_nodes(&args.nodes)?;
    std::fs::create_dir_all(&out_dir)?;

    let factory: SinkFactory = {
        let out_dir = out_dir.clone();
        Arc::new(move || -> Box<dyn RenderSink> { Box::new(GeoJsonDirSink::new(out_dir.clone())) })
    };

    let mut app = App::new();
    app.add_plugins(
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
            1.0 / 60.0,
        ))),
    )
    .add_plugins(LogPlugin::default())
    .add_plugins(
        FloodOverlayPlugin::new(config, factory)
            .with_topology(GeoJsonFileTopology::new(&args.pipes)),
    )
    .insert_resource(nodes)
    .insert_resource(InitialRecords(Some(records)))
    .insert_resource(RunDeadline(Duration::from_secs_f64(seconds)))
    .add_systems(Startup, send_initial_records)
    .add_systems(Update, stop_at_deadline);

    info!(
        "flood-heatmap: writing to {} for {:.1}s",
        out_dir.display(),
        seconds
    );
    Ok(app)
}

fn main() -> AppExit {
    let Some(args) = parse_args() else {
        eprintln!("usage: flood-heatmap <vulnerability.json> <pipes.geojson> <nodes.geojson>...");
        return AppExit::from_code(2);
    };
    match build_app(args) {
        Ok(mut app) => app.run(),
        Err(e) => {
            eprintln!("flood-heatmap: {e}");
            AppExit::from_code(1)
        }
    }
}
