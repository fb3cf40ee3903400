//! Windowless layout: `--headless [--ticks N]` prints `[{id, x, y}]`.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use role_graph::{DataVersion, LayoutConfig, LayoutEngine, Node, load_snapshot};
use serde::Serialize;
use tracing::{info, warn};

/// Upper bound when no tick budget is given; the default cooling schedule
/// settles in roughly 300 ticks.
const MAX_SETTLE_TICKS: usize = 10_000;

#[derive(Debug, Serialize)]
struct NodePosition<'a> {
    id: &'a str,
    x: f32,
    y: f32,
}

pub fn run(
    snapshot_path: &Path,
    config: LayoutConfig,
    (width, height): (f32, f32),
    ticks: Option<usize>,
    out: &mut impl Write,
) -> Result<()> {
    let snapshot = load_snapshot(snapshot_path)
        .with_context(|| format!("failed to load snapshot {}", snapshot_path.display()))?;

    let mut engine = LayoutEngine::new(config);
    engine.resize(width, height);
    engine.load(&snapshot, DataVersion(1));

    let ran = settle(&mut engine, ticks.unwrap_or(MAX_SETTLE_TICKS));
    if ticks.is_none() && engine.is_running() {
        warn!(ticks = ran, "layout still moving after tick limit");
    }
    info!(ticks = ran, nodes = engine.nodes().len(), "headless layout finished");

    write_positions(engine.nodes(), out)
}

/// Ticks until the engine idles or `limit` is reached. Returns ticks run.
fn settle(engine: &mut LayoutEngine, limit: usize) -> usize {
    let mut ran = 0;
    while ran < limit && engine.tick() {
        ran += 1;
    }
    ran
}

fn write_positions(nodes: &[Node], out: &mut impl Write) -> Result<()> {
    let rows = nodes
        .iter()
        .map(|node| NodePosition {
            id: &node.id,
            x: node.position.x,
            y: node.position.y,
        })
        .collect::<Vec<_>>();
    serde_json::to_writer_pretty(&mut *out, &rows).context("failed to encode positions")?;
    writeln!(out).context("failed to write positions")?;
    Ok(())
}
