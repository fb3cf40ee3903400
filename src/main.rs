mod app;
mod headless;

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use role_graph::LayoutConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "role_graph=info";

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// JSON snapshot holding `roles`, `relations` and `relation_types`.
    snapshot: PathBuf,

    /// JSON file overriding layout constants.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = 1280.0)]
    width: f32,

    #[arg(long, default_value_t = 800.0)]
    height: f32,

    /// Run the layout without a window and print node positions as JSON.
    #[arg(long)]
    headless: bool,

    /// Tick budget for headless mode; runs until the layout settles if
    /// omitted.
    #[arg(long, requires = "headless")]
    ticks: Option<usize>,

    /// Reload the snapshot whenever it changes on disk.
    #[arg(long, conflicts_with = "headless")]
    watch: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => LayoutConfig::from_path(path)
            .with_context(|| format!("failed to load layout config {}", path.display()))?,
        None => LayoutConfig::default(),
    };

    if args.headless {
        let stdout = std::io::stdout();
        return headless::run(
            &args.snapshot,
            config,
            (args.width, args.height),
            args.ticks,
            &mut stdout.lock(),
        );
    }

    info!(snapshot = %args.snapshot.display(), "opening window");
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([args.width, args.height]),
        ..Default::default()
    };

    let snapshot = args.snapshot;
    let watch = args.watch;
    eframe::run_native(
        "role-graph",
        options,
        Box::new(move |cc| Ok(Box::new(app::RoleGraphApp::new(cc, snapshot, config, watch)))),
    )
    .map_err(|error| anyhow!("window failed: {error}"))
}
