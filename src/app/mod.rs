use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use eframe::egui::{self, Context, Vec2};
use role_graph::physics::QuadtreeCell;
use role_graph::{
    DataVersion, LayoutConfig, LayoutEngine, RenderStyle, Snapshot, ViewTransform, load_snapshot,
};
use tracing::{debug, info, warn};

mod graph;
mod render_utils;
mod ui;
mod watch;

use watch::SnapshotWatch;

type LoadResult = Result<Snapshot, String>;

pub struct RoleGraphApp {
    snapshot_path: PathBuf,
    config: LayoutConfig,
    state: AppState,
    reload_rx: Option<Receiver<LoadResult>>,
    reload_error: Option<String>,
    watch: Option<SnapshotWatch>,
    reload_pending: bool,
    next_version: u64,
}

enum AppState {
    Loading { rx: Receiver<LoadResult> },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    engine: LayoutEngine,
    clicked_rx: Receiver<String>,
    view: ViewTransform,
    style: RenderStyle,
    config_draft: LayoutConfig,
    search: String,
    selected: Option<String>,
    live_physics: bool,
    show_quadtree_overlay: bool,
    search_match_cache: Option<SearchMatchCache>,
    quadtree_positions: Vec<Vec2>,
    quadtree_cells: Vec<QuadtreeCell>,
}

struct SearchMatchCache {
    query: String,
    version: Option<DataVersion>,
    matches: HashSet<usize>,
}

impl RoleGraphApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        snapshot_path: PathBuf,
        config: LayoutConfig,
        watch: bool,
    ) -> Self {
        let state = Self::start_load(&snapshot_path);
        let watch = if watch {
            SnapshotWatch::start(&snapshot_path, cc.egui_ctx.clone())
                .inspect_err(|error| warn!("snapshot watch disabled: {error:#}"))
                .ok()
        } else {
            None
        };
        Self {
            snapshot_path,
            config,
            state,
            reload_rx: None,
            reload_error: None,
            watch,
            reload_pending: false,
            next_version: 0,
        }
    }

    fn spawn_load(snapshot_path: PathBuf) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_snapshot(&snapshot_path)
                .map_err(|error| format!("{:#}", anyhow::Error::new(error)));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(snapshot_path: &Path) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(snapshot_path.to_path_buf()),
        }
    }

    fn next_version(&mut self) -> DataVersion {
        self.next_version += 1;
        DataVersion(self.next_version)
    }

    /// Starts a reload once the watcher saw the snapshot change. Changes
    /// arriving during a reload queue one more reload after it.
    fn poll_watch(&mut self) {
        let Some(watch) = self.watch.as_ref() else {
            return;
        };
        if watch.take_changes() {
            debug!(path = %self.snapshot_path.display(), "snapshot changed on disk");
            self.reload_pending = true;
        }
        if self.reload_pending && self.reload_rx.is_none() {
            self.reload_pending = false;
            self.reload_rx = Some(Self::spawn_load(self.snapshot_path.clone()));
        }
    }
}

impl eframe::App for RoleGraphApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(Ok(snapshot)) => {
                        let mut model = ViewModel::new(self.config);
                        self.next_version += 1;
                        model.load(&snapshot, DataVersion(self.next_version));
                        transition = Some(AppState::Ready(Box::new(model)));
                    }
                    Ok(Err(error)) => transition = Some(AppState::Error(error)),
                    Err(TryRecvError::Empty) => {}
                    Err(TryRecvError::Disconnected) => {
                        transition =
                            Some(AppState::Error("Background load worker disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading role snapshot...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
                ctx.request_repaint_after(Duration::from_millis(50));
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load role snapshot");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(&self.snapshot_path));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(
                    ctx,
                    &self.snapshot_path,
                    self.reload_error.as_deref(),
                    &mut reload_requested,
                    is_reloading,
                );

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.snapshot_path.clone()));
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
            return;
        }

        if matches!(self.state, AppState::Ready(_)) {
            self.poll_watch();
            self.poll_reload(ctx);
        }
    }
}

impl RoleGraphApp {
    /// Hands a finished background reload to the engine. A failed reload
    /// keeps the last good layout on screen.
    fn poll_reload(&mut self, ctx: &Context) {
        let Some(rx) = self.reload_rx.take() else {
            return;
        };

        match rx.try_recv() {
            Ok(Ok(snapshot)) => {
                let version = self.next_version();
                self.reload_error = None;
                if let AppState::Ready(model) = &mut self.state {
                    model.load(&snapshot, version);
                }
                ctx.request_repaint();
            }
            Ok(Err(error)) => {
                warn!(%error, "snapshot reload failed, keeping previous data");
                self.reload_error = Some(error);
            }
            Err(TryRecvError::Empty) => {
                self.reload_rx = Some(rx);
                ctx.request_repaint_after(Duration::from_millis(50));
            }
            Err(TryRecvError::Disconnected) => {
                self.reload_error = Some("Background load worker disconnected".to_owned());
            }
        }
    }
}

impl Drop for RoleGraphApp {
    fn drop(&mut self) {
        if let AppState::Ready(model) = &mut self.state {
            model.engine.stop();
            info!("layout engine stopped");
        }
    }
}
