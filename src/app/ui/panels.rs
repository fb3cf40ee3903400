use std::path::Path;
use std::sync::mpsc;

use eframe::egui::{self, Align, Color32, Context, Layout, RichText};
use role_graph::{DataVersion, LayoutConfig, LayoutEngine, RenderStyle, Snapshot, ViewTransform};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn new(config: LayoutConfig) -> Self {
        let mut engine = LayoutEngine::new(config);
        let (clicked_tx, clicked_rx) = mpsc::channel();
        engine.set_on_node_click(move |id| {
            let _ = clicked_tx.send(id.to_owned());
        });

        Self {
            engine,
            clicked_rx,
            view: ViewTransform::default(),
            style: RenderStyle::default(),
            config_draft: config,
            search: String::new(),
            selected: None,
            live_physics: true,
            show_quadtree_overlay: false,
            search_match_cache: None,
            quadtree_positions: Vec::new(),
            quadtree_cells: Vec::new(),
        }
    }

    /// Feeds a snapshot to the engine. Selection survives when the role is
    /// still present.
    pub(in crate::app) fn load(&mut self, snapshot: &Snapshot, version: DataVersion) {
        if !self.engine.load(snapshot, version) {
            return;
        }
        self.search_match_cache = None;
        if let Some(selected) = &self.selected
            && self.engine.node_index(selected).is_none()
        {
            self.selected = None;
        }
        if !self.live_physics {
            self.engine.stop();
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        snapshot_path: &Path,
        reload_error: Option<&str>,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        while let Ok(clicked) = self.clicked_rx.try_recv() {
            self.set_selected(Some(clicked));
        }

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("role-graph");
                    ui.separator();
                    ui.label(format!("snapshot: {}", snapshot_path.display()));
                    ui.label(format!("roles: {}", self.engine.nodes().len()));
                    ui.label(format!("pairs: {}", self.engine.edges().len()));
                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload snapshot"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    if is_loading {
                        ui.spinner();
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(format!(
                            "{:?}  alpha {:.3}",
                            self.engine.state(),
                            self.engine.simulation().alpha()
                        ));
                        if let Some(error) = reload_error {
                            ui.label(
                                RichText::new("reload failed")
                                    .color(Color32::from_rgb(220, 53, 69)),
                            )
                            .on_hover_text(error);
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default().show(ctx, |ui| self.draw_graph(ui));
    }

    pub(in crate::app) fn set_selected(&mut self, selected: Option<String>) {
        self.selected = selected;
    }
}
