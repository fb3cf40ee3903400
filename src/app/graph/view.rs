use std::collections::HashSet;

use eframe::egui::{self, Align2, Color32, FontId, Painter, Rect, Sense, Stroke, Ui, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use role_graph::Highlight;
use role_graph::physics::quadtree_cells;
use role_graph::render::edge_tooltip;

use super::super::render_utils::{distance_to_segment, draw_background, paint_command};
use super::super::{SearchMatchCache, ViewModel};

const EDGE_HOVER_DISTANCE: f32 = 4.0;

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_lowercase(), &query.to_lowercase()))
}

impl ViewModel {
    fn search_matches(&mut self) -> HashSet<usize> {
        let query = self.search.trim();
        if query.is_empty() {
            return HashSet::new();
        }

        let version = self.engine.version();
        if let Some(cached) = &self.search_match_cache
            && cached.version == version
            && cached.query == query
        {
            return cached.matches.clone();
        }

        let matcher = SkimMatcherV2::default();
        let matches = self
            .engine
            .nodes()
            .iter()
            .enumerate()
            .filter(|(_, node)| {
                fuzzy_match_score(&matcher, &node.display_name, query).is_some()
                    || fuzzy_match_score(&matcher, &node.id, query).is_some()
            })
            .map(|(index, _)| index)
            .collect::<HashSet<_>>();

        self.search_match_cache = Some(SearchMatchCache {
            query: query.to_owned(),
            version,
            matches: matches.clone(),
        });
        matches
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        self.view.origin = rect.left_top();
        self.engine.resize(rect.width(), rect.height());

        draw_background(&painter, rect, &self.view);

        self.handle_graph_zoom(ui, rect, &response);
        let node_owned = self.handle_node_pointer(ui, &response);
        self.handle_graph_pan(&response, node_owned);

        if self.engine.nodes().is_empty() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "The snapshot contains no roles.",
                FontId::proportional(14.0),
                Color32::from_gray(90),
            );
            return;
        }

        let moving = self.live_physics && self.engine.tick();
        if moving || self.engine.is_pointer_captured() {
            ui.ctx().request_repaint();
        }

        if self.show_quadtree_overlay {
            self.draw_quadtree_overlay(&painter);
        }

        let highlight = Highlight {
            selected: self
                .selected
                .as_deref()
                .and_then(|id| self.engine.node_index(id)),
            matches: self.search_matches(),
        };
        for command in self.engine.frame(&self.view, &self.style, &highlight) {
            paint_command(&painter, &command);
        }

        self.draw_hover_info(ui, &painter, rect);
    }

    fn draw_quadtree_overlay(&mut self, painter: &Painter) {
        self.quadtree_positions.clear();
        self.quadtree_positions
            .extend(self.engine.nodes().iter().map(|node| node.position));
        quadtree_cells(&self.quadtree_positions, &mut self.quadtree_cells);

        for cell in &self.quadtree_cells {
            let half = vec2(cell.half_extent, cell.half_extent);
            let min = self.view.world_to_screen(cell.center - half);
            let max = self.view.world_to_screen(cell.center + half);

            let alpha = if cell.is_leaf { 110 } else { 55 };
            let line_width = (1.4_f32 - (cell.depth as f32 * 0.09)).clamp(0.45, 1.4);
            let stroke = Stroke::new(
                line_width,
                Color32::from_rgba_unmultiplied(66, 148, 215, alpha),
            );
            painter.rect_stroke(
                Rect::from_min_max(min, max),
                0.0,
                stroke,
                egui::StrokeKind::Middle,
            );
        }
    }

    /// Hovering a role shows its summary, hovering a pair lists its relations.
    fn draw_hover_info(&self, ui: &Ui, painter: &Painter, rect: Rect) {
        let Some(pointer) = ui.input(|input| input.pointer.hover_pos()) else {
            return;
        };
        if !rect.contains(pointer) {
            return;
        }

        let world = self.view.screen_to_world(pointer);
        let text = if let Some(index) = self.engine.node_at(world) {
            ui.output_mut(|output| {
                output.cursor_icon = if self.engine.is_pointer_captured() {
                    egui::CursorIcon::Grabbing
                } else {
                    egui::CursorIcon::PointingHand
                };
            });
            let node = &self.engine.nodes()[index];
            let relation_count = self
                .engine
                .edges()
                .iter()
                .filter(|edge| {
                    let (a, b) = edge.endpoints();
                    a == index || b == index
                })
                .count();
            let faction = node
                .faction_id
                .map_or_else(|| "no faction".to_owned(), |faction| format!("faction {faction}"));
            format!("{}  |  {faction}  |  {relation_count} relations", node.display_name)
        } else {
            let nodes = self.engine.nodes();
            let hovered_edge = self
                .engine
                .edges()
                .iter()
                .map(|edge| {
                    let (a, b) = edge.endpoints();
                    let start = self.view.world_to_screen(nodes[a].position);
                    let end = self.view.world_to_screen(nodes[b].position);
                    (edge, distance_to_segment(pointer, start, end))
                })
                .filter(|(_, distance)| *distance <= EDGE_HOVER_DISTANCE)
                .min_by(|a, b| a.1.total_cmp(&b.1));
            let Some((edge, _)) = hovered_edge else {
                return;
            };
            let tooltip = edge_tooltip(edge, self.engine.catalog());
            let (a, b) = edge.endpoints();
            format!(
                "{} - {}  (combined {})\n{tooltip}",
                nodes[a].display_name,
                nodes[b].display_name,
                edge.combined_strength()
            )
        };

        painter.text(
            rect.left_top() + vec2(10.0, 10.0),
            Align2::LEFT_TOP,
            text,
            FontId::proportional(13.0),
            Color32::from_gray(40),
        );
    }
}
