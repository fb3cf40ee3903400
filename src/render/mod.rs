//! Pure mapping from layout state to draw commands.

mod color;
mod view;

use std::collections::HashSet;

use eframe::egui::{Align2, Color32, Pos2, Stroke, Vec2, vec2};

use crate::data::RelationCatalog;
use crate::graph::{Edge, Node};

pub use color::{
    GOLDEN_ANGLE_DEGREES, NEUTRAL_LABEL, NEUTRAL_NODE, faction_hue, hsl, node_fill,
    node_label_color,
};
pub use view::ViewTransform;

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Line {
        from: Pos2,
        to: Pos2,
        stroke: Stroke,
    },
    /// Filled triangle whose tip sits at `tip`, pointing along `direction`.
    Arrow {
        tip: Pos2,
        direction: Vec2,
        size: f32,
        color: Color32,
    },
    Circle {
        center: Pos2,
        radius: f32,
        fill: Color32,
        stroke: Stroke,
    },
    Text {
        position: Pos2,
        anchor: Align2,
        text: String,
        size: f32,
        color: Color32,
    },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderStyle {
    pub node_radius: f32,
    pub edge_width: f32,
    /// Perpendicular offset of each line of a two-way edge.
    pub parallel_offset: f32,
    pub arrow_size: f32,
    pub node_label_size: f32,
    pub edge_label_size: f32,
    pub edge_color: Color32,
    pub weak_edge_color: Color32,
    pub edge_label_color: Color32,
    pub highlight_color: Color32,
    pub match_color: Color32,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            node_radius: 5.0,
            edge_width: 1.0,
            parallel_offset: 3.0,
            arrow_size: 6.0,
            node_label_size: 12.0,
            edge_label_size: 10.0,
            edge_color: Color32::from_rgba_unmultiplied(153, 153, 153, 160),
            weak_edge_color: Color32::from_rgb(220, 53, 69),
            edge_label_color: Color32::from_rgb(102, 102, 102),
            highlight_color: Color32::from_rgb(255, 196, 64),
            match_color: Color32::from_rgb(80, 170, 255),
        }
    }
}

impl RenderStyle {
    /// On-screen node radius; grows slower than the zoom so nodes stay
    /// readable when zoomed out.
    pub fn screen_radius(&self, zoom: f32) -> f32 {
        (self.node_radius * zoom.powf(0.40)).clamp(2.5, 46.0)
    }
}

/// Nodes to emphasise on top of the plain encoding.
#[derive(Clone, Debug, Default)]
pub struct Highlight {
    pub selected: Option<usize>,
    pub matches: HashSet<usize>,
}

pub fn edge_color(edge: &Edge, style: &RenderStyle) -> Color32 {
    if edge.is_weak() {
        style.weak_edge_color
    } else {
        style.edge_color
    }
}

/// Distinct relation labels of the edge in first-seen order, `" / "`-joined.
pub fn edge_label(edge: &Edge, catalog: &RelationCatalog) -> String {
    let mut labels: Vec<&str> = Vec::new();
    for record in edge.records() {
        let label = catalog.label_for(&record.relation_type);
        if !label.is_empty() && !labels.contains(&label) {
            labels.push(label);
        }
    }
    labels.join(" / ")
}

/// One line per relation label, followed by the descriptions filed under it.
pub fn edge_tooltip(edge: &Edge, catalog: &RelationCatalog) -> String {
    let mut groups: Vec<(&str, Vec<&str>)> = Vec::new();
    for record in edge.records() {
        let label = catalog.label_for(&record.relation_type);
        if label.is_empty() {
            continue;
        }
        let index = match groups.iter().position(|(existing, _)| *existing == label) {
            Some(index) => index,
            None => {
                groups.push((label, Vec::new()));
                groups.len() - 1
            }
        };
        if let Some(description) = record.description.as_deref() {
            groups[index].1.push(description);
        }
    }

    groups
        .iter()
        .map(|(label, descriptions)| {
            if descriptions.is_empty() {
                (*label).to_owned()
            } else {
                format!("{label}: {}", descriptions.join("; "))
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Builds the frame: edge lines, edge labels, nodes, node labels, in that
/// order. Depends on nothing but its arguments.
pub fn render(
    nodes: &[Node],
    edges: &[Edge],
    view: &ViewTransform,
    style: &RenderStyle,
    catalog: &RelationCatalog,
    highlight: &Highlight,
) -> Vec<DrawCommand> {
    let mut commands = Vec::with_capacity(edges.len() * 3 + nodes.len() * 2);
    let radius = style.screen_radius(view.zoom);
    let screen = nodes
        .iter()
        .map(|node| view.world_to_screen(node.position))
        .collect::<Vec<_>>();

    let mut labels = Vec::with_capacity(edges.len());
    for edge in edges {
        let (a, b) = edge.endpoints();
        let (Some(&start), Some(&end)) = (screen.get(a), screen.get(b)) else {
            continue;
        };
        let stroke = Stroke::new(style.edge_width, edge_color(edge, style));

        if edge.is_self_loop() {
            let label = edge_label(edge, catalog);
            if !label.is_empty() {
                labels.push(DrawCommand::Text {
                    position: start - vec2(0.0, radius + 4.0),
                    anchor: Align2::CENTER_BOTTOM,
                    text: label,
                    size: style.edge_label_size,
                    color: style.edge_label_color,
                });
            }
            continue;
        }

        if edge.is_two_way() {
            let delta = end - start;
            let angle = delta.y.atan2(delta.x);
            let offset = vec2(angle.sin(), -angle.cos()) * style.parallel_offset;
            for sign in [1.0, -1.0] {
                commands.push(DrawCommand::Line {
                    from: start + offset * sign,
                    to: end + offset * sign,
                    stroke,
                });
            }
        } else {
            let target = edge.arrow_target();
            let (from, to) = if target == a { (end, start) } else { (start, end) };
            commands.push(DrawCommand::Line { from, to, stroke });

            let delta = to - from;
            let length = delta.length();
            if length > radius {
                let direction = delta / length;
                commands.push(DrawCommand::Arrow {
                    tip: to - direction * radius,
                    direction,
                    size: style.arrow_size,
                    color: stroke.color,
                });
            }
        }

        let label = edge_label(edge, catalog);
        if !label.is_empty() {
            labels.push(DrawCommand::Text {
                position: start + (end - start) * 0.5 - vec2(0.0, 5.0),
                anchor: Align2::CENTER_BOTTOM,
                text: label,
                size: style.edge_label_size,
                color: style.edge_label_color,
            });
        }
    }
    commands.extend(labels);

    for (index, node) in nodes.iter().enumerate() {
        let stroke = if highlight.selected == Some(index) {
            Stroke::new(2.5, style.highlight_color)
        } else if highlight.matches.contains(&index) {
            Stroke::new(2.0, style.match_color)
        } else {
            Stroke::NONE
        };
        commands.push(DrawCommand::Circle {
            center: screen[index],
            radius,
            fill: node_fill(node.faction_id),
            stroke,
        });
    }

    for (index, node) in nodes.iter().enumerate() {
        commands.push(DrawCommand::Text {
            position: screen[index] + vec2(radius + 7.0, 4.0),
            anchor: Align2::LEFT_BOTTOM,
            text: node.display_name.clone(),
            size: style.node_label_size,
            color: node_label_color(node.faction_id),
        });
    }

    commands
}

#[cfg(test)]
mod tests {
    use eframe::egui::pos2;

    use super::*;
    use crate::data::RelationTypeInfo;
    use crate::graph::{FactionId, RelationRecord, RoleGraph, RoleRecord, aggregate};

    fn placed(graph: RoleGraph, positions: &[Vec2]) -> RoleGraph {
        let mut graph = graph;
        for (node, position) in graph.nodes.iter_mut().zip(positions) {
            node.position = *position;
        }
        graph
    }

    fn lines(commands: &[DrawCommand]) -> Vec<(Pos2, Pos2, Color32)> {
        commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Line { from, to, stroke } => Some((*from, *to, stroke.color)),
                _ => None,
            })
            .collect()
    }

    fn arrows(commands: &[DrawCommand]) -> Vec<(Pos2, Vec2)> {
        commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Arrow { tip, direction, .. } => Some((*tip, *direction)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn two_way_edge_draws_parallel_lines_without_arrow() {
        let graph = placed(
            aggregate(
                &[RoleRecord::new("a", "A"), RoleRecord::new("b", "B")],
                &[
                    RelationRecord::new("a", "b", "friend", 80),
                    RelationRecord::new("b", "a", "friend", 80),
                ],
            ),
            &[vec2(0.0, 0.0), vec2(100.0, 0.0)],
        );
        let commands = render(
            &graph.nodes,
            &graph.edges,
            &ViewTransform::default(),
            &RenderStyle::default(),
            &RelationCatalog::default(),
            &Highlight::default(),
        );

        let lines = lines(&commands);
        assert_eq!(lines.len(), 2);
        assert!(arrows(&commands).is_empty());
        let offsets = lines.iter().map(|line| line.0.y).collect::<Vec<_>>();
        assert!((offsets[0] - offsets[1]).abs() > 5.9);
        assert!((offsets[0].abs() - 3.0).abs() < 1e-4);
        assert_eq!(lines[0].2, RenderStyle::default().edge_color);
    }

    #[test]
    fn self_loop_draws_only_its_label_above_the_node() {
        let graph = placed(
            aggregate(
                &[RoleRecord::new("a", "A")],
                &[RelationRecord::new("a", "a", "vow", 60)],
            ),
            &[vec2(50.0, 50.0)],
        );
        let view = ViewTransform::default();
        let style = RenderStyle::default();
        let commands = render(
            &graph.nodes,
            &graph.edges,
            &view,
            &style,
            &RelationCatalog::default(),
            &Highlight::default(),
        );

        assert!(lines(&commands).is_empty());
        assert!(arrows(&commands).is_empty());
        let node = view.world_to_screen(vec2(50.0, 50.0));
        let label = commands
            .iter()
            .find_map(|command| match command {
                DrawCommand::Text { position, text, .. } if text == "vow" => Some(*position),
                _ => None,
            })
            .expect("loop label drawn");
        assert_eq!(label.x, node.x);
        assert!(label.y < node.y - style.screen_radius(view.zoom));
    }

    #[test]
    fn one_way_edge_points_at_target() {
        let graph = placed(
            aggregate(
                &[RoleRecord::new("a", "A"), RoleRecord::new("b", "B")],
                &[RelationRecord::new("b", "a", "mentor", 20)],
            ),
            &[vec2(0.0, 0.0), vec2(100.0, 0.0)],
        );
        let style = RenderStyle::default();
        let commands = render(
            &graph.nodes,
            &graph.edges,
            &ViewTransform::default(),
            &style,
            &RelationCatalog::default(),
            &Highlight::default(),
        );

        let lines = lines(&commands);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].0, pos2(100.0, 0.0));
        assert_eq!(lines[0].1, pos2(0.0, 0.0));
        assert_eq!(lines[0].2, style.weak_edge_color);

        let arrows = arrows(&commands);
        assert_eq!(arrows.len(), 1);
        assert!(arrows[0].1.x < 0.0);
        assert!((arrows[0].0.x - style.screen_radius(1.0)).abs() < 1e-4);
    }

    #[test]
    fn weak_color_threshold_for_two_way_edges() {
        let style = RenderStyle::default();
        let colored = |forward: u8, backward: u8| {
            let graph = aggregate(
                &[RoleRecord::new("a", "A"), RoleRecord::new("b", "B")],
                &[
                    RelationRecord::new("a", "b", "x", forward),
                    RelationRecord::new("b", "a", "x", backward),
                ],
            );
            edge_color(&graph.edges[0], &style)
        };
        assert_eq!(colored(34, 35), style.weak_edge_color);
        assert_eq!(colored(35, 35), style.edge_color);
        assert_eq!(colored(60, 10), style.edge_color);
    }

    #[test]
    fn labels_are_deduplicated_and_tooltip_grouped() {
        let mut catalog = RelationCatalog::default();
        catalog.insert(
            "friend",
            RelationTypeInfo {
                label: "Friend".to_owned(),
                preset_strength: None,
            },
        );
        let graph = aggregate(
            &[RoleRecord::new("a", "A"), RoleRecord::new("b", "B")],
            &[
                RelationRecord::new("a", "b", "friend", 80).with_description("since school"),
                RelationRecord::new("b", "a", "friend", 70).with_description("owes a favour"),
                RelationRecord::new("b", "a", "creditor", 40),
            ],
        );
        let edge = &graph.edges[0];
        assert_eq!(edge_label(edge, &catalog), "Friend / creditor");
        assert_eq!(
            edge_tooltip(edge, &catalog),
            "Friend: since school; owes a favour\ncreditor"
        );
    }

    #[test]
    fn node_colors_follow_factions() {
        let graph = aggregate(
            &[
                RoleRecord::new("a", "A").with_faction(3),
                RoleRecord::new("b", "B").with_faction(3),
                RoleRecord::new("c", "C"),
            ],
            &[],
        );
        let commands = render(
            &graph.nodes,
            &graph.edges,
            &ViewTransform::default(),
            &RenderStyle::default(),
            &RelationCatalog::default(),
            &Highlight::default(),
        );
        let fills = commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Circle { fill, .. } => Some(*fill),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(fills.len(), 3);
        assert_eq!(fills[0], fills[1]);
        assert_eq!(fills[0], node_fill(Some(FactionId(3))));
        assert_eq!(fills[2], NEUTRAL_NODE);
    }

    #[test]
    fn selection_and_matches_get_rings() {
        let graph = aggregate(
            &[RoleRecord::new("a", "A"), RoleRecord::new("b", "B"), RoleRecord::new("c", "C")],
            &[],
        );
        let style = RenderStyle::default();
        let highlight = Highlight {
            selected: Some(0),
            matches: HashSet::from([1]),
        };
        let commands = render(
            &graph.nodes,
            &graph.edges,
            &ViewTransform::default(),
            &style,
            &RelationCatalog::default(),
            &highlight,
        );
        let strokes = commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Circle { stroke, .. } => Some(stroke.color),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(strokes[0], style.highlight_color);
        assert_eq!(strokes[1], style.match_color);
        assert_eq!(strokes[2], Stroke::NONE.color);
    }

    #[test]
    fn empty_input_renders_nothing() {
        let commands = render(
            &[],
            &[],
            &ViewTransform::default(),
            &RenderStyle::default(),
            &RelationCatalog::default(),
            &Highlight::default(),
        );
        assert!(commands.is_empty());
    }
}
