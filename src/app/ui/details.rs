use eframe::egui::{self, RichText, Ui};
use role_graph::render::{edge_tooltip, node_fill};

use super::super::ViewModel;

/// One relation pair of the selected role, ready for display.
struct RelatedRole {
    id: String,
    display_name: String,
    direction: &'static str,
    combined_strength: u16,
    rows: Vec<String>,
    tooltip: String,
}

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Selection Details");
        ui.add_space(6.0);

        let Some(selected_id) = self.selected.clone() else {
            ui.label("Click a role in the graph to inspect its relations.");
            return;
        };

        let Some(index) = self.engine.node_index(&selected_id) else {
            ui.label("Selected role no longer exists in the snapshot.");
            return;
        };

        let node = &self.engine.nodes()[index];
        ui.label(RichText::new(node.display_name.as_str()).strong());
        ui.small(format!("id {}", node.id));
        ui.add_space(6.0);

        match node.faction_id {
            Some(faction) => {
                ui.horizontal(|ui| {
                    ui.label(RichText::new("●").color(node_fill(Some(faction))));
                    ui.label(format!("Faction {faction}"));
                });
            }
            None => {
                ui.label("No faction");
            }
        }
        if node.pinned() {
            ui.label("Pinned by pointer");
        }

        let related = self.related_roles(index);
        ui.separator();
        ui.label(RichText::new(format!("Relations ({})", related.len())).strong());
        if related.is_empty() {
            ui.label("No relations recorded for this role.");
            return;
        }

        let mut next_selection = None;
        egui::ScrollArea::vertical()
            .id_salt("related_roles_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for entry in &related {
                    ui.horizontal(|ui| {
                        ui.label(entry.direction);
                        let link = ui
                            .link(entry.display_name.as_str())
                            .on_hover_text(entry.tooltip.as_str());
                        if link.clicked() {
                            next_selection = Some(entry.id.clone());
                        }
                        ui.small(format!("combined {}", entry.combined_strength));
                    });
                    for row in &entry.rows {
                        ui.small(row.as_str());
                    }
                    ui.add_space(4.0);
                }
            });

        if let Some(id) = next_selection {
            self.set_selected(Some(id));
        }
    }

    fn related_roles(&self, index: usize) -> Vec<RelatedRole> {
        let nodes = self.engine.nodes();
        let catalog = self.engine.catalog();
        let selected_id = nodes[index].id.as_str();

        let mut related = self
            .engine
            .edges()
            .iter()
            .filter_map(|edge| {
                let (a, b) = edge.endpoints();
                let other = if a == index {
                    b
                } else if b == index {
                    a
                } else {
                    return None;
                };
                let other_node = nodes.get(other)?;

                let direction = if edge.is_two_way() {
                    "↔"
                } else if edge.arrow_target() == other {
                    "→"
                } else {
                    "←"
                };

                let rows = edge
                    .records()
                    .iter()
                    .map(|record| {
                        let arrow = if record.source_id == selected_id {
                            "out"
                        } else {
                            "in"
                        };
                        format!(
                            "{arrow}: {} {}",
                            catalog.label_for(&record.relation_type),
                            catalog.describe_strength(&record.relation_type, record.strength)
                        )
                    })
                    .collect();

                Some(RelatedRole {
                    id: other_node.id.clone(),
                    display_name: other_node.display_name.clone(),
                    direction,
                    combined_strength: edge.combined_strength(),
                    rows,
                    tooltip: edge_tooltip(edge, catalog),
                })
            })
            .collect::<Vec<_>>();

        related.sort_by(|a, b| {
            b.combined_strength
                .cmp(&a.combined_strength)
                .then_with(|| a.display_name.cmp(&b.display_name))
        });
        related
    }
}
