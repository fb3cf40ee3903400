use std::ops::RangeInclusive;

use eframe::egui::{self, Key, Response, Ui};
use role_graph::LayoutConfig;

use super::super::ViewModel;

const SLIDER_KEY_BASE_RATE: f32 = 10.0;
const SLIDER_KEY_ACCEL_PER_SEC: f32 = 9.0;
const SLIDER_KEY_ACCEL_MAX: f32 = 40.0;

#[derive(Clone, Copy, Default)]
struct SliderKeyHold {
    secs: f32,
}

/// Arrow keys nudge a focused slider, faster the longer they are held.
fn apply_slider_arrow_keys(
    ui: &Ui,
    response: &Response,
    value: &mut f32,
    range: &RangeInclusive<f32>,
) -> bool {
    let state_id = response.id.with("arrow_key_hold");
    if !response.has_focus() {
        ui.ctx()
            .data_mut(|data| data.insert_temp(state_id, SliderKeyHold::default()));
        return false;
    }

    let (delta_time, increase, decrease) = ui.input(|input| {
        (
            input.stable_dt.min(0.1),
            input.key_down(Key::ArrowRight) || input.key_down(Key::ArrowUp),
            input.key_down(Key::ArrowLeft) || input.key_down(Key::ArrowDown),
        )
    });
    let direction = f32::from(i8::from(increase) - i8::from(decrease));
    let mut hold = ui
        .ctx()
        .data(|data| data.get_temp::<SliderKeyHold>(state_id).unwrap_or_default());

    if direction == 0.0 {
        ui.ctx()
            .data_mut(|data| data.insert_temp(state_id, SliderKeyHold::default()));
        return false;
    }

    hold.secs += delta_time;
    let ramp = hold.secs * SLIDER_KEY_ACCEL_PER_SEC;
    let speed = SLIDER_KEY_BASE_RATE * (1.0 + ramp + ramp * ramp * 0.15).min(SLIDER_KEY_ACCEL_MAX);
    let step = ((range.end() - range.start()) / 200.0).max(0.0005);

    let previous = *value;
    *value = (*value + direction * step * speed * delta_time).clamp(*range.start(), *range.end());
    ui.ctx().data_mut(|data| data.insert_temp(state_id, hold));
    ui.ctx().request_repaint();
    (*value - previous).abs() > f32::EPSILON
}

fn tuning_slider(
    ui: &mut Ui,
    value: &mut f32,
    range: RangeInclusive<f32>,
    text: &str,
    hover: &str,
) -> bool {
    let response = ui
        .add(
            egui::Slider::new(value, range.clone())
                .text(text)
                .clamping(egui::SliderClamping::Always),
        )
        .on_hover_text(hover);
    if response.hovered() {
        response.request_focus();
    }
    let mut changed = response.changed();
    changed |= apply_slider_arrow_keys(ui, &response, value, &range);
    changed
}

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Graph Controls");
        ui.separator();
        ui.add_space(4.0);

        ui.label("Search roles")
            .on_hover_text("Fuzzy-highlight roles by display name or id.");
        ui.text_edit_singleline(&mut self.search);
        if !self.search.trim().is_empty() && ui.small_button("Clear search").clicked() {
            self.search.clear();
        }

        ui.separator();

        let physics_toggled = ui
            .checkbox(&mut self.live_physics, "Live physics simulation")
            .on_hover_text("Run the force layout while the graph is shown.")
            .changed();
        if physics_toggled {
            if self.live_physics {
                self.engine.restart();
            } else {
                self.engine.stop();
            }
        }

        ui.checkbox(&mut self.show_quadtree_overlay, "Show quadtree overlay")
            .on_hover_text("Draw the Barnes-Hut partitions over the graph canvas.");

        ui.horizontal(|ui| {
            if ui
                .button("Reheat")
                .on_hover_text("Restart the cooling schedule from full energy.")
                .clicked()
            {
                self.live_physics = true;
                self.engine.reheat();
            }
            if ui.button("Reset view").clicked() {
                self.view.pan = egui::Vec2::ZERO;
                self.view.zoom = 1.0;
            }
        });

        ui.separator();
        let stats = self.engine.stats();
        ui.label(format!("Relation types: {}", self.engine.catalog().len()));
        ui.label(format!("Dropped relations: {} dangling", stats.dangling_relations));
        if stats.self_relations > 0 {
            ui.label(format!("Self relations: {}", stats.self_relations));
        }
        if stats.duplicate_roles > 0 {
            ui.label(format!("Duplicate role ids merged: {}", stats.duplicate_roles));
        }

        ui.separator();
        self.draw_layout_tuning(ui);
    }

    fn draw_layout_tuning(&mut self, ui: &mut Ui) {
        let mut changed = false;
        let draft = &mut self.config_draft;

        ui.collapsing("Layout tuning", |ui| {
            changed |= tuning_slider(
                ui,
                &mut draft.charge_strength,
                -1200.0..=0.0,
                "Repulsion",
                "Many-body strength between every pair of roles.",
            );
            changed |= tuning_slider(
                ui,
                &mut draft.faction_scale,
                0.0..=30.0,
                "Faction pull",
                "Scale of the same-faction attraction and cross-faction push.",
            );
            changed |= tuning_slider(
                ui,
                &mut draft.min_link_distance,
                5.0..=200.0,
                "Closest link distance",
                "Rest length of a link between two maximally close roles.",
            );
            changed |= tuning_slider(
                ui,
                &mut draft.max_link_distance,
                200.0..=1000.0,
                "Farthest link distance",
                "Rest length of a link with zero combined strength.",
            );
            changed |= tuning_slider(
                ui,
                &mut draft.center_strength,
                0.0..=1.0,
                "Centering",
                "How firmly the layout is kept in the middle of the canvas.",
            );
            changed |= tuning_slider(
                ui,
                &mut draft.velocity_decay,
                0.05..=0.9,
                "Velocity decay",
                "Fraction of velocity lost every tick.",
            );
            changed |= tuning_slider(
                ui,
                &mut draft.barnes_hut_theta,
                0.3..=1.5,
                "Barnes-Hut theta",
                "Approximation threshold for repulsion on large graphs.",
            );

            if ui.button("Restore defaults").clicked() {
                *draft = LayoutConfig::default();
                changed = true;
            }
        });

        if changed {
            match self.config_draft.validate() {
                Ok(()) => self.engine.set_config(self.config_draft),
                Err(error) => {
                    tracing::debug!(%error, "ignoring invalid layout tuning");
                }
            }
        }
    }
}
