use eframe::egui::{self, Rect, Ui};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.view.zoom_at(pointer, zoom_factor);
    }

    /// Primary drags pan only when they did not start on a node.
    pub(in crate::app) fn handle_graph_pan(&mut self, response: &egui::Response, node_owned: bool) {
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
            || (response.dragged_by(egui::PointerButton::Primary) && !node_owned)
        {
            self.view.pan_by(response.drag_delta());
        }
    }

    /// Forwards primary-button input to the drag controller. Returns whether
    /// a node held the pointer at any point this frame.
    pub(in crate::app) fn handle_node_pointer(&mut self, ui: &Ui, response: &egui::Response) -> bool {
        let (pressed, released, press_pos, latest_pos, focused) = ui.input(|input| {
            (
                input.pointer.primary_pressed(),
                input.pointer.primary_released(),
                input.pointer.press_origin(),
                input.pointer.latest_pos(),
                input.focused,
            )
        });

        self.engine.set_pointer_zoom(self.view.zoom);
        let mut node_owned = self.engine.is_pointer_captured();
        if node_owned && !focused {
            self.engine.cancel_pointer();
            return true;
        }

        if pressed
            && response.hovered()
            && let Some(position) = press_pos
        {
            node_owned |= self.engine.pointer_down(self.view.screen_to_world(position));
        }

        if self.engine.is_pointer_captured()
            && let Some(position) = latest_pos
        {
            self.engine.pointer_move(self.view.screen_to_world(position));
        }

        if released && self.engine.is_pointer_captured() {
            // A click reaches the selection through the node-click callback.
            self.engine.pointer_up();
        } else if !node_owned && response.clicked_by(egui::PointerButton::Primary) {
            self.set_selected(None);
        }

        node_owned
    }
}
