use eframe::egui::{Color32, FontId, Painter, Pos2, Rect, Shape, Stroke, vec2};
use role_graph::{DrawCommand, ViewTransform};

pub(super) fn draw_background(painter: &Painter, rect: Rect, view: &ViewTransform) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(246, 247, 249));

    let step = (56.0 * view.zoom.clamp(0.6, 1.8)).max(20.0);
    let origin = view.origin + view.pan;
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(180, 186, 194, 60));

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

pub(super) fn paint_command(painter: &Painter, command: &DrawCommand) {
    match command {
        DrawCommand::Line { from, to, stroke } => {
            painter.line_segment([*from, *to], *stroke);
        }
        DrawCommand::Arrow {
            tip,
            direction,
            size,
            color,
        } => {
            let back = *tip - *direction * *size;
            let normal = vec2(-direction.y, direction.x) * (*size * 0.5);
            painter.add(Shape::convex_polygon(
                vec![*tip, back + normal, back - normal],
                *color,
                Stroke::NONE,
            ));
        }
        DrawCommand::Circle {
            center,
            radius,
            fill,
            stroke,
        } => {
            painter.circle(*center, *radius, *fill, *stroke);
        }
        DrawCommand::Text {
            position,
            anchor,
            text,
            size,
            color,
        } => {
            painter.text(*position, *anchor, text, FontId::proportional(*size), *color);
        }
    }
}

/// Screen distance from `point` to the segment `start..end`.
pub(super) fn distance_to_segment(point: Pos2, start: Pos2, end: Pos2) -> f32 {
    let segment = end - start;
    let length_sq = segment.length_sq();
    if length_sq <= f32::EPSILON {
        return point.distance(start);
    }
    let t = ((point - start).dot(segment) / length_sq).clamp(0.0, 1.0);
    point.distance(start + segment * t)
}
