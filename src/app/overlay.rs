//! Painting the gauge element with the egui painter.
//!
//! Element coordinates (the 180×120 view box) map 1:1 onto screen points,
//! offset to the corner named by the element's placement class.

use eframe::egui;

use token_gauge::config::Position;
use token_gauge::render::element::{HUB_RADIUS, LABEL_POS, VIEW_BOX};
use token_gauge::render::gauge::{point_on_arc, ARC_RADIUS, CENTER};
use token_gauge::render::palette::{self, Rgba};
use token_gauge::render::{GaugeElement, GaugeSurface};

const MARGIN: f32 = 12.0;
const ARC_STEPS: usize = 32;

pub fn color32(c: Rgba) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(c.r, c.g, c.b, c.a)
}

/// Top-left corner of the gauge inside `area` for a given placement.
pub fn gauge_origin(area: egui::Rect, position: Position) -> egui::Pos2 {
    let (w, h) = (VIEW_BOX.0 as f32, VIEW_BOX.1 as f32);
    let left = area.left() + MARGIN;
    let right = area.right() - MARGIN - w;
    let top = area.top() + MARGIN;
    let bottom = area.bottom() - MARGIN - h;

    let (x, y) = match position {
        Position::BottomRight => (right, bottom),
        Position::BottomLeft => (left, bottom),
        Position::TopRight => (right, top),
        Position::TopLeft => (left, top),
    };
    // Never push the gauge past the top-left edge of a tiny window.
    egui::pos2(x.max(area.left()), y.max(area.top()))
}

pub fn draw_gauge(ui: &mut egui::Ui, element: &GaugeElement) {
    let area = ui.available_rect_before_wrap();
    ui.allocate_rect(area, egui::Sense::hover());

    if !element.is_mounted() {
        ui.painter().text(
            area.center(),
            egui::Align2::CENTER_CENTER,
            "Gauge disabled",
            egui::FontId::proportional(13.0),
            egui::Color32::GRAY,
        );
        return;
    }

    let origin = gauge_origin(area, element.placement().unwrap_or_default());
    let to_screen = |(x, y): (f64, f64)| origin + egui::vec2(x as f32, y as f32);
    let painter = ui.painter_at(area);

    for arc in element.arcs() {
        let points: Vec<egui::Pos2> = (0..=ARC_STEPS)
            .map(|i| {
                let t = i as f64 / ARC_STEPS as f64;
                let deg = arc.from_deg + (arc.to_deg - arc.from_deg) * t;
                to_screen(point_on_arc(deg, ARC_RADIUS))
            })
            .collect();
        let color = color32(arc.color);
        painter.add(egui::Shape::line(
            points,
            egui::Stroke::new(arc.width as f32, color),
        ));
        // Round caps
        if arc.width > 1.0 {
            let r = arc.width as f32 / 2.0;
            painter.circle_filled(to_screen(arc.start()), r, color);
            painter.circle_filled(to_screen(arc.end()), r, color);
        }
    }

    let needle = element.needle();
    let needle_color = color32(palette::NEEDLE);
    painter.line_segment(
        [to_screen(needle.start), to_screen(needle.end)],
        egui::Stroke::new(3.0, needle_color),
    );
    painter.circle_filled(to_screen(CENTER), HUB_RADIUS as f32, needle_color);

    let label = element.label();
    painter.text(
        to_screen(LABEL_POS),
        egui::Align2::CENTER_BOTTOM,
        &label.text,
        egui::FontId::proportional(14.0),
        color32(label.color),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area() -> egui::Rect {
        egui::Rect::from_min_size(egui::pos2(0.0, 40.0), egui::vec2(500.0, 300.0))
    }

    #[test]
    fn corners_respect_margin() {
        assert_eq!(gauge_origin(area(), Position::TopLeft), egui::pos2(12.0, 52.0));
        assert_eq!(gauge_origin(area(), Position::TopRight), egui::pos2(308.0, 52.0));
        assert_eq!(gauge_origin(area(), Position::BottomLeft), egui::pos2(12.0, 208.0));
        assert_eq!(gauge_origin(area(), Position::BottomRight), egui::pos2(308.0, 208.0));
    }

    #[test]
    fn tiny_window_pins_to_top_left() {
        let tiny = egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(100.0, 80.0));
        assert_eq!(gauge_origin(tiny, Position::BottomRight), egui::pos2(0.0, 0.0));
    }

    #[test]
    fn palette_converts_opaque() {
        let c = color32(palette::SAFE);
        assert_eq!(c, egui::Color32::from_rgb(0xA9, 0xD5, 0xDF));
    }
}
