//! Map view: paints the composed scene onto a fixed-size surface.
//!
//! All geometry comes pre-transformed from [`crate::scene::compose_scene`];
//! this adapter only places it inside the allocated canvas rect. The whole
//! surface is repainted every frame, background first, so nothing from a
//! previous tick can linger.

use super::state::ConsoleApp;
use crate::constants::{
    ANCHOR_MARKER_RADIUS, MAP_SURFACE_HEIGHT, MAP_SURFACE_WIDTH, TAG_MARKER_RADIUS,
};
use crate::scene::{compose_scene, MapScene};
use crate::transform::SurfaceSize;
use eframe::egui;

// Palette carried over from the original map page.
const MAP_BACKGROUND: egui::Color32 = egui::Color32::from_rgb(0x10, 0x14, 0x19);
const ZONE_STROKE: egui::Color32 = egui::Color32::from_rgb(0x3f, 0x51, 0xb5);
const ZONE_FILL: egui::Color32 = egui::Color32::from_rgba_premultiplied(9, 12, 27, 38);
const ANCHOR_COLOR: egui::Color32 = egui::Color32::from_rgb(0xff, 0x98, 0x00);
const TAG_COLOR: egui::Color32 = egui::Color32::from_rgb(0x4c, 0xaf, 0x50);
const LABEL_COLOR: egui::Color32 = egui::Color32::from_gray(220);

impl ConsoleApp {
    /// Draws the map page: selector controls plus the drawing surface.
    pub fn draw_map(&mut self, ui: &mut egui::Ui) {
        let mut retry = false;
        if let Some(error) = &self.map_view.load_error {
            ui.horizontal(|ui| {
                ui.colored_label(egui::Color32::from_rgb(255, 90, 90), error);
                retry = ui.button("Retry").clicked();
            });
        }
        if retry {
            self.backend.request_map();
        }

        let mut newly_selected: Option<String> = None;
        ui.horizontal(|ui| {
            ui.label("Tag:");
            let current = self
                .map_view
                .selected_tag
                .clone()
                .unwrap_or_else(|| "—".to_string());
            egui::ComboBox::from_id_salt("tag_select")
                .selected_text(current)
                .show_ui(ui, |ui| {
                    for tag in &self.map_view.tags {
                        let selected = self.map_view.selected_tag.as_deref() == Some(tag.id.as_str());
                        if ui.selectable_label(selected, tag.display_label()).clicked() {
                            newly_selected = Some(tag.id.clone());
                        }
                    }
                });
            ui.checkbox(&mut self.map_view.only_selected, "Only selected tag");
        });
        if let Some(tag_id) = newly_selected {
            // Takes effect on the next map tick, not retroactively.
            self.select_tag(tag_id);
        }

        ui.add_space(4.0);

        let surface = SurfaceSize {
            width_px: MAP_SURFACE_WIDTH,
            height_px: MAP_SURFACE_HEIGHT,
        };
        let tick = self
            .map_view
            .last_tick
            .as_ref()
            .map(|(id, position)| (id.as_str(), *position));
        let scene = compose_scene(self.map_view.snapshot.as_ref(), tick, surface);

        let (response, painter) = ui.allocate_painter(
            egui::vec2(MAP_SURFACE_WIDTH, MAP_SURFACE_HEIGHT),
            egui::Sense::hover(),
        );
        paint_scene(&painter, response.rect, &scene);
    }
}

/// Paints one composed scene into the given canvas rect.
fn paint_scene(painter: &egui::Painter, rect: egui::Rect, scene: &MapScene) {
    painter.rect_filled(rect, 0.0, MAP_BACKGROUND);

    let to_screen =
        |p: &crate::transform::SurfacePoint| rect.min + egui::vec2(p.x, p.y);

    if !scene.outline.is_empty() {
        let points: Vec<egui::Pos2> = scene.outline.iter().map(&to_screen).collect();
        if points.len() >= 3 {
            painter.add(egui::Shape::convex_polygon(
                points.clone(),
                ZONE_FILL,
                egui::Stroke::NONE,
            ));
        }
        painter.add(egui::Shape::closed_line(
            points,
            egui::Stroke::new(2.0, ZONE_STROKE),
        ));
    }

    let font = egui::FontId::proportional(12.0);
    for marker in &scene.anchors {
        let pos = to_screen(&marker.pos);
        painter.circle_filled(pos, ANCHOR_MARKER_RADIUS, ANCHOR_COLOR);
        painter.text(
            pos + egui::vec2(6.0, -4.0),
            egui::Align2::LEFT_BOTTOM,
            &marker.label,
            font.clone(),
            LABEL_COLOR,
        );
    }

    if let Some(marker) = &scene.tag {
        let pos = to_screen(&marker.pos);
        painter.circle_filled(pos, TAG_MARKER_RADIUS, TAG_COLOR);
        painter.text(
            pos + egui::vec2(8.0, -8.0),
            egui::Align2::LEFT_BOTTOM,
            &marker.label,
            font.clone(),
            LABEL_COLOR,
        );
    }
}
