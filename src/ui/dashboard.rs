//! Dashboard view: system status, node list and tag-position table.
//!
//! Everything here is rebuilt from the latest status snapshot on every
//! frame (full replace, no diffing); freshness is classified at render
//! time and never stored.

use super::state::ConsoleApp;
use crate::reconciler::{node_views, tag_rows};
use crate::types::Freshness;
use eframe::egui;

impl ConsoleApp {
    /// Draws the dashboard page.
    pub fn draw_dashboard(&mut self, ui: &mut egui::Ui) {
        if let Some(message) = self.live.degraded_message() {
            ui.colored_label(egui::Color32::from_rgb(255, 170, 60), message);
            ui.separator();
        }

        let Some(snapshot) = self.live.snapshot() else {
            if self.live.degraded_message().is_none() {
                ui.label("Waiting for the first status poll…");
            }
            return;
        };

        let now = chrono::Utc::now().timestamp_millis() as f64 / 1000.0;

        ui.horizontal(|ui| {
            ui.label("Backend status:");
            ui.strong(&snapshot.status);
        });
        ui.add_space(8.0);

        ui.collapsing("Last message", |ui| {
            let pretty = serde_json::to_string_pretty(&snapshot.last_msg)
                .unwrap_or_else(|_| "<unprintable>".to_string());
            egui::ScrollArea::vertical()
                .id_salt("last_msg_scroll")
                .max_height(160.0)
                .show(ui, |ui| {
                    ui.monospace(pretty);
                });
        });
        ui.add_space(8.0);

        ui.heading("Nodes");
        let views = node_views(snapshot, now);
        if views.is_empty() {
            ui.label("No nodes have reported yet.");
        } else {
            egui::Grid::new("node_table")
                .num_columns(4)
                .striped(true)
                .spacing([16.0, 4.0])
                .show(ui, |ui| {
                    ui.strong("Address");
                    ui.strong("State");
                    ui.strong("Last HB");
                    ui.strong("Last measurement");
                    ui.end_row();

                    for view in &views {
                        ui.monospace(&view.addr);
                        ui.colored_label(freshness_color(&view.freshness), view.freshness.label());
                        ui.label(view.last_hb_decoded.as_deref().unwrap_or("—"));
                        ui.label(view.last_meas_time.as_deref().unwrap_or("—"));
                        ui.end_row();
                    }
                });
        }
        ui.add_space(8.0);

        ui.heading("Tags");
        let rows = tag_rows(snapshot);
        if rows.is_empty() {
            ui.label("No tag positions yet.");
        } else {
            egui::Grid::new("tag_table")
                .num_columns(5)
                .striped(true)
                .spacing([16.0, 4.0])
                .show(ui, |ui| {
                    ui.strong("Tag");
                    ui.strong("X [m]");
                    ui.strong("Y [m]");
                    ui.strong("Z [m]");
                    ui.strong("Time");
                    ui.end_row();

                    for row in &rows {
                        ui.monospace(&row.id);
                        ui.label(&row.x);
                        ui.label(&row.y);
                        ui.label(&row.z);
                        ui.label(&row.time);
                        ui.end_row();
                    }
                });
        }
    }
}

fn freshness_color(freshness: &Freshness) -> egui::Color32 {
    match freshness {
        Freshness::Online => egui::Color32::from_rgb(0x4c, 0xaf, 0x50),
        Freshness::Stale(_) => egui::Color32::from_rgb(255, 170, 60),
        Freshness::Offline => egui::Color32::from_rgb(255, 90, 90),
    }
}
