//! Configuration view: the editable form, the geofence vertex table and
//! the read-only anchors table.
//!
//! The form is purely text; parsing is lenient and happens when the save
//! payload is merged. A field whose text will not parse is flagged inline
//! and simply falls back at merge time, leaving every other field intact.

use super::state::{ConsoleApp, SaveStatus};
use crate::config::is_invalid_number;
use eframe::egui;

const ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(255, 90, 90);
const OK_COLOR: egui::Color32 = egui::Color32::from_rgb(0x4c, 0xaf, 0x50);

impl ConsoleApp {
    /// Draws the configuration page.
    pub fn draw_config(&mut self, ui: &mut egui::Ui) {
        if let Some(error) = self.config_view.load_error.clone() {
            // No baseline: show the failure instead of stale or blank fields.
            ui.colored_label(ERROR_COLOR, error);
            if ui.button("Retry").clicked() {
                self.config_view.load_in_flight = true;
                self.backend.request_config();
            }
            return;
        }
        if self.config_view.model.baseline().is_none() {
            ui.label("Loading configuration…");
            return;
        }

        let can_save = self
            .session
            .role
            .map(|role| role.can_save_config())
            .unwrap_or(false);

        let mut do_save = false;
        let mut do_reload = false;

        egui::ScrollArea::vertical()
            .id_salt("config_scroll")
            .show(ui, |ui| {
                let view = &mut self.config_view;
                let form = &mut view.form;

                ui.heading("Zone");
                egui::Grid::new("zone_grid")
                    .num_columns(2)
                    .spacing([12.0, 4.0])
                    .show(ui, |ui| {
                        ui.label("Zone name");
                        ui.text_edit_singleline(&mut form.zone_name);
                        ui.end_row();
                    });
                ui.add_space(8.0);

                ui.heading("Network");
                egui::Grid::new("network_grid")
                    .num_columns(2)
                    .spacing([12.0, 4.0])
                    .show(ui, |ui| {
                        numeric_row(ui, "UDP port", &mut form.udp_port);
                    });
                ui.add_space(8.0);

                ui.heading("Buffer");
                egui::Grid::new("buffer_grid")
                    .num_columns(2)
                    .spacing([12.0, 4.0])
                    .show(ui, |ui| {
                        numeric_row(ui, "Per-anchor size", &mut form.buffer_per_anchor_size);
                        numeric_row(ui, "Max age [s]", &mut form.buffer_max_age_sec);
                        numeric_row(
                            ui,
                            "Snapshots per anchor",
                            &mut form.buffer_snapshots_per_anchor,
                        );
                    });
                ui.add_space(8.0);

                ui.heading("Solver");
                egui::Grid::new("solver_grid")
                    .num_columns(2)
                    .spacing([12.0, 4.0])
                    .show(ui, |ui| {
                        numeric_row(ui, "c [m/s]", &mut form.solver_c_m_per_s);
                        numeric_row(ui, "Min anchor count", &mut form.solver_min_anchor_count);
                        numeric_row(ui, "Max iterations", &mut form.solver_max_iterations);
                        numeric_row(ui, "Stop threshold", &mut form.solver_stop_threshold);
                        numeric_row(ui, "Max residual [m]", &mut form.solver_max_residual_m);
                    });
                ui.add_space(8.0);

                ui.heading("Filter");
                egui::Grid::new("filter_grid")
                    .num_columns(2)
                    .spacing([12.0, 4.0])
                    .show(ui, |ui| {
                        numeric_row(ui, "Position sigma [m]", &mut form.filter_pos_sigma_m);
                        numeric_row(ui, "Process noise", &mut form.filter_process_noise);
                        numeric_row(ui, "Tag max age [s]", &mut form.filter_tag_max_age_sec);
                        numeric_row(ui, "Max jump [m]", &mut form.filter_max_jump_m);
                        numeric_row(ui, "Velocity damping", &mut form.filter_velocity_damping);
                    });
                ui.add_space(8.0);

                ui.heading("Map");
                egui::Grid::new("map_grid")
                    .num_columns(2)
                    .spacing([12.0, 4.0])
                    .show(ui, |ui| {
                        numeric_row(ui, "Width [m]", &mut form.map_width_m);
                        numeric_row(ui, "Height [m]", &mut form.map_height_m);
                        numeric_row(ui, "Origin X [m]", &mut form.map_origin_x);
                        numeric_row(ui, "Origin Y [m]", &mut form.map_origin_y);
                    });
                ui.add_space(8.0);

                ui.heading("Geofence vertices");
                // Display indices are 1-based and recomputed every frame.
                egui::Grid::new("vertex_table")
                    .num_columns(3)
                    .striped(true)
                    .spacing([12.0, 4.0])
                    .show(ui, |ui| {
                        ui.strong("#");
                        ui.strong("X [m]");
                        ui.strong("Y [m]");
                        ui.end_row();

                        for (index, row) in form.shape.rows.iter_mut().enumerate() {
                            ui.label((index + 1).to_string());
                            vertex_cell(ui, &mut row.x);
                            vertex_cell(ui, &mut row.y);
                            ui.end_row();
                        }
                    });
                ui.horizontal(|ui| {
                    if ui.button("Add vertex").clicked() {
                        form.shape.add_vertex();
                    }
                    if ui.button("Clear vertices").clicked() {
                        form.shape.clear();
                    }
                });
                ui.add_space(12.0);

                ui.horizontal(|ui| {
                    let save = ui.add_enabled(
                        can_save && !view.save_in_flight,
                        egui::Button::new("Save"),
                    );
                    if save.clicked() {
                        do_save = true;
                    }
                    if ui
                        .add_enabled(!view.load_in_flight, egui::Button::new("Reload"))
                        .clicked()
                    {
                        do_reload = true;
                    }
                    if view.save_in_flight {
                        ui.spinner();
                    }
                    match &view.save_status {
                        Some(SaveStatus::Saved) => {
                            ui.colored_label(OK_COLOR, "Saved.");
                        }
                        Some(SaveStatus::Failed(message)) => {
                            ui.colored_label(ERROR_COLOR, message);
                        }
                        None => {}
                    }
                    if !can_save {
                        ui.label("Read-only: saving requires the Admin role.");
                    }
                });
                ui.add_space(16.0);

                ui.heading("Anchors");
                if let Some(error) = &view.anchors_error {
                    ui.colored_label(ERROR_COLOR, error);
                } else if view.anchors.is_empty() {
                    ui.label("No anchors configured.");
                } else {
                    egui::Grid::new("anchor_table")
                        .num_columns(6)
                        .striped(true)
                        .spacing([16.0, 4.0])
                        .show(ui, |ui| {
                            ui.strong("Id");
                            ui.strong("Name");
                            ui.strong("X [m]");
                            ui.strong("Y [m]");
                            ui.strong("Z [m]");
                            ui.strong("Enabled");
                            ui.end_row();

                            for anchor in &view.anchors {
                                ui.monospace(&anchor.id);
                                ui.label(&anchor.name);
                                match &anchor.position {
                                    Some(p) => {
                                        ui.label(format!("{:.3}", p.x));
                                        ui.label(format!("{:.3}", p.y));
                                        ui.label(format!("{:.3}", p.z));
                                    }
                                    None => {
                                        ui.label("—");
                                        ui.label("—");
                                        ui.label("—");
                                    }
                                }
                                ui.label(if anchor.enabled { "yes" } else { "no" });
                                ui.end_row();
                            }
                        });
                }
            });

        if do_save {
            self.submit_config_save();
        }
        if do_reload {
            self.config_view.save_status = None;
            self.config_view.load_in_flight = true;
            self.backend.request_config();
        }
    }
}

/// One labelled numeric form row with an inline parse flag.
fn numeric_row(ui: &mut egui::Ui, label: &str, text: &mut String) {
    ui.label(label);
    ui.horizontal(|ui| {
        ui.add(egui::TextEdit::singleline(text).desired_width(120.0));
        if is_invalid_number(text) {
            ui.colored_label(ERROR_COLOR, "not a number");
        }
    });
    ui.end_row();
}

/// One vertex coordinate cell with the same inline parse flag.
fn vertex_cell(ui: &mut egui::Ui, text: &mut String) {
    ui.horizontal(|ui| {
        ui.add(egui::TextEdit::singleline(text).desired_width(90.0));
        if is_invalid_number(text) {
            ui.colored_label(ERROR_COLOR, "!");
        }
    });
}
