//! User interface components for the operator console.
//!
//! # Module Organization
//!
//! - `state` - Application state structures and the main ConsoleApp
//! - `login` - Login form
//! - `dashboard` - Live status, node list and tag table
//! - `map_view` - Map surface painting
//! - `config_view` - Configuration form and geofence editor

mod config_view;
mod dashboard;
mod login;
mod map_view;
mod state;

#[cfg(test)]
mod tests;

pub use state::{Backend, ConfigViewState, ConsoleApp, MapViewState, Page, SaveStatus, SessionState, UiPrefs};

use eframe::egui;

/// Storage key under which UI preferences persist between restarts.
pub(crate) const PREFS_STORAGE_KEY: &str = "ui_prefs";

impl eframe::App for ConsoleApp {
    /// Persist UI preferences between restarts.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        match serde_json::to_string(&self.prefs()) {
            Ok(json) => storage.set_string(PREFS_STORAGE_KEY, json),
            Err(err) => log::warn!("failed to serialize UI prefs: {err}"),
        }
    }

    /// Main update function called by egui for each frame.
    ///
    /// Drains the backend channels first so every view draws from the
    /// freshest state, then lays out the toolbar and the active page.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let visuals = if self.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        };
        ctx.set_visuals(visuals);

        self.process_backend_events();

        egui::TopBottomPanel::top("top_toolbar").show(ctx, |ui| {
            self.draw_toolbar(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.session.role.is_none() {
                self.draw_login(ui);
                return;
            }
            match self.page {
                Page::Dashboard => self.draw_dashboard(ui),
                Page::Map => self.draw_map(ui),
                Page::Config => self.draw_config(ui),
            }
        });
    }
}

impl ConsoleApp {
    /// Draws the top toolbar: page tabs, theme toggle and session controls.
    fn draw_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.strong("Zone Console");
            ui.separator();

            if self.session.role.is_some() {
                ui.selectable_value(&mut self.page, Page::Dashboard, "Dashboard");
                ui.selectable_value(&mut self.page, Page::Map, "Map");
                ui.selectable_value(&mut self.page, Page::Config, "Config");
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let theme_label = if self.dark_mode { "☀" } else { "🌙" };
                if ui.button(theme_label).clicked() {
                    self.dark_mode = !self.dark_mode;
                }
                if let Some(role) = self.session.role {
                    if ui.button("Log out").clicked() {
                        self.logout();
                    }
                    ui.label(role.name());
                }
            });
        });
    }
}
