//! Login view.

use super::state::ConsoleApp;
use eframe::egui;

impl ConsoleApp {
    /// Draws the login form shown while no role is granted.
    ///
    /// Failures of every kind (bad credentials, unknown role, network)
    /// surface as an inline message under the form; there is no navigation
    /// until a known role comes back.
    pub fn draw_login(&mut self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(60.0);
            ui.heading("Zone Console");
            ui.add_space(4.0);
            ui.label(format!("Backend: {}", self.backend.client().base_url()));
            ui.add_space(20.0);

            let mut submitted = false;
            egui::Grid::new("login_form")
                .num_columns(2)
                .spacing([8.0, 8.0])
                .show(ui, |ui| {
                    ui.label("Username");
                    ui.text_edit_singleline(&mut self.session.username);
                    ui.end_row();

                    ui.label("Password");
                    let pw = ui.add(
                        egui::TextEdit::singleline(&mut self.session.password).password(true),
                    );
                    if pw.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                        submitted = true;
                    }
                    ui.end_row();
                });

            ui.add_space(8.0);
            let button = ui.add_enabled(!self.session.in_flight, egui::Button::new("Log in"));
            if button.clicked() {
                submitted = true;
            }
            if self.session.in_flight {
                ui.spinner();
            }

            if let Some(error) = &self.session.error {
                ui.add_space(8.0);
                ui.colored_label(egui::Color32::from_rgb(255, 90, 90), error);
            }

            if submitted {
                self.submit_login();
            }
        });
    }
}
