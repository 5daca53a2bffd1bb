//! Minimal sign-in view; stores the session marker the upload page checks.

use super::UiApp;
use eframe::egui;
use neuroscan_core::Route;

impl UiApp {
    pub(super) fn render_login(&mut self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(48.0);
            ui.heading("Sign in");
            ui.label("A session is required to analyze scans.");
            ui.add_space(12.0);
            let resp = ui.add(
                egui::TextEdit::singleline(&mut self.login_name).hint_text("Name"),
            );
            let submit = resp.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            let can_submit = !self.login_name.trim().is_empty();
            let clicked = ui
                .add_enabled(can_submit, egui::Button::new("Sign in"))
                .clicked();
            if can_submit && (clicked || submit) {
                match self.store.sign_in(&self.login_name) {
                    Ok(()) => {
                        tracing::info!("Signed in");
                        self.login_name.clear();
                        self.status.clear();
                        self.pending.push(Route::Upload);
                    }
                    Err(e) => self.status = format!("Sign in failed: {e}"),
                }
            }
        });
    }
}
