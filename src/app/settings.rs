//! Settings panel for `GaugeApp`.
//!
//! Every edit goes through the store; the gauge only reacts to the change
//! notification that comes back.

use eframe::egui;

use token_gauge::config::settings::{commit_edits, SettingsEdit};
use token_gauge::config::{BandMode, Position};

use super::GaugeApp;

impl GaugeApp {
    pub fn draw_settings(&mut self, ui: &mut egui::Ui) {
        ui.heading("Token Gauge");
        ui.separator();

        let mut edits = Vec::new();

        if ui.checkbox(&mut self.form.enabled, "Show gauge").changed() {
            edits.push(SettingsEdit::Enabled(self.form.enabled));
        }
        if ui
            .checkbox(&mut self.form.show_percentage, "Show percentage")
            .changed()
        {
            edits.push(SettingsEdit::ShowPercentage(self.form.show_percentage));
        }

        let prev_position = self.form.position;
        egui::ComboBox::from_label("Position")
            .selected_text(self.form.position.label())
            .show_ui(ui, |ui| {
                for p in Position::ALL {
                    ui.selectable_value(&mut self.form.position, p, p.label());
                }
            });
        if self.form.position != prev_position {
            edits.push(SettingsEdit::Position(self.form.position));
        }

        let prev_mode = self.form.band_mode;
        egui::ComboBox::from_label("Label color")
            .selected_text(band_mode_label(self.form.band_mode))
            .show_ui(ui, |ui| {
                for mode in [BandMode::Fixed, BandMode::Thresholds] {
                    ui.selectable_value(&mut self.form.band_mode, mode, band_mode_label(mode));
                }
            });
        if self.form.band_mode != prev_mode {
            edits.push(SettingsEdit::BandMode(self.form.band_mode));
        }

        ui.separator();

        if numeric_field(ui, "Token limit", &mut self.form.token_limit) {
            edits.push(SettingsEdit::TokenLimit(self.form.token_limit.clone()));
        }
        if numeric_field(ui, "Safe threshold", &mut self.form.safe_threshold) {
            edits.push(SettingsEdit::SafeThreshold(self.form.safe_threshold.clone()));
        }
        if numeric_field(ui, "Caution threshold", &mut self.form.caution_threshold) {
            edits.push(SettingsEdit::CautionThreshold(self.form.caution_threshold.clone()));
        }

        if let Some(stored) = commit_edits(self.store.as_ref(), &edits) {
            // Show what is actually stored again.
            self.form = stored;
        }
        if !edits.is_empty() {
            ui.ctx().request_repaint();
        }
    }
}

/// Text field that reports a commit (focus lost) after being edited.
fn numeric_field(ui: &mut egui::Ui, label: &str, value: &mut String) -> bool {
    ui.label(label);
    let response = ui.add(egui::TextEdit::singleline(value).desired_width(120.0));
    response.lost_focus()
}

fn band_mode_label(mode: BandMode) -> &'static str {
    match mode {
        BandMode::Fixed => "Fixed bands",
        BandMode::Thresholds => "Thresholds",
    }
}
