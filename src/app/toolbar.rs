//! Toolbar rendering for `AtlasApp`.
//!
//! Draws the header strip (title, story progress, jump buttons) and the
//! floating up arrow.

use eframe::egui;

use super::AtlasApp;

impl AtlasApp {
    /// Render the top toolbar strip.
    pub fn draw_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.add_space(4.0);
            ui.label(egui::RichText::new("Sampler Atlas").strong().size(16.0));
            ui.separator();

            let label = match self.frame.active_step {
                Some(i) => self
                    .story
                    .config()
                    .steps
                    .get(i)
                    .map(|s| s.id.clone())
                    .unwrap_or_default(),
                None => "intro".to_string(),
            };
            ui.label(egui::RichText::new(label).weak());

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui
                    .add(egui::Button::new("Explore objects").min_size(egui::vec2(120.0, 24.0)))
                    .on_hover_text("Jump to the treemap")
                    .clicked()
                {
                    self.jump_to_treemap();
                }
                ui.add(
                    egui::ProgressBar::new(self.frame.t as f32)
                        .desired_width(160.0)
                        .show_percentage(),
                );
                if self.data_rx.is_some() {
                    ui.spinner();
                }
            });
        });
    }

    /// Floating "back to top" arrow, shown once the reader has scrolled down.
    pub fn draw_up_arrow(&mut self, ctx: &egui::Context) {
        if !self.frame.up_arrow_visible {
            return;
        }
        egui::Area::new(egui::Id::new("up_arrow"))
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-24.0, -24.0))
            .show(ctx, |ui| {
                if ui
                    .add(egui::Button::new(egui::RichText::new("\u{2191}").size(20.0)).min_size(egui::vec2(40.0, 40.0)))
                    .on_hover_text("Back to top")
                    .clicked()
                {
                    self.scroll_to_top();
                }
            });
    }
}
