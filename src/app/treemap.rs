//! Treemap step for `AtlasApp`.
//!
//! Paints the zoom state's units and family chips into the stage, routes
//! clicks back into the state machine, and shows the detail panel for a
//! clicked object type.

use std::time::Duration;

use eframe::egui;

use sampler_atlas::tooltip::Placement;
use sampler_atlas::treemap::layout::LayoutBox;
use sampler_atlas::treemap::zoom::ZoomEvent;

use crate::ui::{chars_for_width, ink_for, paint_fitted, show_placed_tooltip, to_color32, truncate_str};

use super::AtlasApp;

const DETAIL_WIDTH: f32 = 0.32;
const THUMB_SIZE: f32 = 64.0;

/// Uniform fit of the logical canvas into a screen rect.
#[derive(Clone, Copy)]
struct Canvas {
    origin: egui::Pos2,
    scale: f32,
}

impl Canvas {
    fn fit(rect: egui::Rect, width: f64, height: f64) -> Self {
        let scale = (rect.width() / width as f32).min(rect.height() / height as f32).max(0.0);
        let used = egui::vec2(width as f32 * scale, height as f32 * scale);
        Self {
            origin: rect.center() - used / 2.0,
            scale,
        }
    }

    fn to_screen(self, b: &LayoutBox) -> egui::Rect {
        egui::Rect::from_min_max(
            self.origin + egui::vec2(b.x0 as f32, b.y0 as f32) * self.scale,
            self.origin + egui::vec2(b.x1 as f32, b.y1 as f32) * self.scale,
        )
    }

    fn to_logical(self, p: egui::Pos2) -> Option<(f64, f64)> {
        if self.scale <= 0.0 {
            return None;
        }
        let v = (p - self.origin) / self.scale;
        Some((v.x as f64, v.y as f64))
    }
}

/// Pre-formatted detail entry, so painting can borrow the app mutably.
struct EntryLine {
    thumbnail: Option<String>,
    title: String,
    unit: String,
    link: String,
}

impl AtlasApp {
    pub fn draw_treemap_step(&mut self, ui: &mut egui::Ui, ctx: &egui::Context, stage: egui::Rect) {
        let stage = stage.shrink(16.0);
        if self.treemap.is_none() || self.zoom.is_none() {
            let loading = self.data_rx.is_some();
            ui.allocate_new_ui(egui::UiBuilder::new().max_rect(stage), |ui| {
                ui.centered_and_justified(|ui| {
                    if loading {
                        ui.spinner();
                    } else {
                        ui.label("Treemap data is unavailable.");
                    }
                });
            });
            return;
        }

        let detail_open = self.resolver.as_ref().and_then(|r| r.view()).is_some();
        let (map_area, panel) = if detail_open {
            let cut = stage.right() - stage.width() * DETAIL_WIDTH;
            (
                egui::Rect::from_min_max(stage.min, egui::pos2(cut - 12.0, stage.bottom())),
                Some(egui::Rect::from_min_max(egui::pos2(cut, stage.top()), stage.max)),
            )
        } else {
            (stage, None)
        };

        let header = egui::Rect::from_min_max(map_area.min, egui::pos2(map_area.right(), map_area.top() + 36.0));
        let map_rect = egui::Rect::from_min_max(egui::pos2(map_area.left(), header.bottom() + 4.0), map_area.max);

        let mut event = None;
        let mut back = false;
        if let (Some(tm), Some(zoom)) = (self.treemap.as_ref(), self.zoom.as_mut()) {
            let dt = ctx.input(|i| i.stable_dt).min(0.1);
            zoom.tick(tm, Duration::from_secs_f32(dt));
            if zoom.is_transitioning() {
                ctx.request_repaint();
            }

            ui.allocate_new_ui(egui::UiBuilder::new().max_rect(header), |ui| {
                ui.horizontal(|ui| {
                    if zoom.back_visible(tm) {
                        back = ui
                            .add_enabled(!zoom.is_transitioning(), egui::Button::new("\u{2190} Back"))
                            .clicked();
                    }
                    ui.heading(zoom.title(tm));
                });
            });

            let canvas = Canvas::fit(map_rect, tm.config().width, tm.config().height);
            let painter = ui.painter_at(map_rect);
            for unit in zoom.drawn(tm) {
                let rect = canvas.to_screen(&unit.bounds);
                painter.rect_filled(rect, 0.0, to_color32(unit.fill));
                painter.rect_stroke(rect, 0.0, egui::Stroke::new(1.0, egui::Color32::WHITE));
                if let Some(label) = &unit.label {
                    let max = chars_for_width(rect.width() - 8.0, 7.0);
                    painter.with_clip_rect(rect).text(
                        rect.left_top() + egui::vec2(4.0, 4.0),
                        egui::Align2::LEFT_TOP,
                        truncate_str(label, max),
                        egui::FontId::proportional(12.0),
                        ink_for(unit.fill),
                    );
                }
            }
            for chip in zoom.chips(tm) {
                let rect = canvas.to_screen(&chip.bounds);
                if rect.width() < 24.0 || rect.height() < 16.0 {
                    continue;
                }
                let chip_painter = painter.with_clip_rect(rect);
                let galley = chip_painter.layout_no_wrap(
                    chip.title.clone(),
                    egui::FontId::proportional(13.0),
                    egui::Color32::from_gray(20),
                );
                let pill = egui::Rect::from_min_size(rect.min, galley.size() + egui::vec2(12.0, 6.0));
                chip_painter.rect_filled(pill, 10.0, egui::Color32::WHITE.gamma_multiply(0.85));
                chip_painter.galley(pill.min + egui::vec2(6.0, 3.0), galley, egui::Color32::from_gray(20));
            }

            let response = ui.interact(map_rect, ui.id().with("treemap"), egui::Sense::click());
            let logical = response.hover_pos().and_then(|p| canvas.to_logical(p).map(|l| (p, l)));
            if let Some((cursor, (x, y))) = logical {
                if response.clicked() {
                    let target = zoom.chip_at(tm, x, y).map(|c| (c, true)).or_else(|| zoom.hit_test(x, y).map(|n| (n, false)));
                    event = target.map(|(node, is_chip)| {
                        if is_chip {
                            zoom.click_chip(tm, node)
                        } else {
                            zoom.click(tm, node)
                        }
                    });
                } else if let Some(tip) = zoom.hit_test(x, y).and_then(|n| zoom.tooltip(tm, n)) {
                    show_placed_tooltip(ctx, egui::Id::new("treemap_tooltip"), Placement::TREEMAP, cursor, map_rect, |ui| {
                        ui.label(egui::RichText::new(&tip.title).strong());
                        for line in &tip.lines {
                            ui.label(line.as_str());
                        }
                    });
                }
            }

            if back {
                event = Some(zoom.back(tm));
            }
        }

        if let Some(event) = event {
            self.handle_zoom_event(event);
        }
        if let Some(panel) = panel {
            self.draw_detail_panel(ui, panel);
        }
    }

    fn handle_zoom_event(&mut self, event: ZoomEvent) {
        match event {
            ZoomEvent::Zoomed { close_detail: true, .. } => {
                if let Some(resolver) = self.resolver.as_mut() {
                    resolver.close();
                }
            }
            ZoomEvent::OpenDetail { object_type, family } => {
                if let Some(resolver) = self.resolver.as_mut() {
                    let requests = resolver.open(&object_type, &family);
                    self.thumbs.submit(requests);
                }
            }
            ZoomEvent::Zoomed { .. } | ZoomEvent::Ignored => {}
        }
    }

    // ─── Detail panel ────────────────────────────────────────────────────────

    fn draw_detail_panel(&mut self, ui: &mut egui::Ui, rect: egui::Rect) {
        let Some(view) = self.resolver.as_ref().and_then(|r| r.view()) else {
            return;
        };
        let config = &self.story.config().treemap;
        let title = view.title.clone();
        let subtitle = view.subtitle();
        let settled = view.is_settled();
        let entries: Vec<EntryLine> = view
            .entries
            .iter()
            .map(|e| EntryLine {
                thumbnail: e.thumbnail.clone(),
                title: e.display_title().to_string(),
                unit: e.unit_line(config),
                link: e.row.collections_url.clone(),
            })
            .collect();

        let mut close = false;
        ui.allocate_new_ui(egui::UiBuilder::new().max_rect(rect), |ui| {
            egui::Frame::group(ui.style()).show(ui, |ui| {
                ui.set_min_size(rect.size() - egui::vec2(16.0, 16.0));
                ui.horizontal(|ui| {
                    ui.heading(title.as_str());
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        close = ui.button("\u{2715}").on_hover_text("Close").clicked();
                    });
                });
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new(subtitle.as_str()).weak());
                    if !settled {
                        ui.spinner();
                    }
                });
                ui.separator();

                egui::ScrollArea::vertical()
                    .id_salt("details")
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        for (k, entry) in entries.iter().enumerate() {
                            ui.push_id(k, |ui| self.draw_detail_entry(ui, entry));
                            ui.add_space(6.0);
                        }
                    });
            });
        });

        if close {
            if let Some(resolver) = self.resolver.as_mut() {
                resolver.close();
            }
        }
    }

    fn draw_detail_entry(&mut self, ui: &mut egui::Ui, entry: &EntryLine) {
        ui.horizontal(|ui| {
            let (thumb_rect, _) = ui.allocate_exact_size(egui::vec2(THUMB_SIZE, THUMB_SIZE), egui::Sense::hover());
            let painter = ui.painter_at(thumb_rect);
            match entry.thumbnail.as_deref().and_then(|url| self.remote_texture(url)) {
                Some(tex) => paint_fitted(&painter, &tex, thumb_rect, 1.0),
                None => {
                    painter.rect_filled(thumb_rect, 4.0, ui.visuals().faint_bg_color);
                }
            }
            ui.vertical(|ui| {
                if entry.link.is_empty() {
                    ui.label(egui::RichText::new(&entry.title).strong());
                } else {
                    ui.hyperlink_to(egui::RichText::new(&entry.title).strong(), &entry.link);
                }
                if !entry.unit.is_empty() {
                    ui.label(egui::RichText::new(&entry.unit).small().weak());
                }
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canvas_round_trip() {
        let rect = egui::Rect::from_min_size(egui::pos2(10.0, 20.0), egui::vec2(500.0, 520.0));
        let canvas = Canvas::fit(rect, 1000.0, 520.0);
        assert_eq!(canvas.scale, 0.5);
        let b = LayoutBox::new(0.0, 0.0, 1000.0, 520.0);
        let screen = canvas.to_screen(&b);
        assert_eq!(screen.width(), 500.0);
        assert_eq!(screen.center(), rect.center());
        let (x, y) = canvas.to_logical(screen.max).unwrap();
        assert!((x - 1000.0).abs() < 1e-3 && (y - 520.0).abs() < 1e-3);
    }
}
