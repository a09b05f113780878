//! Main viewport rendering for `AtlasApp`.
//!
//! The central panel is one tall scroll track. Only the visible slice is drawn:
//! a stage pinned to the viewport that shows the active step, so the story
//! reads like a sticky container scrolled through its segments.

use eframe::egui;

use sampler_atlas::config::{self, StepContent};
use sampler_atlas::gallery::{detail_tooltip, GridTile, GridView, TooltipLine};
use sampler_atlas::story::carousel::Arrow;
use sampler_atlas::story::crossfade::CrossFadeFrame;
use sampler_atlas::story::StepFrame;
use sampler_atlas::tooltip::Placement;

use crate::ui::{paint_fitted, paint_grid_background, show_placed_tooltip, truncate_str};

use super::AtlasApp;

const GRID_COLUMNS: usize = 7;
const TEXT_SIZE: f32 = 19.0;

/// Text column on the left, picture area on the right.
fn split(stage: egui::Rect) -> (egui::Rect, egui::Rect) {
    let cut = stage.left() + stage.width() * 0.4;
    let text = egui::Rect::from_min_max(stage.min, egui::pos2(cut, stage.bottom()));
    let picture = egui::Rect::from_min_max(egui::pos2(cut, stage.top()), stage.max);
    (text.shrink(32.0), picture.shrink(24.0))
}

fn text_column(ui: &mut egui::Ui, rect: egui::Rect, text: &str) {
    ui.allocate_new_ui(egui::UiBuilder::new().max_rect(rect), |ui| {
        ui.add_space((rect.height() * 0.25).min(160.0));
        ui.label(egui::RichText::new(text).size(TEXT_SIZE));
    });
}

fn placeholder(painter: &egui::Painter, rect: egui::Rect, text: &str) {
    painter.rect_stroke(rect, 4.0, egui::Stroke::new(1.0, egui::Color32::from_gray(140)));
    painter.text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        truncate_str(text, 40),
        egui::FontId::proportional(13.0),
        egui::Color32::from_gray(140),
    );
}

impl AtlasApp {
    /// Render the scroll track and the stage for the active step.
    pub fn draw_content(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let viewport_height = ui.available_height();
        let track = self.story.track_height(viewport_height as f64) as f32;

        let mut area = egui::ScrollArea::vertical()
            .id_salt("story")
            .auto_shrink([false, false]);
        if let Some(y) = self.scroll_to.take() {
            area = area.vertical_scroll_offset(y);
        }

        area.show_viewport(ui, |ui, viewport| {
            let origin = ui.max_rect().min;
            let extent = (track - viewport.height()).max(0.0);
            self.on_scroll(viewport.min.y, extent, viewport.height());

            let stage = egui::Rect::from_min_size(origin + viewport.min.to_vec2(), viewport.size());
            ui.allocate_new_ui(egui::UiBuilder::new().max_rect(stage), |ui| {
                self.draw_stage(ui, ctx, stage);
            });
            ui.set_min_height(track.max(viewport.height()));
        });
    }

    fn draw_stage(&mut self, ui: &mut egui::Ui, ctx: &egui::Context, stage: egui::Rect) {
        if self.frame.grid_background {
            paint_grid_background(&ui.painter_at(stage), stage);
        }
        let Some(i) = self.frame.active_step else {
            self.draw_hero(ui, stage);
            return;
        };
        let Some(content) = self.story.config().steps.get(i).map(|s| s.content.clone()) else {
            return;
        };
        let step_frame = self.frame.steps.get(i).cloned().unwrap_or(StepFrame::Empty);

        match (content, step_frame) {
            (StepContent::Card { text, image, alt }, _) => {
                self.draw_card(ui, stage, &text, image.as_deref(), &alt);
            }
            (StepContent::SingleImage { text, image, alt }, _) => {
                self.draw_card(ui, stage, &text, Some(&image), &alt);
            }
            (StepContent::Gallery { text, images }, StepFrame::Gallery { revealed }) => {
                self.draw_gallery(ui, stage, &text, &images, &revealed);
            }
            (StepContent::CrossFade { text, frames }, StepFrame::CrossFade(fade)) => {
                self.draw_crossfade(ui, stage, i, &text, &frames, &fade);
            }
            (StepContent::ObjectGrid { text }, StepFrame::ObjectGrid { category }) => {
                self.draw_object_grid(ui, ctx, stage, &text, category);
            }
            (StepContent::Treemap, _) => self.draw_treemap_step(ui, ctx, stage),
            _ => {}
        }
    }

    // ─── Steps ───────────────────────────────────────────────────────────────

    fn draw_hero(&mut self, ui: &mut egui::Ui, stage: egui::Rect) {
        let mut leave = false;
        ui.allocate_new_ui(egui::UiBuilder::new().max_rect(stage), |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(stage.height() * 0.3);
                ui.heading(egui::RichText::new("Samplers and everyday objects").size(40.0).strong());
                ui.add_space(8.0);
                ui.label(egui::RichText::new("Scroll to begin").size(16.0).weak());
                ui.add_space(24.0);
                leave = ui
                    .add(egui::Button::new(egui::RichText::new("\u{2193}").size(22.0)).min_size(egui::vec2(44.0, 44.0)))
                    .clicked();
            });
        });
        if leave {
            self.leave_hero();
        }
    }

    fn draw_card(&mut self, ui: &mut egui::Ui, stage: egui::Rect, text: &str, image: Option<&str>, alt: &str) {
        let (text_rect, picture) = split(stage);
        text_column(ui, text_rect, text);
        let Some(image) = image else {
            return;
        };
        let painter = ui.painter_at(picture);
        match self.texture_for(image) {
            Some(tex) => paint_fitted(&painter, &tex, picture, 1.0),
            None => placeholder(&painter, picture, alt),
        }
    }

    fn draw_gallery(&mut self, ui: &mut egui::Ui, stage: egui::Rect, text: &str, images: &[String], revealed: &[bool]) {
        let (text_rect, picture) = split(stage);
        text_column(ui, text_rect, text);
        if images.is_empty() {
            return;
        }
        let cols = (images.len() as f32).sqrt().ceil().max(1.0) as usize;
        let rows = images.len().div_ceil(cols);
        let cell = egui::vec2(picture.width() / cols as f32, picture.height() / rows as f32);
        let painter = ui.painter_at(picture);

        for (k, image) in images.iter().enumerate() {
            let (r, c) = (k / cols, k % cols);
            let rect = egui::Rect::from_min_size(
                picture.min + egui::vec2(c as f32 * cell.x, r as f32 * cell.y),
                cell,
            )
            .shrink(6.0);
            if !revealed.get(k).copied().unwrap_or(false) {
                painter.rect_stroke(rect, 4.0, egui::Stroke::new(1.0, egui::Color32::from_gray(128).gamma_multiply(0.2)));
                continue;
            }
            match self.texture_for(image) {
                Some(tex) => paint_fitted(&painter, &tex, rect, 1.0),
                None => placeholder(&painter, rect, "Sampler"),
            }
        }
    }

    fn draw_crossfade(
        &mut self,
        ui: &mut egui::Ui,
        stage: egui::Rect,
        step: usize,
        text: &str,
        frames: &[config::CrossFadeFrame],
        fade: &CrossFadeFrame,
    ) {
        let (text_rect, picture) = split(stage);
        text_column(ui, text_rect, text);
        if frames.is_empty() {
            return;
        }

        let image_rect = egui::Rect::from_min_max(picture.min, egui::pos2(picture.right(), picture.bottom() - 56.0));
        let painter = ui.painter_at(picture);
        for (frame, opacity) in frames.iter().zip(&fade.opacities) {
            if *opacity <= 0.0 {
                continue;
            }
            if let Some(tex) = self.texture_for(&frame.image) {
                paint_fitted(&painter, &tex, image_rect, *opacity as f32);
            }
        }

        let controls = egui::Rect::from_min_max(egui::pos2(picture.left(), image_rect.bottom() + 8.0), picture.max);
        let mut clicked = None;
        ui.allocate_new_ui(egui::UiBuilder::new().max_rect(controls), |ui| {
            ui.horizontal(|ui| {
                if ui.button("\u{2190}").clicked() {
                    clicked = Some(Arrow::Left);
                }
                let label = frames
                    .get(fade.label_index)
                    .and_then(|f| f.label.clone())
                    .unwrap_or_default();
                ui.label(egui::RichText::new(label).strong());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("\u{2192}").clicked() {
                        clicked = Some(Arrow::Right);
                    }
                    ui.add(egui::ProgressBar::new(fade.progress as f32).desired_width(ui.available_width() - 8.0));
                });
            });
        });
        if let Some(arrow) = clicked {
            self.arrow(step, arrow);
        }
    }

    fn draw_object_grid(&mut self, ui: &mut egui::Ui, ctx: &egui::Context, stage: egui::Rect, text: &str, category: usize) {
        let (text_rect, picture) = split(stage);

        let mut selected = None;
        ui.allocate_new_ui(egui::UiBuilder::new().max_rect(text_rect), |ui| {
            ui.add_space((text_rect.height() * 0.2).min(120.0));
            ui.label(egui::RichText::new(text).size(TEXT_SIZE));
            ui.add_space(16.0);
            ui.horizontal_wrapped(|ui| {
                for (idx, cat) in self.story.config().categories.iter().enumerate() {
                    if ui.selectable_label(idx == category, cat.label.as_str()).clicked() {
                        selected = Some(idx);
                    }
                }
            });
        });
        if let Some(idx) = selected {
            self.select_category(idx);
        }

        let Some(grid) = self.grid.clone() else {
            return;
        };
        if grid.tiles.is_empty() {
            placeholder(&ui.painter_at(picture), picture, "No images for this category");
            return;
        }

        let rows = grid.tiles.len().div_ceil(GRID_COLUMNS);
        let cell = egui::vec2(picture.width() / GRID_COLUMNS as f32, picture.height() / rows.max(3) as f32);
        let painter = ui.painter_at(picture);
        let mut hovered: Option<(GridTile, egui::Pos2)> = None;

        for (k, tile) in grid.tiles.iter().enumerate() {
            let (r, c) = (k / GRID_COLUMNS, k % GRID_COLUMNS);
            let rect = egui::Rect::from_min_size(
                picture.min + egui::vec2(c as f32 * cell.x, r as f32 * cell.y),
                cell,
            )
            .shrink(4.0);
            match self.texture_for(&tile.path) {
                Some(tex) => paint_fitted(&painter, &tex, rect, 1.0),
                None => placeholder(&painter, rect, &tile.alt),
            }
            let response = ui.interact(rect, ui.id().with(("tile", k)), egui::Sense::click());
            if let Some(pos) = response.hover_pos() {
                hovered = Some((tile.clone(), pos));
            }
            if response.clicked() {
                if let Some(url) = self.tile_link(&grid, tile) {
                    ctx.open_url(egui::OpenUrl::new_tab(url));
                }
            }
        }

        let Some((tile, cursor)) = hovered else {
            return;
        };
        let Some(lines) = self.tile_tooltip(&grid, &tile) else {
            return;
        };
        show_placed_tooltip(ctx, egui::Id::new("grid_tooltip"), Placement::GRID, cursor, stage, |ui| {
            for line in &lines {
                match line {
                    TooltipLine::Title { text, .. } => {
                        ui.label(egui::RichText::new(text).strong());
                    }
                    TooltipLine::Text(text) => {
                        ui.label(text.as_str());
                    }
                    TooltipLine::Link { text, .. } => {
                        ui.label(egui::RichText::new(text).underline().color(ui.visuals().hyperlink_color));
                    }
                }
            }
        });
    }

    /// Category metadata first, then the detail row sharing the tile's join key.
    fn tile_tooltip(&self, grid: &GridView, tile: &GridTile) -> Option<Vec<TooltipLine>> {
        self.library.tooltip(grid, tile).or_else(|| {
            let row = self.resolver.as_ref()?.row_for_key(&tile.id)?;
            detail_tooltip(row, &self.story.config().treemap)
        })
    }

    /// Record URL a tile click opens, if its tooltip carries one.
    fn tile_link(&self, grid: &GridView, tile: &GridTile) -> Option<String> {
        self.tile_tooltip(grid, tile)?.into_iter().find_map(|line| match line {
            TooltipLine::Title { link, .. } => link,
            TooltipLine::Link { url, .. } => Some(url),
            TooltipLine::Text(_) => None,
        })
    }
}
