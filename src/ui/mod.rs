//! Stateless egui helpers shared by the story and treemap views.

use eframe::egui;
use sampler_atlas::tooltip::Placement;
use sampler_atlas::treemap::palette::Rgba;

// ─── Geometry ────────────────────────────────────────────────────────────────

pub fn to_color32(c: Rgba) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(c.r, c.g, c.b, c.a)
}

/// Label ink for a fill: dark on light fills, white otherwise.
pub fn ink_for(fill: Rgba) -> egui::Color32 {
    if fill.luma() > 0.6 {
        egui::Color32::from_gray(30)
    } else {
        egui::Color32::WHITE
    }
}

/// Largest rect with the image's aspect ratio centered inside `frame`.
pub fn fit_rect(image: egui::Vec2, frame: egui::Rect) -> egui::Rect {
    if image.x <= 0.0 || image.y <= 0.0 {
        return frame;
    }
    let scale = (frame.width() / image.x).min(frame.height() / image.y);
    egui::Rect::from_center_size(frame.center(), image * scale)
}

/// Paint a texture fitted into `frame` at the given opacity.
pub fn paint_fitted(painter: &egui::Painter, tex: &egui::TextureHandle, frame: egui::Rect, opacity: f32) {
    if opacity <= 0.0 {
        return;
    }
    let rect = fit_rect(tex.size_vec2(), frame);
    let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
    painter.image(tex.id(), rect, uv, egui::Color32::WHITE.gamma_multiply(opacity));
}

/// Faint square grid behind the narrative steps.
pub fn paint_grid_background(painter: &egui::Painter, rect: egui::Rect) {
    let stroke = egui::Stroke::new(1.0, egui::Color32::from_gray(128).gamma_multiply(0.12));
    let step = 48.0;
    let mut x = rect.left();
    while x < rect.right() {
        painter.line_segment([egui::pos2(x, rect.top()), egui::pos2(x, rect.bottom())], stroke);
        x += step;
    }
    let mut y = rect.top();
    while y < rect.bottom() {
        painter.line_segment([egui::pos2(rect.left(), y), egui::pos2(rect.right(), y)], stroke);
        y += step;
    }
}

// ─── Tooltips ────────────────────────────────────────────────────────────────

/// Show a cursor-anchored tooltip inside `bounds`.
///
/// The size comes from the previous frame's layout of the same area, so the
/// first frame is placed as if the tooltip were empty.
pub fn show_placed_tooltip(
    ctx: &egui::Context,
    id: egui::Id,
    placement: Placement,
    cursor: egui::Pos2,
    bounds: egui::Rect,
    add_contents: impl FnOnce(&mut egui::Ui),
) {
    let size = ctx
        .memory(|m| m.area_rect(id))
        .map(|r| r.size())
        .unwrap_or(egui::Vec2::ZERO);
    let local = cursor - bounds.min;
    let (x, y) = placement.place(
        (local.x as f64, local.y as f64),
        (size.x as f64, size.y as f64),
        (bounds.width() as f64, bounds.height() as f64),
    );
    egui::Area::new(id)
        .order(egui::Order::Tooltip)
        .fixed_pos(bounds.min + egui::vec2(x as f32, y as f32))
        .interactable(false)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.set_max_width(280.0);
                add_contents(ui);
            });
        });
}

// ─── Text ────────────────────────────────────────────────────────────────────

/// Truncate a string to `max_chars`, adding "..." when shortened.
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let t: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", t)
    }
}

/// Characters that fit in `width` pixels at roughly `px_per_char`.
pub fn chars_for_width(width: f32, px_per_char: f32) -> usize {
    if px_per_char <= 0.0 {
        return 0;
    }
    (width / px_per_char).floor().max(0.0) as usize
}
