//! `AtlasApp`: the top-level egui application state.
//!
//! This module declares the `AtlasApp` struct and its `eframe::App` impl.
//! The other methods are split across the sibling sub-modules:
//!
//! - `navigation`: scroll targets, category loads, background dataset load
//! - `toolbar`: header strip and the floating up arrow
//! - `content`: the sticky stage that renders the active step
//! - `treemap`: treemap painter and the detail panel

pub mod content;
pub mod navigation;
pub mod toolbar;
pub mod treemap;

use std::collections::HashMap;
use std::sync::{mpsc, Arc};
use std::time::Duration;

use eframe::egui;

use sampler_atlas::config::StoryConfig;
use sampler_atlas::detail::{DetailDataset, DetailResolver};
use sampler_atlas::gallery::{CategoryLibrary, GridView};
use sampler_atlas::net::image::ImageLoader;
use sampler_atlas::net::thumbs::ThumbnailWorker;
use sampler_atlas::source::DataSource;
use sampler_atlas::story::{Story, StoryFrame};
use sampler_atlas::treemap::zoom::Zoom;
use sampler_atlas::treemap::Treemap;

/// Treemap and detail datasets, loaded together off the UI thread.
pub struct Datasets {
    pub treemap: Option<Treemap>,
    pub details: DetailDataset,
}

// ─── Application state ───────────────────────────────────────────────────────

pub struct AtlasApp {
    pub story: Story,
    /// Render values from the last scroll tick.
    pub frame: StoryFrame,
    pub source: Arc<dyn DataSource>,
    // Scroll track
    pub last_offset: Option<f32>,
    pub scroll_to: Option<f32>,
    pub extent: f32,
    pub viewport_height: f32,
    // Object grid
    pub library: CategoryLibrary,
    pub grid: Option<GridView>,
    // Image loading
    pub image_loader: ImageLoader,
    pub image_textures: HashMap<String, egui::TextureHandle>,
    // Treemap and details
    pub data_rx: Option<mpsc::Receiver<Datasets>>,
    pub treemap: Option<Treemap>,
    pub zoom: Option<Zoom>,
    pub resolver: Option<DetailResolver>,
    pub thumbs: ThumbnailWorker,
}

impl AtlasApp {
    pub fn new(source: Arc<dyn DataSource>, config: StoryConfig, thumbs: ThumbnailWorker) -> Self {
        let mut story = Story::new(config);
        let frame = story.frame();
        let mut app = Self {
            story,
            frame,
            source,
            last_offset: None,
            scroll_to: None,
            extent: 0.0,
            viewport_height: 0.0,
            library: CategoryLibrary::new(),
            grid: None,
            image_loader: ImageLoader::new("."),
            image_textures: HashMap::new(),
            data_rx: None,
            treemap: None,
            zoom: None,
            resolver: None,
            thumbs,
        };
        app.load_datasets();
        app
    }

    /// Texture for a source-relative image, requesting it on first use.
    pub fn texture_for(&mut self, location: &str) -> Option<egui::TextureHandle> {
        if location.is_empty() {
            return None;
        }
        let resolved = self.source.resolve(location);
        self.remote_texture(&resolved)
    }

    /// Texture for an absolute path or URL.
    pub fn remote_texture(&mut self, resolved: &str) -> Option<egui::TextureHandle> {
        if let Some(tex) = self.image_textures.get(resolved) {
            return Some(tex.clone());
        }
        self.image_loader.request(resolved);
        None
    }

    fn upload_textures(&mut self, ctx: &egui::Context) {
        for source in self.image_loader.poll() {
            if self.image_textures.contains_key(&source) {
                continue;
            }
            if let Some(data) = self.image_loader.get(&source) {
                let image = egui::ColorImage::from_rgba_unmultiplied(
                    [data.width as usize, data.height as usize],
                    &data.rgba,
                );
                let tex = ctx.load_texture(format!("img_{}", source), image, egui::TextureOptions::LINEAR);
                self.image_textures.insert(source, tex);
            }
        }
    }
}

impl eframe::App for AtlasApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_datasets();
        self.poll_thumbnails();
        if let Some(idx) = self.frame.load_category.take() {
            self.load_category(idx);
        }

        // Poll image loader and convert completed images to textures
        self.upload_textures(ctx);

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            self.draw_toolbar(ui);
        });

        let ctx_clone = ctx.clone();
        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_content(ui, &ctx_clone);
        });

        self.draw_up_arrow(ctx);

        // keep polling while background work is outstanding
        let waiting = self.data_rx.is_some()
            || self.image_loader.pending_count() > 0
            || self.resolver.as_ref().and_then(|r| r.view()).is_some_and(|v| !v.is_settled());
        if waiting {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}
