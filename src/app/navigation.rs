//! Navigation methods for `AtlasApp`.
//!
//! Scroll ticks and programmatic scroll targets, category loads for the
//! object grid, the background dataset load and thumbnail polling.

use std::sync::mpsc;

use sampler_atlas::detail::DetailResolver;
use sampler_atlas::source::{load_details, load_treemap};
use sampler_atlas::story::carousel::Arrow;
use sampler_atlas::story::StepFrame;
use sampler_atlas::treemap::zoom::Zoom;

use super::{AtlasApp, Datasets};

impl AtlasApp {
    /// Feed a scroll position into the story. Returns whether anything moved.
    pub fn on_scroll(&mut self, offset: f32, extent: f32, viewport_height: f32) -> bool {
        self.extent = extent;
        self.viewport_height = viewport_height;
        if self.last_offset == Some(offset) {
            return false;
        }
        self.last_offset = Some(offset);
        self.frame = self
            .story
            .on_scroll(offset as f64, extent as f64, viewport_height as f64);
        true
    }

    /// Scroll to just before the end of the treemap step.
    pub fn jump_to_treemap(&mut self) {
        let id = self
            .story
            .config()
            .steps
            .iter()
            .find(|s| s.content.kind() == "treemap")
            .map(|s| s.id.clone());
        match id.and_then(|id| self.story.jump_to_step_end(&id, self.extent as f64)) {
            Some(y) => self.scroll_to = Some(y as f32),
            None => log::debug!("[Nav] no treemap step to jump to"),
        }
    }

    pub fn leave_hero(&mut self) {
        self.scroll_to = Some(self.story.leave_hero(self.extent as f64) as f32);
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll_to = Some(0.0);
    }

    /// Category button: nudge the scroll into the category's slice and load it.
    pub fn select_category(&mut self, idx: usize) {
        if let Some(y) = self.story.select_category(idx, self.extent as f64) {
            self.scroll_to = Some(y as f32);
        }
        let pending = self.story.frame();
        if let Some(load) = pending.load_category {
            self.load_category(load);
        }
        self.frame.steps = pending.steps;
    }

    /// Carousel arrow on a cross-fade step.
    pub fn arrow(&mut self, step: usize, arrow: Arrow) {
        if let Some(frame) = self.story.arrow(step, arrow) {
            if let Some(slot) = self.frame.steps.get_mut(step) {
                *slot = StepFrame::CrossFade(frame);
            }
        }
    }

    pub fn load_category(&mut self, idx: usize) {
        let config = self.story.config();
        self.grid = self
            .library
            .load(self.source.as_ref(), &config.categories, idx, config.grid_cap);
    }

    // ─── Datasets ────────────────────────────────────────────────────────────

    /// Start loading the treemap and detail datasets in the background.
    pub fn load_datasets(&mut self) {
        if self.data_rx.is_some() {
            return;
        }
        let (tx, rx) = mpsc::channel();
        self.data_rx = Some(rx);

        let source = self.source.clone();
        let files = self.story.config().data.clone();
        let treemap_config = self.story.config().treemap.clone();
        std::thread::spawn(move || {
            let datasets = Datasets {
                treemap: load_treemap(source.as_ref(), &files, &treemap_config),
                details: load_details(source.as_ref(), &files),
            };
            let _ = tx.send(datasets);
        });
    }

    /// Install the datasets once the background load finishes.
    pub fn check_datasets(&mut self) {
        let Some(rx) = &self.data_rx else {
            return;
        };
        let datasets = match rx.try_recv() {
            Ok(d) => d,
            Err(mpsc::TryRecvError::Empty) => return,
            Err(mpsc::TryRecvError::Disconnected) => {
                log::warn!("[Data] dataset loader stopped without a result");
                self.data_rx = None;
                return;
            }
        };
        self.data_rx = None;

        let cap = self.story.config().thumbnails.cap;
        self.resolver = Some(DetailResolver::new(datasets.details, cap));
        self.zoom = datasets.treemap.as_ref().and_then(Zoom::new);
        if datasets.treemap.is_some() && self.zoom.is_none() {
            log::warn!("[Data] treemap has no area; nothing to draw");
        }
        self.treemap = datasets.treemap;
    }

    /// Hand finished thumbnail lookups to the resolver.
    pub fn poll_thumbnails(&mut self) {
        let responses = self.thumbs.poll();
        let Some(resolver) = self.resolver.as_mut() else {
            return;
        };
        for resp in responses {
            resolver.accept(resp);
        }
    }
}
