//! Scroll-driven narrative timeline.
//!
//! `Story` owns the segment table and the scroll state. Each scroll event
//! goes through [`Story::on_scroll`], which recomputes the state from scratch
//! and hands back a [`StoryFrame`] of plain values for the renderer.
//!
//! - `segments`: normalized timeline
//! - `progress`: offset → t → active step and local progress
//! - `crossfade`: two-image blend for `compartment` steps
//! - `reveal`: threshold-gated gallery tiles
//! - `category`: quartile category selector
//! - `carousel`: arrow stepping through a cross-fade

pub mod carousel;
pub mod category;
pub mod crossfade;
pub mod progress;
pub mod reveal;
pub mod segments;

use crate::config::{StepContent, StoryConfig};

use self::carousel::Arrow;
use self::category::CategorySelector;
use self::crossfade::CrossFadeFrame;
use self::progress::{global_progress, ScrollState};
use self::segments::SegmentTable;

/// Fraction of a viewport height scrolled before the up arrow shows.
const UP_ARROW_THRESHOLD: f64 = 0.8;

/// Per-step render values.
#[derive(Debug, Clone, PartialEq)]
pub enum StepFrame {
    /// Cards and single images: nothing scroll-dependent.
    Static,
    Gallery { revealed: Vec<bool> },
    CrossFade(CrossFadeFrame),
    ObjectGrid { category: usize },
    Treemap,
    /// Unknown step kinds render nothing.
    Empty,
}

/// Everything the renderer needs after one scroll tick.
#[derive(Debug, Clone, PartialEq)]
pub struct StoryFrame {
    pub t: f64,
    pub active_step: Option<usize>,
    pub hero_visible: bool,
    /// Grid background behind steps, plain backdrop in the hero.
    pub grid_background: bool,
    pub up_arrow_visible: bool,
    pub steps: Vec<StepFrame>,
    /// Category the object grid should load now, if it changed.
    pub load_category: Option<usize>,
}

pub struct Story {
    config: StoryConfig,
    table: SegmentTable,
    state: ScrollState,
    selector: CategorySelector,
    /// Last reveal state per gallery step; only refreshed while active.
    revealed: Vec<Vec<bool>>,
    pending_load: Option<usize>,
}

impl Story {
    pub fn new(config: StoryConfig) -> Self {
        let table = SegmentTable::from_config(&config);
        let mut selector = CategorySelector::new(config.categories.len());
        // the grid shows its first category before the step is ever reached
        let pending_load = selector.select(0);
        let revealed = config
            .steps
            .iter()
            .map(|s| match &s.content {
                StepContent::Gallery { images, .. } => vec![false; images.len()],
                _ => Vec::new(),
            })
            .collect();
        Self {
            state: ScrollState::initial(config.steps.len()),
            config,
            table,
            selector,
            revealed,
            pending_load,
        }
    }

    pub fn config(&self) -> &StoryConfig {
        &self.config
    }

    pub fn table(&self) -> &SegmentTable {
        &self.table
    }

    pub fn state(&self) -> &ScrollState {
        &self.state
    }

    /// Recompute everything for a new scroll offset.
    ///
    /// `extent` is the scrollable distance, `viewport_height` the visible height.
    pub fn on_scroll(&mut self, offset: f64, extent: f64, viewport_height: f64) -> StoryFrame {
        let t = global_progress(offset, extent);
        self.state = ScrollState::at(&self.table, t, self.state.selected_category);

        for (i, step) in self.config.steps.iter().enumerate() {
            if self.state.active_step != Some(i) {
                continue;
            }
            match &step.content {
                StepContent::Gallery { images, .. } => {
                    self.revealed[i] = reveal::revealed(self.state.local_of(i), images.len());
                }
                StepContent::ObjectGrid { .. } => {
                    if let Some(idx) = self.selector.update(self.state.local_of(i)) {
                        self.state.selected_category = idx;
                        self.pending_load = Some(idx);
                    }
                }
                _ => {}
            }
        }

        let mut frame = self.frame();
        frame.up_arrow_visible = offset > viewport_height * UP_ARROW_THRESHOLD;
        frame
    }

    /// Frame for the current state without touching the scroll position.
    pub fn frame(&mut self) -> StoryFrame {
        let state = &self.state;
        let steps = self
            .config
            .steps
            .iter()
            .enumerate()
            .map(|(i, step)| match &step.content {
                StepContent::Card { .. } | StepContent::SingleImage { .. } => StepFrame::Static,
                StepContent::Gallery { .. } => StepFrame::Gallery {
                    revealed: self.revealed[i].clone(),
                },
                StepContent::CrossFade { frames, .. } => StepFrame::CrossFade(
                    crossfade::compose(state.local_of(i), frames.len(), self.config.blend),
                ),
                StepContent::ObjectGrid { .. } => StepFrame::ObjectGrid {
                    category: state.selected_category,
                },
                StepContent::Treemap => StepFrame::Treemap,
                StepContent::Unknown { .. } => StepFrame::Empty,
            })
            .collect();

        StoryFrame {
            t: state.t,
            active_step: state.active_step,
            hero_visible: state.in_hero(&self.table),
            grid_background: state.active_step.is_some(),
            up_arrow_visible: false,
            steps,
            load_category: self.pending_load.take(),
        }
    }

    /// Arrow click on a cross-fade step. Returns the new frame for that step.
    ///
    /// The override lasts until the next scroll event recomputes the state.
    pub fn arrow(&mut self, step: usize, arrow: Arrow) -> Option<CrossFadeFrame> {
        let count = match &self.config.steps.get(step)?.content {
            StepContent::CrossFade { frames, .. } => frames.len(),
            _ => return None,
        };
        let current = self.state.local_of(step);
        let next = carousel::step(current, count, arrow, self.config.carousel_wrap);
        if let Some(slot) = self.state.local.get_mut(step) {
            *slot = next;
        }
        Some(crossfade::compose(next, count, self.config.blend))
    }

    // ── Scroll targets ──────────────────────────────────────────────────────

    /// Pixel height of the scroll track for a viewport of `viewport_height`.
    pub fn track_height(&self, viewport_height: f64) -> f64 {
        self.table.total_height() * viewport_height / 100.0
    }

    /// Offset that lands just inside the end of a step's segment.
    pub fn jump_to_step_end(&self, id: &str, extent: f64) -> Option<f64> {
        let seg = self.table.get(id)?;
        let epsilon = (seg.span() * 0.02).max(0.0003);
        let t = (seg.end - epsilon).clamp(0.0, 1.0);
        Some((t * extent).round())
    }

    /// Offset just past the hero so the first step is definitely active.
    pub fn leave_hero(&self, extent: f64) -> f64 {
        (self.table.hero().end * extent).ceil() + 2.0
    }

    /// Category button: offset for the category's slice of the grid step and
    /// a pending load. `None` when the index or grid step does not exist.
    pub fn select_category(&mut self, idx: usize, extent: f64) -> Option<f64> {
        if idx >= self.config.categories.len() {
            return None;
        }
        if self.selector.select(idx).is_some() {
            self.state.selected_category = idx;
            self.pending_load = Some(idx);
        }
        let step = self
            .config
            .steps
            .iter()
            .find(|s| matches!(s.content, StepContent::ObjectGrid { .. }))?;
        let seg = self.table.get(&step.id)?;
        // aim mid-slice so rounding back to a scroll offset stays in the bucket
        let n = self.config.categories.len() as f64;
        let local = self.selector.quartile_start(idx) + 0.5 / n;
        Some(((seg.start + local * seg.span()) * extent).round())
    }
}
