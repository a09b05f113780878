//! Scroll offset → global progress → active step and local progress.
//!
//! Everything here is a pure function of the offset and the segment table.

use super::segments::{Segment, SegmentTable};

/// Global progress for a raw scroll offset.
///
/// `extent` is the scrollable distance (content height minus viewport height).
/// A zero or negative extent yields 0.
pub fn global_progress(offset: f64, extent: f64) -> f64 {
    if extent <= 0.0 || !offset.is_finite() {
        return 0.0;
    }
    (offset / extent).clamp(0.0, 1.0)
}

/// Index of the segment containing `t`. The last segment is closed at 1.
pub fn segment_index_at(table: &SegmentTable, t: f64) -> usize {
    let segs = table.segments();
    let last = segs.len() - 1;
    segs.iter()
        .position(|s| t >= s.start && t < s.end)
        .unwrap_or(if t >= segs[last].start { last } else { 0 })
}

/// Active step for `t`, `None` while in the hero.
pub fn active_step_at(table: &SegmentTable, t: f64) -> Option<usize> {
    segment_index_at(table, t).checked_sub(1)
}

/// Local progress within a segment: 0 before it, 1 after it.
pub fn local_in(segment: &Segment, t: f64) -> f64 {
    let span = segment.span();
    if span <= 0.0 || !span.is_finite() {
        return 0.0;
    }
    ((t - segment.start) / span).clamp(0.0, 1.0)
}

/// Local progress for a segment looked up by id; 0 when the id is unknown.
pub fn local_progress(table: &SegmentTable, t: f64, id: &str) -> f64 {
    table.get(id).map(|seg| local_in(seg, t)).unwrap_or(0.0)
}

/// Snapshot of the scroll timeline at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollState {
    pub t: f64,
    pub active_step: Option<usize>,
    /// Local progress per step, in step order.
    pub local: Vec<f64>,
    /// Object-grid category currently loaded.
    pub selected_category: usize,
}

impl ScrollState {
    pub fn initial(step_count: usize) -> Self {
        Self {
            t: 0.0,
            active_step: None,
            local: vec![0.0; step_count],
            selected_category: 0,
        }
    }

    /// Recompute from scratch for `t`, carrying only the loaded category.
    pub fn at(table: &SegmentTable, t: f64, selected_category: usize) -> Self {
        Self {
            t,
            active_step: active_step_at(table, t),
            local: table.steps().iter().map(|s| local_in(s, t)).collect(),
            selected_category,
        }
    }

    pub fn local_of(&self, step: usize) -> f64 {
        self.local.get(step).copied().unwrap_or(0.0)
    }

    pub fn in_hero(&self, table: &SegmentTable) -> bool {
        self.t < table.hero().end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn table() -> SegmentTable {
        SegmentTable::build(100.0, vec![("a", 100.0), ("b", 200.0)])
    }

    #[test]
    fn test_zero_extent() {
        assert_eq!(global_progress(120.0, 0.0), 0.0);
        assert_eq!(global_progress(50.0, 100.0), 0.5);
        assert_eq!(global_progress(500.0, 100.0), 1.0);
    }

    #[test]
    fn test_active_step() {
        let t = table();
        assert_eq!(active_step_at(&t, 0.0), None);
        assert_eq!(active_step_at(&t, 0.2499), None);
        assert_eq!(active_step_at(&t, 0.25), Some(0));
        assert_eq!(active_step_at(&t, 0.5), Some(1));
        // the last segment still owns t == 1
        assert_eq!(active_step_at(&t, 1.0), Some(1));
    }

    #[test]
    fn test_local_progress() {
        let t = table();
        assert_eq!(local_progress(&t, 0.75, "b"), 0.5);
        assert_eq!(local_progress(&t, 0.1, "b"), 0.0);
        assert_eq!(local_progress(&t, 0.9, "a"), 1.0);
        assert_eq!(local_progress(&t, 0.5, "nope"), 0.0);
    }

    #[test]
    fn test_zero_length_segment() {
        let seg = Segment {
            id: "z".into(),
            height: 0.0,
            start: 0.5,
            end: 0.5,
            total_height: 1.0,
        };
        assert_eq!(local_in(&seg, 0.5), 0.0);
    }

    #[test]
    fn test_state_is_idempotent() {
        let t = table();
        let a = ScrollState::at(&t, global_progress(333.0, 1000.0), 2);
        let b = ScrollState::at(&t, global_progress(333.0, 1000.0), 2);
        assert_eq!(a, b);
        assert_eq!(a.active_step, Some(0));
        assert!(!a.in_hero(&t));
    }

    proptest! {
        #[test]
        fn local_progress_is_monotone(a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
            let t = table();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            for id in ["hero", "a", "b"] {
                let pl = local_progress(&t, lo, id);
                let ph = local_progress(&t, hi, id);
                prop_assert!(pl <= ph);
                prop_assert!((0.0..=1.0).contains(&pl));
                prop_assert!((0.0..=1.0).contains(&ph));
            }
        }
    }
}
