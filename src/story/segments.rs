//! Scroll timeline: one normalized axis split into per-step segments.

use crate::config::{StoryConfig, HERO_ID};

/// A contiguous slice of the normalized scroll axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub id: String,
    /// Virtual height in viewport-height units.
    pub height: f64,
    pub start: f64,
    pub end: f64,
    pub total_height: f64,
}

impl Segment {
    pub fn span(&self) -> f64 {
        self.end - self.start
    }
}

/// Ordered segments: the hero followed by one segment per step.
///
/// Immutable once built. Rebuild wholesale when the step list changes.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentTable {
    segments: Vec<Segment>,
    total_height: f64,
}

impl SegmentTable {
    /// Build from `(id, height)` pairs; the hero segment is prepended.
    pub fn build<I, S>(hero_height: f64, steps: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut raw: Vec<(String, f64)> = vec![(HERO_ID.to_string(), sanitize(hero_height))];
        raw.extend(steps.into_iter().map(|(id, h)| (id.into(), sanitize(h))));

        let total: f64 = raw.iter().map(|(_, h)| *h).sum();
        let last = raw.len() - 1;
        let mut acc = 0.0;
        let segments = raw
            .into_iter()
            .enumerate()
            .map(|(i, (id, height))| {
                let start = acc / total;
                acc += height;
                // pin the final bound so rounding never leaves a gap below 1
                let end = if i == last { 1.0 } else { acc / total };
                Segment {
                    id,
                    height,
                    start,
                    end,
                    total_height: total,
                }
            })
            .collect();

        Self {
            segments,
            total_height: total,
        }
    }

    pub fn from_config(config: &StoryConfig) -> Self {
        Self::build(
            config.default_height,
            config
                .steps
                .iter()
                .map(|s| (s.id.clone(), config.height_of(s))),
        )
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn hero(&self) -> &Segment {
        &self.segments[0]
    }

    /// Segments belonging to steps, in step order.
    pub fn steps(&self) -> &[Segment] {
        &self.segments[1..]
    }

    pub fn step_count(&self) -> usize {
        self.segments.len() - 1
    }

    pub fn get(&self, id: &str) -> Option<&Segment> {
        self.segments.iter().find(|s| s.id == id)
    }

    pub fn total_height(&self) -> f64 {
        self.total_height
    }
}

/// Non-positive or non-finite heights collapse to the default.
fn sanitize(h: f64) -> f64 {
    if h.is_finite() && h > 0.0 {
        h
    } else {
        crate::config::DEFAULT_STEP_HEIGHT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_zero_steps_is_hero_only() {
        let table = SegmentTable::build(90.0, Vec::<(String, f64)>::new());
        assert_eq!(table.segments().len(), 1);
        assert_eq!(table.hero().start, 0.0);
        assert_eq!(table.hero().end, 1.0);
        assert_eq!(table.step_count(), 0);
    }

    #[test]
    fn test_weights_drive_bounds() {
        let table = SegmentTable::build(90.0, vec![("a", 90.0), ("b", 180.0)]);
        assert_eq!(table.total_height(), 360.0);
        let b = table.get("b").unwrap();
        assert!((b.start - 0.5).abs() < 1e-12);
        assert_eq!(b.end, 1.0);
        assert!(table.get("missing").is_none());
    }

    #[test]
    fn test_bad_heights_use_default() {
        let table = SegmentTable::build(90.0, vec![("a", -3.0), ("b", f64::NAN)]);
        assert_eq!(table.total_height(), 270.0);
    }

    proptest! {
        #[test]
        fn segments_are_contiguous(heights in proptest::collection::vec(1.0f64..500.0, 0..20)) {
            let steps: Vec<(String, f64)> = heights
                .iter()
                .enumerate()
                .map(|(i, h)| (format!("s{}", i), *h))
                .collect();
            let table = SegmentTable::build(90.0, steps);
            let segs = table.segments();
            prop_assert_eq!(segs[0].start, 0.0);
            prop_assert_eq!(segs[segs.len() - 1].end, 1.0);
            for w in segs.windows(2) {
                prop_assert_eq!(w[0].end, w[1].start);
            }
            for s in segs {
                prop_assert!(0.0 <= s.start && s.start < s.end && s.end <= 1.0);
            }
            let sum: f64 = segs.iter().map(|s| s.height).sum();
            prop_assert!((sum - table.total_height()).abs() < 1e-9);
        }
    }
}
