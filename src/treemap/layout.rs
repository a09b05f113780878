//! Squarified treemap layout.
//!
//! Rows are grown while the worst aspect ratio keeps improving against a
//! golden-ratio target, then laid out as a horizontal (dice) or vertical
//! (slice) strip along the shorter side of the remaining area. Siblings are
//! separated by `padding_inner`; the outer edge of the canvas is flush.

use super::hierarchy::{Hierarchy, NodeId};

/// Target aspect ratio for squarified rows.
pub const GOLDEN_RATIO: f64 = 1.618_033_988_749_895;

/// Rectangle in logical layout space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayoutBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl LayoutBox {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn area(&self) -> f64 {
        self.width().max(0.0) * self.height().max(0.0)
    }

    /// Both sides strictly positive.
    pub fn is_degenerate(&self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0)
    }

    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }

    /// `other` lies within `self` (with a small tolerance).
    pub fn encloses(&self, other: &LayoutBox) -> bool {
        const EPS: f64 = 1e-9;
        other.x0 >= self.x0 - EPS
            && other.y0 >= self.y0 - EPS
            && other.x1 <= self.x1 + EPS
            && other.y1 <= self.y1 + EPS
    }

    /// Interiors intersect.
    pub fn overlaps(&self, other: &LayoutBox) -> bool {
        const EPS: f64 = 1e-9;
        self.x0 < other.x1 - EPS
            && other.x0 < self.x1 - EPS
            && self.y0 < other.y1 - EPS
            && other.y0 < self.y1 - EPS
    }

    /// Shrink by `p` on every side, collapsing to the center line when too small.
    pub fn inset(&self, p: f64) -> LayoutBox {
        let (mut x0, mut y0, mut x1, mut y1) = (self.x0 + p, self.y0 + p, self.x1 - p, self.y1 - p);
        if x1 < x0 {
            x0 = (x0 + x1) / 2.0;
            x1 = x0;
        }
        if y1 < y0 {
            y0 = (y0 + y1) / 2.0;
            y1 = y0;
        }
        LayoutBox { x0, y0, x1, y1 }
    }

    /// Per-side inset, as used for labels and chips.
    pub fn shrink(&self, left: f64, top: f64, right: f64, bottom: f64) -> LayoutBox {
        LayoutBox {
            x0: self.x0 + left,
            y0: self.y0 + top,
            x1: (self.x1 - right).max(self.x0 + left),
            y1: (self.y1 - bottom).max(self.y0 + top),
        }
    }

    /// Linear interpolation toward `to` at `k ∈ [0,1]`.
    pub fn lerp(&self, to: &LayoutBox, k: f64) -> LayoutBox {
        let mix = |a: f64, b: f64| a + (b - a) * k;
        LayoutBox {
            x0: mix(self.x0, to.x0),
            y0: mix(self.y0, to.y0),
            x1: mix(self.x1, to.x1),
            y1: mix(self.y1, to.y1),
        }
    }
}

/// Canvas and spacing for one layout pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    pub width: f64,
    pub height: f64,
    pub padding_inner: f64,
    pub ratio: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 520.0,
            padding_inner: 1.0,
            ratio: GOLDEN_RATIO,
        }
    }
}

/// Assign a rectangle to every node. Children are expected in layout order
/// (see [`Hierarchy::sort_by_value`]).
pub fn compute_layout(tree: &mut Hierarchy, config: &LayoutConfig) {
    let root = tree.root();
    tree.node_mut(root).bounds = LayoutBox::new(0.0, 0.0, config.width, config.height);
    position(tree, root, 0.0, config);
}

fn position(tree: &mut Hierarchy, id: NodeId, p: f64, config: &LayoutConfig) {
    let bounds = tree.node(id).bounds.inset(p);
    tree.node_mut(id).bounds = bounds;

    let children = tree.node(id).children.clone();
    if children.is_empty() {
        return;
    }

    // expand by half the gap so that each child's own inset yields the full gap
    let half = config.padding_inner / 2.0;
    let region = bounds.inset(-half).inset(0.0);
    let values: Vec<f64> = children.iter().map(|c| tree.node(*c).value).collect();
    let boxes = squarify(&values, region, config.ratio);

    for (child, b) in children.iter().zip(boxes) {
        tree.node_mut(*child).bounds = b;
    }
    for child in children {
        position(tree, child, half, config);
    }
}

/// Squarify `values` into `region`, preserving input order.
pub fn squarify(values: &[f64], region: LayoutBox, ratio: f64) -> Vec<LayoutBox> {
    let n = values.len();
    let mut out = vec![LayoutBox::new(region.x0, region.y0, region.x0, region.y0); n];
    let mut value: f64 = values.iter().sum();
    if n == 0 || !(value > 0.0) {
        return out;
    }

    let LayoutBox { mut x0, mut y0, x1, y1 } = region;
    let (mut i0, mut i1) = (0usize, 0usize);

    while i0 < n {
        let dx = x1 - x0;
        let dy = y1 - y0;

        // next non-empty node opens the row
        let mut sum_value;
        loop {
            sum_value = values[i1];
            i1 += 1;
            if sum_value != 0.0 || i1 >= n {
                break;
            }
        }
        let mut min_value = sum_value;
        let mut max_value = sum_value;
        let alpha = (dy / dx).max(dx / dy) / (value * ratio);
        let mut beta = sum_value * sum_value * alpha;
        let mut min_ratio = (max_value / beta).max(beta / min_value);

        // keep adding nodes while the aspect ratio holds or improves
        while i1 < n {
            let node_value = values[i1];
            sum_value += node_value;
            min_value = min_value.min(node_value);
            max_value = max_value.max(node_value);
            beta = sum_value * sum_value * alpha;
            let new_ratio = (max_value / beta).max(beta / min_value);
            if new_ratio > min_ratio {
                sum_value -= node_value;
                break;
            }
            min_ratio = new_ratio;
            i1 += 1;
        }

        let row = &values[i0..i1];
        if dx < dy {
            let ny = if value > 0.0 { y0 + dy * sum_value / value } else { y1 };
            dice(row, sum_value, LayoutBox::new(x0, y0, x1, ny), &mut out[i0..i1]);
            y0 = ny;
        } else {
            let nx = if value > 0.0 { x0 + dx * sum_value / value } else { x1 };
            slice(row, sum_value, LayoutBox::new(x0, y0, nx, y1), &mut out[i0..i1]);
            x0 = nx;
        }
        value -= sum_value;
        i0 = i1;
    }
    out
}

/// Partition a row left to right.
fn dice(row: &[f64], sum: f64, b: LayoutBox, out: &mut [LayoutBox]) {
    let k = if sum > 0.0 { b.width() / sum } else { 0.0 };
    let mut x = b.x0;
    for (v, slot) in row.iter().zip(out.iter_mut()) {
        let next = x + v * k;
        *slot = LayoutBox::new(x, b.y0, next, b.y1);
        x = next;
    }
}

/// Partition a row top to bottom.
fn slice(row: &[f64], sum: f64, b: LayoutBox, out: &mut [LayoutBox]) {
    let k = if sum > 0.0 { b.height() / sum } else { 0.0 };
    let mut y = b.y0;
    for (v, slot) in row.iter().zip(out.iter_mut()) {
        let next = y + v * k;
        *slot = LayoutBox::new(b.x0, y, b.x1, next);
        y = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::treemap::hierarchy::RawNode;

    fn tree() -> Hierarchy {
        let raw = RawNode::branch(
            "root",
            vec![
                RawNode::branch(
                    "a",
                    vec![RawNode::leaf("a1", 40.0), RawNode::leaf("a2", 20.0)],
                ),
                RawNode::branch(
                    "b",
                    vec![
                        RawNode::leaf("b1", 15.0),
                        RawNode::leaf("b2", 10.0),
                        RawNode::leaf("b3", 5.0),
                    ],
                ),
                RawNode::branch("c", vec![RawNode::leaf("c1", 10.0)]),
            ],
        );
        let mut h = Hierarchy::from_raw(&raw);
        h.sort_by_value();
        h
    }

    #[test]
    fn test_squarify_fills_region_proportionally() {
        let region = LayoutBox::new(0.0, 0.0, 600.0, 400.0);
        let values = [6.0, 6.0, 4.0, 3.0, 2.0, 2.0, 1.0];
        let boxes = squarify(&values, region, GOLDEN_RATIO);
        let total: f64 = values.iter().sum();
        for (v, b) in values.iter().zip(&boxes) {
            assert!((b.area() - region.area() * v / total).abs() < 1e-6);
            assert!(region.encloses(b));
        }
        for i in 0..boxes.len() {
            for j in i + 1..boxes.len() {
                assert!(!boxes[i].overlaps(&boxes[j]), "{:?} vs {:?}", boxes[i], boxes[j]);
            }
        }
    }

    #[test]
    fn test_zero_values_collapse() {
        let region = LayoutBox::new(0.0, 0.0, 100.0, 100.0);
        let boxes = squarify(&[0.0, 5.0, 0.0], region, GOLDEN_RATIO);
        assert_eq!(boxes[0].area(), 0.0);
        assert!((boxes[1].area() - 10_000.0).abs() < 1e-6);
        assert_eq!(boxes[2].area(), 0.0);
        assert!(squarify(&[0.0, 0.0], region, GOLDEN_RATIO)
            .iter()
            .all(|b| b.area() == 0.0));
    }

    #[test]
    fn test_layout_containment_and_gaps() {
        let mut h = tree();
        compute_layout(&mut h, &LayoutConfig::default());
        let root = h.root();
        assert_eq!(h.node(root).bounds, LayoutBox::new(0.0, 0.0, 1000.0, 520.0));

        for id in h.ids() {
            let node = h.node(id);
            for c in &node.children {
                assert!(node.bounds.encloses(&h.node(*c).bounds));
            }
            for (i, a) in node.children.iter().enumerate() {
                for b in &node.children[i + 1..] {
                    assert!(!h.node(*a).bounds.overlaps(&h.node(*b).bounds));
                }
            }
        }
    }

    #[test]
    fn test_leaf_area_proportional_without_padding() {
        let mut h = tree();
        let config = LayoutConfig {
            padding_inner: 0.0,
            ..LayoutConfig::default()
        };
        compute_layout(&mut h, &config);
        let total = h.node(h.root()).value;
        for leaf in h.leaves(h.root()) {
            let node = h.node(leaf);
            let expected = 1000.0 * 520.0 * node.value / total;
            assert!((node.bounds.area() - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn test_inset_collapses() {
        let b = LayoutBox::new(0.0, 0.0, 1.0, 10.0).inset(2.0);
        assert_eq!(b.x0, b.x1);
        assert_eq!(b.x0, 0.5);
        assert!(b.is_degenerate());
    }
}
