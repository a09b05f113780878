//! Cursor-anchored tooltip placement.
//!
//! A tooltip sits below-right of the cursor, flips to the other side on an
//! axis where it would overflow, and is then kept inside the viewport.

/// Placement rules for one kind of tooltip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Gap between cursor and tooltip.
    pub offset: f64,
    /// Room that must remain past the far edge before flipping.
    pub slack: f64,
    /// Minimum distance from the viewport edges.
    pub margin: f64,
    /// Also clamp against the right/bottom edges.
    pub clamp_far: bool,
}

impl Placement {
    pub const TREEMAP: Placement = Placement {
        offset: 12.0,
        slack: 2.0,
        margin: 4.0,
        clamp_far: true,
    };

    pub const GRID: Placement = Placement {
        offset: 14.0,
        slack: 12.0,
        margin: 12.0,
        clamp_far: false,
    };

    /// Top-left corner for a tooltip of `size` at `cursor` in a `viewport`.
    pub fn place(&self, cursor: (f64, f64), size: (f64, f64), viewport: (f64, f64)) -> (f64, f64) {
        (
            self.axis(cursor.0, size.0, viewport.0),
            self.axis(cursor.1, size.1, viewport.1),
        )
    }

    fn axis(&self, cursor: f64, size: f64, extent: f64) -> f64 {
        let mut pos = cursor + self.offset;
        if pos + size + self.slack > extent {
            pos = cursor - size - self.offset;
        }
        if self.clamp_far {
            pos = pos.min(extent - size - self.margin);
        }
        pos.max(self.margin)
    }
}
