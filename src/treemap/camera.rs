//! Linear scales that map the focused rectangle onto the viewport.

use super::layout::LayoutBox;

/// Affine map from `domain` to `range`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    /// `None` when the domain has zero (or non-finite) width.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Option<Self> {
        let width = domain.1 - domain.0;
        if !(width.is_finite() && width != 0.0) {
            return None;
        }
        Some(Self { domain, range })
    }

    pub fn apply(&self, v: f64) -> f64 {
        let k = (v - self.domain.0) / (self.domain.1 - self.domain.0);
        self.range.0 + k * (self.range.1 - self.range.0)
    }
}

/// Horizontal and vertical scales for one focus rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub x: LinearScale,
    pub y: LinearScale,
    pub focus: LayoutBox,
}

impl Camera {
    /// Stretch `focus` over a `width × height` viewport.
    /// Refuses rectangles with a zero-length side.
    pub fn focused(focus: LayoutBox, width: f64, height: f64) -> Option<Self> {
        if focus.is_degenerate() {
            return None;
        }
        Some(Self {
            x: LinearScale::new((focus.x0, focus.x1), (0.0, width))?,
            y: LinearScale::new((focus.y0, focus.y1), (0.0, height))?,
            focus,
        })
    }

    /// Layout rectangle → screen rectangle.
    pub fn project(&self, b: &LayoutBox) -> LayoutBox {
        LayoutBox::new(
            self.x.apply(b.x0),
            self.y.apply(b.y0),
            self.x.apply(b.x1),
            self.y.apply(b.y1),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_maps_ends() {
        let s = LinearScale::new((100.0, 300.0), (0.0, 1000.0)).unwrap();
        assert_eq!(s.apply(100.0), 0.0);
        assert_eq!(s.apply(300.0), 1000.0);
        assert_eq!(s.apply(200.0), 500.0);
    }

    #[test]
    fn test_degenerate_domain_refused() {
        assert!(LinearScale::new((5.0, 5.0), (0.0, 1.0)).is_none());
        let flat = LayoutBox::new(10.0, 10.0, 10.0, 50.0);
        assert!(Camera::focused(flat, 1000.0, 520.0).is_none());
    }

    #[test]
    fn test_focus_fills_viewport() {
        let focus = LayoutBox::new(250.0, 130.0, 500.0, 260.0);
        let cam = Camera::focused(focus, 1000.0, 520.0).unwrap();
        assert_eq!(cam.project(&focus), LayoutBox::new(0.0, 0.0, 1000.0, 520.0));
        let inner = LayoutBox::new(250.0, 130.0, 375.0, 195.0);
        assert_eq!(cam.project(&inner), LayoutBox::new(0.0, 0.0, 500.0, 260.0));
    }
}
