//! Zoom transition tween.
//!
//! Driven by frame deltas rather than wall-clock reads so that the renderer
//! and tests advance it the same way.

use std::time::Duration;

use super::camera::Camera;
use super::layout::LayoutBox;

/// Cubic ease-in-out over `t ∈ [0,1]`.
pub fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0) * 2.0;
    if t <= 1.0 {
        t * t * t / 2.0
    } else {
        let u = t - 2.0;
        (u * u * u + 2.0) / 2.0
    }
}

/// Camera tween between two focus rectangles.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    from: Camera,
    to: Camera,
    elapsed: Duration,
    duration: Duration,
}

impl Transition {
    pub fn new(from: Camera, to: Camera, duration: Duration) -> Self {
        Self {
            from,
            to,
            elapsed: Duration::ZERO,
            duration,
        }
    }

    /// Linear progress in `[0,1]`.
    pub fn progress(&self) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    pub fn eased(&self) -> f64 {
        ease_cubic_in_out(self.progress())
    }

    pub fn is_settled(&self) -> bool {
        self.progress() >= 1.0
    }

    /// Advance by one frame. Returns true once the tween has finished.
    pub fn advance(&mut self, dt: Duration) -> bool {
        self.elapsed = (self.elapsed + dt).min(self.duration);
        self.is_settled()
    }

    /// Screen rectangle of a layout box at the current point of the tween.
    pub fn project(&self, b: &LayoutBox) -> LayoutBox {
        let start = self.from.project(b);
        let end = self.to.project(b);
        start.lerp(&end, self.eased())
    }
}
