//! Two-image cross-fade compositor.
//!
//! Local progress is spread over the `n - 1` transitions of an image
//! sequence. Within one transition the outgoing image stays opaque until the
//! blend window opens, fades out linearly across it, and the incoming image
//! takes the complement.

/// Default blend window width, centered on the midpoint of a transition.
pub const DEFAULT_BLEND: f64 = 0.30;

/// Where local progress sits within the sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendPosition {
    /// Outgoing image.
    pub index: usize,
    /// Fraction of the way to `index + 1`.
    pub frac: f64,
}

impl BlendPosition {
    pub fn of(progress: f64, count: usize) -> Self {
        if count < 2 {
            return Self { index: 0, frac: 0.0 };
        }
        let p = progress.clamp(0.0, 1.0);
        let idx_float = p * (count - 1) as f64;
        let index = idx_float.floor() as usize;
        Self {
            index,
            frac: idx_float - index as f64,
        }
    }
}

/// Opacity of the outgoing image at `frac` for a window of width `blend`.
pub fn outgoing_opacity(frac: f64, blend: f64) -> f64 {
    let blend = blend.clamp(0.0, 1.0);
    let start = 0.5 - blend / 2.0;
    let end = 0.5 + blend / 2.0;
    if frac < start {
        1.0
    } else if frac > end || blend <= 0.0 {
        0.0
    } else {
        1.0 - (frac - start) / blend
    }
}

/// Everything the renderer needs for one cross-fade step.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossFadeFrame {
    /// One opacity per image.
    pub opacities: Vec<f64>,
    /// Image whose label is shown.
    pub label_index: usize,
    /// Overall position for the progress bar (the local progress itself).
    pub progress: f64,
}

/// Compute the frame for `count` images at local progress `progress`.
pub fn compose(progress: f64, count: usize, blend: f64) -> CrossFadeFrame {
    let progress = progress.clamp(0.0, 1.0);
    let mut opacities = vec![0.0; count];
    if count == 0 {
        return CrossFadeFrame {
            opacities,
            label_index: 0,
            progress,
        };
    }

    let pos = BlendPosition::of(progress, count);
    let out = outgoing_opacity(pos.frac, blend);
    opacities[pos.index] = out;
    if let Some(next) = opacities.get_mut(pos.index + 1) {
        *next = 1.0 - out;
    }

    let label_index = (pos.index + usize::from(pos.frac > 0.5)).min(count - 1);
    CrossFadeFrame {
        opacities,
        label_index,
        progress,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_edges() {
        assert_eq!(outgoing_opacity(0.0, DEFAULT_BLEND), 1.0);
        assert_eq!(outgoing_opacity(1.0, DEFAULT_BLEND), 0.0);
        assert!((outgoing_opacity(0.5, DEFAULT_BLEND) - 0.5).abs() < 1e-12);
        assert_eq!(outgoing_opacity(0.34, DEFAULT_BLEND), 1.0);
        assert_eq!(outgoing_opacity(0.66, DEFAULT_BLEND), 0.0);
    }

    #[test]
    fn test_active_pair_sums_to_one() {
        for n in [2, 3, 5, 8] {
            for i in 0..=400 {
                let p = i as f64 / 400.0;
                let frame = compose(p, n, DEFAULT_BLEND);
                let pos = BlendPosition::of(p, n);
                let pair = pos.index..(pos.index + 2).min(n);
                let active: f64 = frame.opacities[pair.clone()].iter().sum();
                assert!((active - 1.0).abs() < 1e-12, "n={} p={} opacities={:?}", n, p, frame.opacities);
                for (k, o) in frame.opacities.iter().enumerate() {
                    if !pair.contains(&k) {
                        assert_eq!(*o, 0.0, "n={} p={} image {}", n, p, k);
                    }
                }
            }
        }
    }

    #[test]
    fn test_transition_ends_on_incoming_image() {
        for n in [2, 3, 5, 8] {
            let steps = (n - 1) as f64;
            for k in 0..n - 1 {
                // past the blend window: outgoing gone, incoming fully shown
                let late = compose((k as f64 + 0.9) / steps, n, DEFAULT_BLEND);
                assert_eq!(late.opacities[k], 0.0, "n={} k={}", n, k);
                assert_eq!(late.opacities[k + 1], 1.0, "n={} k={}", n, k);

                // landing exactly on the next image
                let landed = compose((k + 1) as f64 / steps, n, DEFAULT_BLEND);
                for (j, o) in landed.opacities.iter().enumerate() {
                    let want = if j == k + 1 { 1.0 } else { 0.0 };
                    assert_eq!(*o, want, "n={} landed on {} image {}", n, k + 1, j);
                }
            }
        }
    }

    #[test]
    fn test_compose_midpoint_of_second_transition() {
        // 5 images → 4 transitions; p = 0.375 is halfway between images 1 and 2
        let frame = compose(0.375, 5, DEFAULT_BLEND);
        assert!((frame.opacities[1] - 0.5).abs() < 1e-9);
        assert!((frame.opacities[2] - 0.5).abs() < 1e-9);
        assert_eq!(frame.opacities[0], 0.0);
        assert_eq!(frame.opacities[3], 0.0);
        assert_eq!(frame.label_index, 1);
        assert_eq!(frame.progress, 0.375);
    }

    #[test]
    fn test_compose_end_shows_last_image() {
        let frame = compose(1.0, 4, DEFAULT_BLEND);
        assert_eq!(frame.opacities, vec![0.0, 0.0, 0.0, 1.0]);
        assert_eq!(frame.label_index, 3);
    }

    #[test]
    fn test_label_switches_after_midpoint() {
        // 3 images → 2 transitions; p = 0.3 → idxFloat 0.6
        let frame = compose(0.3, 3, DEFAULT_BLEND);
        assert_eq!(frame.label_index, 1);
        let frame = compose(0.2, 3, DEFAULT_BLEND);
        assert_eq!(frame.label_index, 0);
    }

    #[test]
    fn test_degenerate_counts() {
        assert!(compose(0.5, 0, DEFAULT_BLEND).opacities.is_empty());
        assert_eq!(compose(0.5, 1, DEFAULT_BLEND).opacities, vec![1.0]);
    }
}
