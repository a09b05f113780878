//! Arrow navigation through a cross-fade sequence.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arrow {
    Left,
    Right,
}

impl Arrow {
    fn sign(self) -> f64 {
        match self {
            Arrow::Left => -1.0,
            Arrow::Right => 1.0,
        }
    }
}

/// Move `progress` one image along a sequence of `count` images.
///
/// With `wrap`, stepping past an end jumps to the opposite end. Without it the
/// result is clamped. Sequences shorter than two images ignore input.
pub fn step(progress: f64, count: usize, arrow: Arrow, wrap: bool) -> f64 {
    if count < 2 {
        return progress;
    }
    let stride = 1.0 / (count - 1) as f64;
    let next = progress + arrow.sign() * stride;

    if wrap {
        if next < 0.0 {
            1.0
        } else if next > 1.0 {
            0.0
        } else {
            next
        }
    } else {
        next.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_left_from_start() {
        assert_eq!(step(0.0, 5, Arrow::Left, true), 1.0);
        assert_eq!(step(1.0, 5, Arrow::Right, true), 0.0);
    }

    #[test]
    fn test_clamp_without_wrap() {
        assert_eq!(step(0.0, 5, Arrow::Left, false), 0.0);
        assert_eq!(step(1.0, 5, Arrow::Right, false), 1.0);
    }

    #[test]
    fn test_one_image_per_click() {
        assert_eq!(step(0.0, 5, Arrow::Right, true), 0.25);
        assert_eq!(step(0.5, 5, Arrow::Left, true), 0.25);
    }

    #[test]
    fn test_single_image_ignores_input() {
        assert_eq!(step(0.4, 1, Arrow::Right, true), 0.4);
        assert_eq!(step(0.4, 0, Arrow::Left, false), 0.4);
    }
}
