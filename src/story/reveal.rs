//! Progressive reveal for gallery tiles.
//!
//! Tile `k` of `m` is visible once local progress passes `k / m`. Nothing is
//! remembered between ticks, so scrolling back hides tiles again.

/// Threshold local progress must exceed for tile `k` of `m`.
pub fn threshold(k: usize, m: usize) -> f64 {
    if m == 0 {
        return 1.0;
    }
    k as f64 / m as f64
}

/// Visibility of every tile at local progress `p`.
pub fn revealed(p: f64, m: usize) -> Vec<bool> {
    (0..m).map(|k| p > threshold(k, m)).collect()
}
