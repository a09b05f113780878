//! Quartile category selector for the object grid.

/// Category index for local progress `p` across `n` categories.
pub fn category_at(p: f64, n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    let idx = (p.clamp(0.0, 1.0) * n as f64).floor() as usize;
    idx.min(n - 1)
}

/// Tracks the loaded category so a load is requested only on change.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySelector {
    count: usize,
    loaded: Option<usize>,
}

impl CategorySelector {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            loaded: None,
        }
    }

    pub fn loaded(&self) -> Option<usize> {
        self.loaded
    }

    /// Returns the index to load when `p` maps to a different category.
    pub fn update(&mut self, p: f64) -> Option<usize> {
        if self.count == 0 {
            return None;
        }
        let idx = category_at(p, self.count);
        self.select(idx)
    }

    /// Explicit selection (category buttons). Returns the index when it changed.
    pub fn select(&mut self, idx: usize) -> Option<usize> {
        if idx >= self.count || self.loaded == Some(idx) {
            return None;
        }
        self.loaded = Some(idx);
        Some(idx)
    }

    /// Local progress at which category `idx` begins.
    pub fn quartile_start(&self, idx: usize) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        idx.min(self.count - 1) as f64 / self.count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quartiles() {
        assert_eq!(category_at(0.24, 4), 0);
        assert_eq!(category_at(0.26, 4), 1);
        assert_eq!(category_at(0.5, 4), 2);
        assert_eq!(category_at(1.0, 4), 3);
        assert_eq!(category_at(0.7, 0), 0);
    }

    #[test]
    fn test_loads_only_on_change() {
        let mut sel = CategorySelector::new(4);
        assert_eq!(sel.update(0.1), Some(0));
        assert_eq!(sel.update(0.2), None);
        assert_eq!(sel.update(0.3), Some(1));
        assert_eq!(sel.update(0.3), None);
        assert_eq!(sel.loaded(), Some(1));
    }

    #[test]
    fn test_select_and_nudge_target() {
        let mut sel = CategorySelector::new(4);
        assert_eq!(sel.select(2), Some(2));
        assert_eq!(sel.select(2), None);
        assert_eq!(sel.select(9), None);
        assert_eq!(sel.quartile_start(2), 0.5);
    }
}
