//! Detail view with cached, sequential thumbnail resolution.
//!
//! Opening a view filters the dataset and emits lookup requests for the first
//! `cap` entries that are not already cached. Responses come back through
//! [`DetailResolver::accept`]; every response lands in the cache, but only the
//! view that is still waiting on that id gets updated. Once nothing is pending
//! the list is reordered so entries with a thumbnail come first.

use std::collections::HashSet;

use crate::config::TreemapConfig;
use crate::net::cache::{ImageCache, Thumb};
use crate::net::thumbs::{lookup_or_missing, ThumbRequest, ThumbResponse, ThumbnailLookup};

use super::rows::{DetailDataset, DetailRow};

#[derive(Debug, Clone, PartialEq)]
pub struct DetailEntry {
    pub row: DetailRow,
    /// `None` until resolved, and forever for records without an image.
    pub thumbnail: Option<String>,
}

impl DetailEntry {
    pub fn display_title(&self) -> &str {
        let t = self.row.title.trim();
        if t.is_empty() {
            "(Untitled)"
        } else {
            t
        }
    }

    pub fn unit_line(&self, config: &TreemapConfig) -> String {
        self.row.unit_line(config)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub generation: u64,
    pub title: String,
    pub family: String,
    pub entries: Vec<DetailEntry>,
    pending: HashSet<String>,
}

impl DetailView {
    pub fn subtitle(&self) -> String {
        let n = self.entries.len();
        format!("{} object{}", n, if n == 1 { "" } else { "s" })
    }

    /// No lookups outstanding; the final order is in place.
    pub fn is_settled(&self) -> bool {
        self.pending.is_empty()
    }

    fn apply(&mut self, id: &str, thumb: &Thumb, cap: usize) {
        for entry in self.entries.iter_mut().take(cap) {
            if entry.row.id == id {
                entry.thumbnail = thumb.url().map(str::to_string);
            }
        }
    }

    fn reorder(&mut self) {
        // stable: relative order within each group is kept
        self.entries.sort_by_key(|e| e.thumbnail.is_none());
    }
}

pub struct DetailResolver {
    dataset: DetailDataset,
    cache: ImageCache,
    cap: usize,
    generation: u64,
    view: Option<DetailView>,
    in_flight: HashSet<String>,
}

impl DetailResolver {
    pub fn new(dataset: DetailDataset, cap: usize) -> Self {
        Self {
            dataset,
            cache: ImageCache::new(),
            cap,
            generation: 0,
            view: None,
            in_flight: HashSet::new(),
        }
    }

    pub fn view(&self) -> Option<&DetailView> {
        self.view.as_ref()
    }

    /// Detail row for a tile id, through the dataset's join-key index.
    pub fn row_for_key(&self, key: &str) -> Option<&DetailRow> {
        self.dataset.find_by_key(key)
    }

    /// Open a view for `object_type` within `family`, replacing any open one.
    /// Returns the lookups to run, in entry order.
    pub fn open(&mut self, object_type: &str, family: &str) -> Vec<ThumbRequest> {
        self.generation += 1;
        let rows = self.dataset.filter(object_type, family);
        log::info!(
            "[Details] {} / {}: {} rows (generation {})",
            object_type,
            family,
            rows.len(),
            self.generation
        );

        let mut view = DetailView {
            generation: self.generation,
            title: object_type.to_string(),
            family: family.to_string(),
            entries: rows
                .into_iter()
                .map(|row| DetailEntry {
                    row,
                    thumbnail: None,
                })
                .collect(),
            pending: HashSet::new(),
        };

        let mut requests = Vec::new();
        let ids: Vec<String> = view
            .entries
            .iter()
            .take(self.cap)
            .map(|e| e.row.id.clone())
            .collect();
        for id in ids {
            if id.is_empty() || view.pending.contains(&id) {
                continue;
            }
            if let Some(thumb) = self.cache.lookup(&id).cloned() {
                view.apply(&id, &thumb, self.cap);
                continue;
            }
            view.pending.insert(id.clone());
            // already requested for an earlier view; its response will do
            if self.in_flight.insert(id.clone()) {
                requests.push(ThumbRequest {
                    generation: self.generation,
                    id,
                });
            }
        }

        log::debug!(
            "[Details] {} lookups queued, thumb cache {} entries ({:.0}% hits)",
            requests.len(),
            self.cache.len(),
            self.cache.hit_rate() * 100.0
        );

        if view.is_settled() {
            view.reorder();
        }
        self.view = Some(view);
        requests
    }

    /// Hide the current view. Outstanding lookups still fill the cache.
    pub fn close(&mut self) {
        self.view = None;
    }

    /// Record a lookup result. Returns true when the open view changed.
    pub fn accept(&mut self, resp: ThumbResponse) -> bool {
        let thumb = Thumb::from(resp.url);
        self.in_flight.remove(&resp.id);
        self.cache.insert(resp.id.clone(), thumb.clone());

        let Some(view) = self.view.as_mut() else {
            return false;
        };
        if !view.pending.remove(&resp.id) {
            if resp.generation != view.generation {
                log::debug!("[Details] stale result for {} (generation {})", resp.id, resp.generation);
            }
            return false;
        }
        view.apply(&resp.id, &thumb, self.cap);
        if view.is_settled() {
            view.reorder();
        }
        true
    }

    /// Run `requests` synchronously through `lookup`.
    pub fn resolve_with(&mut self, lookup: &mut dyn ThumbnailLookup, requests: Vec<ThumbRequest>) {
        for req in requests {
            let url = lookup_or_missing(lookup, &req.id);
            self.accept(ThumbResponse {
                generation: req.generation,
                id: req.id,
                url,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;

    /// Finds a thumbnail for every id ending in an even digit.
    #[derive(Default)]
    struct Counting {
        calls: Vec<String>,
    }

    impl ThumbnailLookup for Counting {
        fn lookup(&mut self, id: &str) -> Result<Option<String>> {
            self.calls.push(id.to_string());
            let even = id
                .chars()
                .last()
                .and_then(|c| c.to_digit(10))
                .map(|d| d % 2 == 0)
                .unwrap_or(false);
            Ok(even.then(|| format!("https://img.example/{}.jpg", id)))
        }
    }

    fn rows(object_type: &str, family: &str, n: usize) -> serde_json::Value {
        let rows: Vec<_> = (0..n)
            .map(|i| {
                serde_json::json!({
                    "EDANurl": format!("{}_{}", object_type, i),
                    "action_family": family,
                    "title": if i == 0 { String::new() } else { format!("Item {}", i) },
                    "unitCode": "NMAH"
                })
            })
            .collect();
        serde_json::Value::Array(rows)
    }

    fn resolver() -> DetailResolver {
        let mut doc = serde_json::Map::new();
        doc.insert("Spoon".into(), rows("spoon", "Eat, Cook & Drink", 60));
        doc.insert("Cup".into(), rows("cup", "Eat, Cook & Drink", 3));
        DetailResolver::new(DetailDataset::from_value(&serde_json::Value::Object(doc)), 50)
    }

    #[test]
    fn test_row_for_key_uses_join_key() {
        let r = resolver();
        let row = r.row_for_key("cup_2").unwrap();
        assert_eq!(row.title, "Item 2");
        assert_eq!(row.unit_line(&TreemapConfig::default()), "National Museum of American History (NMAH)");
        assert!(r.row_for_key("teapot_0").is_none());
    }

    #[test]
    fn test_cap_limits_lookups() {
        let mut r = resolver();
        let mut lookup = Counting::default();
        let reqs = r.open("Spoon", "eat, cook & drink");
        assert_eq!(reqs.len(), 50);
        r.resolve_with(&mut lookup, reqs);
        assert_eq!(lookup.calls.len(), 50);
        assert_eq!(lookup.calls[0], "spoon_0");
        assert_eq!(lookup.calls[49], "spoon_49");

        let view = r.view().unwrap();
        assert!(view.is_settled());
        assert_eq!(view.entries.len(), 60);
        assert_eq!(view.subtitle(), "60 objects");
        // 25 even ids under the cap have thumbnails and come first, in order
        let with: Vec<_> = view.entries.iter().take_while(|e| e.thumbnail.is_some()).collect();
        assert_eq!(with.len(), 25);
        assert_eq!(with[0].row.id, "spoon_0");
        assert_eq!(with[1].row.id, "spoon_2");
        assert_eq!(view.entries[25].row.id, "spoon_1");
        assert!(view.entries.iter().skip(25).all(|e| e.thumbnail.is_none()));
    }

    #[test]
    fn test_cache_prevents_second_lookup() {
        let mut r = resolver();
        let mut lookup = Counting::default();
        let reqs = r.open("Cup", "Eat, Cook & Drink");
        r.resolve_with(&mut lookup, reqs);
        assert_eq!(lookup.calls.len(), 3);

        r.close();
        let reqs = r.open("Cup", "Eat, Cook & Drink");
        assert!(reqs.is_empty());
        let view = r.view().unwrap();
        assert!(view.is_settled());
        assert_eq!(view.entries[0].thumbnail.as_deref(), Some("https://img.example/cup_0.jpg"));
        assert_eq!(view.entries[0].display_title(), "(Untitled)");
        // cup_0, cup_2 first; cup_1 (a cached miss) last
        assert_eq!(view.entries[2].row.id, "cup_1");
    }

    #[test]
    fn test_stale_results_only_fill_cache() {
        let mut r = resolver();
        let cup_reqs = r.open("Cup", "Eat, Cook & Drink");
        let spoon_reqs = r.open("Spoon", "Eat, Cook & Drink");
        assert_eq!(spoon_reqs.len(), 50);

        let stale = ThumbResponse {
            generation: cup_reqs[0].generation,
            id: cup_reqs[0].id.clone(),
            url: Some("https://img.example/cup_0.jpg".into()),
        };
        assert!(!r.accept(stale));
        assert!(r.cache.contains("cup_0"));
        let view = r.view().unwrap();
        assert_eq!(view.title, "Spoon");
        assert!(view.entries.iter().all(|e| e.thumbnail.is_none()));
        assert!(!view.is_settled());
    }

    #[test]
    fn test_close_with_lookups_in_flight() {
        let mut r = resolver();
        let reqs = r.open("Cup", "Eat, Cook & Drink");
        r.close();
        let mut lookup = Counting::default();
        r.resolve_with(&mut lookup, reqs);
        assert!(r.view().is_none());
        assert_eq!(r.cache.len(), 3);
    }

    #[test]
    fn test_reopen_before_response_does_not_duplicate() {
        let mut r = resolver();
        let first = r.open("Cup", "Eat, Cook & Drink");
        r.close();
        let second = r.open("Cup", "Eat, Cook & Drink");
        assert!(second.is_empty());
        let mut lookup = Counting::default();
        r.resolve_with(&mut lookup, first);
        assert_eq!(lookup.calls.len(), 3);
        let view = r.view().unwrap();
        assert!(view.is_settled());
        assert_eq!(view.entries[0].row.id, "cup_0");
        assert!(view.entries[0].thumbnail.is_some());
    }

    #[test]
    fn test_empty_view() {
        let mut r = resolver();
        assert!(r.open("Teapot", "Eat, Cook & Drink").is_empty());
        let view = r.view().unwrap();
        assert_eq!(view.subtitle(), "0 objects");
        assert!(view.is_settled());
    }

    #[test]
    fn test_unit_line() {
        let cfg = TreemapConfig::default();
        let mut entry = DetailEntry {
            row: DetailRow {
                unit_code: " NMAH ".into(),
                ..DetailRow::default()
            },
            thumbnail: None,
        };
        assert_eq!(entry.unit_line(&cfg), "National Museum of American History (NMAH)");
        entry.row.unit_code = "XYZ".into();
        assert_eq!(entry.unit_line(&cfg), "XYZ");
        entry.row.unit_code.clear();
        assert_eq!(entry.unit_line(&cfg), "");
    }
}
