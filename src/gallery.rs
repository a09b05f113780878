//! Object grid: per-category image tiles with optional record tooltips.

use std::collections::HashMap;

use serde_json::Value;

use crate::config::{CategoryConfig, TreemapConfig};
use crate::detail::rows::DetailRow;
use crate::keys::{id_from_path, join_key};
use crate::source::{load_manifest, load_metadata_rows, DataSource};

/// Titles too generic to be worth showing.
const LOW_VALUE_TITLES: &[&str] = &["sampler", "needlework sampler", "sampler (needlework)"];

/// Descriptive fields of one object record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ObjectRecord {
    pub title: String,
    pub date: String,
    pub url: String,
}

/// First non-blank field among `keys`, stringified.
fn pick(row: &Value, keys: &[&str]) -> String {
    for k in keys {
        let v = match row.get(*k) {
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => String::new(),
        };
        if !v.is_empty() {
            return v;
        }
    }
    String::new()
}

impl ObjectRecord {
    pub fn from_row(row: &Value) -> Self {
        Self {
            title: pick(row, &["title"]),
            date: pick(row, &["date"]),
            url: pick(row, &["EDANurl", "edanurl", "URL", "Url"]),
        }
    }
}

pub fn is_low_value_title(title: &str) -> bool {
    let t = title.trim().to_lowercase();
    LOW_VALUE_TITLES.contains(&t.as_str())
}

/// Records keyed by the join key of their `EDANurl`. First row wins.
#[derive(Debug, Clone, Default)]
pub struct MetadataIndex {
    records: HashMap<String, ObjectRecord>,
}

impl MetadataIndex {
    pub fn from_rows(rows: &[Value]) -> Self {
        let mut records = HashMap::new();
        for row in rows {
            let raw = match row.get("EDANurl") {
                Some(Value::String(s)) => s.as_str(),
                _ => continue,
            };
            if let Some(key) = join_key(raw) {
                records.entry(key).or_insert_with(|| ObjectRecord::from_row(row));
            }
        }
        Self { records }
    }

    pub fn get(&self, id: &str) -> Option<&ObjectRecord> {
        self.records.get(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TooltipLine {
    /// Record title, linked when the record has a URL.
    Title { text: String, link: Option<String> },
    Text(String),
    Link { text: String, url: String },
}

/// Tooltip body for a tile; `None` when there is nothing worth showing.
pub fn tile_tooltip(record: Option<&ObjectRecord>) -> Option<Vec<TooltipLine>> {
    let record = record?;
    let link = (!record.url.is_empty()).then(|| record.url.clone());
    let mut lines = Vec::new();

    if !record.title.is_empty() && !is_low_value_title(&record.title) {
        lines.push(TooltipLine::Title {
            text: record.title.clone(),
            link: link.clone(),
        });
    }
    if !record.date.is_empty() {
        lines.push(TooltipLine::Text(record.date.clone()));
    }
    if lines.is_empty() {
        lines.push(TooltipLine::Link {
            text: "View object record".to_string(),
            url: link?,
        });
    }
    Some(lines)
}

/// Tooltip body built from a detail row, for tiles the category metadata
/// does not cover.
pub fn detail_tooltip(row: &DetailRow, config: &TreemapConfig) -> Option<Vec<TooltipLine>> {
    let link = (!row.collections_url.is_empty()).then(|| row.collections_url.clone());
    let mut lines = Vec::new();
    let title = row.title.trim();
    if !title.is_empty() && !is_low_value_title(title) {
        lines.push(TooltipLine::Title {
            text: title.to_string(),
            link: link.clone(),
        });
    }
    let unit = row.unit_line(config);
    if !unit.is_empty() {
        lines.push(TooltipLine::Text(unit));
    }
    if lines.is_empty() {
        lines.push(TooltipLine::Link {
            text: "View object record".to_string(),
            url: link?,
        });
    }
    Some(lines)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridTile {
    /// File name without extension; joins against metadata.
    pub id: String,
    /// Path as listed by the manifest.
    pub path: String,
    pub alt: String,
}

/// Tiles for the selected category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridView {
    pub category: usize,
    pub key: String,
    pub tiles: Vec<GridTile>,
}

pub fn build_grid(category: usize, config: &CategoryConfig, paths: &[String], cap: usize) -> GridView {
    GridView {
        category,
        key: config.key.clone(),
        tiles: paths
            .iter()
            .take(cap)
            .enumerate()
            .map(|(i, p)| GridTile {
                id: id_from_path(p),
                path: p.clone(),
                alt: format!("{} {}", config.label, i + 1),
            })
            .collect(),
    }
}

/// Manifest and metadata caches, keyed by category key.
///
/// A failed manifest is cached as empty; a failed metadata load is not
/// cached, so the next selection tries again.
#[derive(Debug, Default)]
pub struct CategoryLibrary {
    manifests: HashMap<String, Vec<String>>,
    metadata: HashMap<String, MetadataIndex>,
}

impl CategoryLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load (or reuse) category `idx` and build its grid.
    pub fn load(
        &mut self,
        source: &dyn DataSource,
        categories: &[CategoryConfig],
        idx: usize,
        cap: usize,
    ) -> Option<GridView> {
        let cat = categories.get(idx)?;

        let paths = self
            .manifests
            .entry(cat.key.clone())
            .or_insert_with(|| {
                let paths = load_manifest(source, cat);
                log::info!("[Grid] {}: {} images", cat.key, paths.len());
                paths
            });
        let view = build_grid(idx, cat, paths, cap);

        if cat.metadata.is_some() && !self.metadata.contains_key(&cat.key) {
            if let Some(rows) = load_metadata_rows(source, cat) {
                let index = MetadataIndex::from_rows(&rows);
                log::info!("[Grid] {}: {} metadata records", cat.key, index.len());
                self.metadata.insert(cat.key.clone(), index);
            }
        }
        Some(view)
    }

    pub fn metadata(&self, key: &str) -> Option<&MetadataIndex> {
        self.metadata.get(key)
    }

    /// Tooltip for a tile of the given grid. `None` without metadata.
    pub fn tooltip(&self, view: &GridView, tile: &GridTile) -> Option<Vec<TooltipLine>> {
        let index = self.metadata.get(&view.key)?;
        tile_tooltip(index.get(&tile.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::FileSource;
    use std::fs;

    fn record(title: &str, date: &str, url: &str) -> ObjectRecord {
        ObjectRecord {
            title: title.into(),
            date: date.into(),
            url: url.into(),
        }
    }

    #[test]
    fn test_tooltip_prefers_title_and_date() {
        let lines = tile_tooltip(Some(&record("Alphabet sampler", "1820", "https://x/1"))).unwrap();
        assert_eq!(
            lines,
            vec![
                TooltipLine::Title {
                    text: "Alphabet sampler".into(),
                    link: Some("https://x/1".into())
                },
                TooltipLine::Text("1820".into()),
            ]
        );
    }

    #[test]
    fn test_low_value_title_hidden() {
        let lines = tile_tooltip(Some(&record(" Needlework Sampler ", "1790", ""))).unwrap();
        assert_eq!(lines, vec![TooltipLine::Text("1790".into())]);
        let lines = tile_tooltip(Some(&record("sampler", "", "https://x/2"))).unwrap();
        assert_eq!(
            lines,
            vec![TooltipLine::Link {
                text: "View object record".into(),
                url: "https://x/2".into()
            }]
        );
        assert!(tile_tooltip(Some(&record("", "", ""))).is_none());
        assert!(tile_tooltip(None).is_none());
    }

    #[test]
    fn test_detail_tooltip_names_the_museum() {
        let config = TreemapConfig::default();
        let row = DetailRow {
            id: "edanmdm:nmnh_3".into(),
            title: "Medicine spoon".into(),
            unit_code: "NMNHANTHRO".into(),
            collections_url: "https://x/3".into(),
            ..DetailRow::default()
        };
        assert_eq!(
            detail_tooltip(&row, &config).unwrap(),
            vec![
                TooltipLine::Title {
                    text: "Medicine spoon".into(),
                    link: Some("https://x/3".into())
                },
                TooltipLine::Text("NMNH - Anthropology Dept. (NMNHANTHRO)".into()),
            ]
        );

        let bare = DetailRow {
            title: "Sampler".into(),
            ..DetailRow::default()
        };
        assert!(detail_tooltip(&bare, &config).is_none());
    }

    #[test]
    fn test_metadata_index_uses_join_key() {
        let rows = vec![
            serde_json::json!({ "EDANurl": "http://n2t.net/ark:/65665/edanmdm%3Anmah_1", "title": "A", "date": 1820 }),
            serde_json::json!({ "EDANurl": "edanmdm:nmah_1", "title": "duplicate" }),
            serde_json::json!({ "title": "no url" }),
        ];
        let index = MetadataIndex::from_rows(&rows);
        assert_eq!(index.len(), 1);
        let rec = index.get("edanmdm:nmah_1").unwrap();
        assert_eq!(rec.title, "A");
        assert_eq!(rec.date, "1820");
    }

    #[test]
    fn test_grid_caps_and_alt_text() {
        let cat = CategoryConfig {
            key: "clocks".into(),
            label: "Clocks".into(),
            path: "assets/clocks".into(),
            manifest: "m.json".into(),
            metadata: None,
        };
        let paths: Vec<String> = (0..30).map(|i| format!("assets/clocks/c{}.jpg", i)).collect();
        let view = build_grid(3, &cat, &paths, 21);
        assert_eq!(view.tiles.len(), 21);
        assert_eq!(view.tiles[0].alt, "Clocks 1");
        assert_eq!(view.tiles[20].alt, "Clocks 21");
        assert_eq!(view.tiles[4].id, "c4");
    }

    #[test]
    fn test_library_loads_and_caches() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("assets/samplers")).unwrap();
        fs::write(
            dir.path().join("assets/samplers/manifest.json"),
            r#"["edanmdm:nmah_1.jpg", "edanmdm:nmah_2.jpg"]"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("assets/samplers.json"),
            r#"[{"EDANurl": "edanmdm:nmah_1", "title": "Band sampler", "date": "1800"}]"#,
        )
        .unwrap();
        let src = FileSource::new(dir.path());
        let cats = crate::config::StoryConfig::default().categories;
        let mut lib = CategoryLibrary::new();

        let view = lib.load(&src, &cats, 0, 21).unwrap();
        assert_eq!(view.tiles.len(), 2);
        let tip = lib.tooltip(&view, &view.tiles[0]).unwrap();
        assert_eq!(tip.len(), 2);
        assert!(lib.tooltip(&view, &view.tiles[1]).is_none());

        // manifest is cached: removing the file changes nothing
        fs::remove_file(dir.path().join("assets/samplers/manifest.json")).unwrap();
        assert_eq!(lib.load(&src, &cats, 0, 21).unwrap().tiles.len(), 2);

        // a category without files yields an empty grid, without metadata
        let view = lib.load(&src, &cats, 1, 21).unwrap();
        assert!(view.tiles.is_empty());
        assert!(lib.metadata("teapots").is_none());
        assert!(lib.load(&src, &cats, 9, 21).is_none());
    }
}
