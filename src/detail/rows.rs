//! Flat per-object detail records, grouped by object type.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::config::TreemapConfig;
use crate::keys::{join_key, normalize_name};

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct DetailRow {
    /// Record identifier; also the thumbnail lookup key.
    #[serde(rename = "EDANurl")]
    pub id: String,
    pub action_family: String,
    pub title: String,
    #[serde(rename = "unitCode")]
    pub unit_code: String,
    #[serde(rename = "collectionsURL")]
    pub collections_url: String,
}

impl DetailRow {
    /// `"Museum Name (CODE)"`, the bare code when unmapped, empty without one.
    pub fn unit_line(&self, config: &TreemapConfig) -> String {
        let unit = self.unit_code.trim();
        if unit.is_empty() {
            return String::new();
        }
        match config.unit_display_name(unit) {
            "" => unit.to_string(),
            full => format!("{} ({})", full, unit),
        }
    }
}

/// Object type → rows, plus a join-key index across all rows.
#[derive(Debug, Clone, Default)]
pub struct DetailDataset {
    by_type: HashMap<String, Vec<DetailRow>>,
    by_normalized_type: HashMap<String, String>,
    by_key: HashMap<String, (String, usize)>,
}

impl DetailDataset {
    /// Lenient parse of `{ objectType: [row, …] }`. Rows that are not objects
    /// are skipped; a non-object document yields an empty dataset.
    pub fn from_value(v: &Value) -> Self {
        let mut ds = DetailDataset::default();
        let Some(map) = v.as_object() else {
            log::warn!("[Details] dataset is not an object; ignoring");
            return ds;
        };
        for (object_type, rows) in map {
            let rows: Vec<DetailRow> = rows
                .as_array()
                .map(|items| {
                    items
                        .iter()
                        .filter(|r| r.is_object())
                        .filter_map(|r| serde_json::from_value(r.clone()).ok())
                        .collect()
                })
                .unwrap_or_default();
            ds.insert(object_type.clone(), rows);
        }
log::info!("[Details] {} object types, {} keyed rows", ds.by_type.len(), ds.by_key.len());
        ds
    }

    pub fn insert(&mut self, object_type: String, rows: Vec<DetailRow>) {
        for (i, row) in rows.iter().enumerate() {
            if let Some(key) = join_key(&row.id) {
                self.by_key.entry(key).or_insert_with(|| (object_type.clone(), i));
            }
        }
        self.by_normalized_type
            .entry(normalize_name(&object_type))
            .or_insert_with(|| object_type.clone());
        self.by_type.insert(object_type, rows);
    }

    /// Rows for an object type, by exact name first, then by normalized name.
    pub fn rows_of(&self, object_type: &str) -> &[DetailRow] {
        self.by_type
            .get(object_type)
            .or_else(|| {
                self.by_normalized_type
                    .get(&normalize_name(object_type))
                    .and_then(|k| self.by_type.get(k))
            })
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Rows of `object_type` belonging to `family`, in source order.
    pub fn filter(&self, object_type: &str, family: &str) -> Vec<DetailRow> {
        let family = normalize_name(family);
        self.rows_of(object_type)
            .iter()
            .filter(|r| normalize_name(&r.action_family) == family)
            .cloned()
            .collect()
    }

    /// Row whose id shares this join key.
    pub fn find_by_key(&self, key: &str) -> Option<&DetailRow> {
        let (object_type, i) = self.by_key.get(key)?;
        self.by_type.get(object_type)?.get(*i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> DetailDataset {
        DetailDataset::from_value(&serde_json::json!({
            "Spoon": [
                { "EDANurl": "edanmdm:nmah_1", "action_family": "Eat, Cook & Drink", "title": "Silver spoon", "unitCode": "NMAH" },
                { "EDANurl": "edanmdm:nmah_2", "action_family": "eat,  cook & drink" },
                { "EDANurl": "edanmdm:nmnh_3", "action_family": "Heal & Care", "title": "Medicine spoon" },
                "junk"
            ],
            "Bell Jar": "not a list"
        }))
    }

    #[test]
    fn test_filter_by_normalized_family() {
        let ds = dataset();
        let rows = ds.filter("Spoon", "EAT, COOK & DRINK");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, "edanmdm:nmah_1");
        assert_eq!(rows[0].unit_code, "NMAH");
        assert_eq!(rows[1].title, "");
    }

    #[test]
    fn test_type_falls_back_to_normalized() {
        let ds = dataset();
        assert_eq!(ds.rows_of("  spoon ").len(), 3);
        assert!(ds.rows_of("Bell Jar").is_empty());
        assert!(ds.rows_of("Teapot").is_empty());
    }

    #[test]
    fn test_join_key_index() {
        let ds = dataset();
        assert_eq!(ds.find_by_key("edanmdm:nmnh_3").map(|r| r.title.as_str()), Some("Medicine spoon"));
        assert!(ds.find_by_key("nope").is_none());
    }

    #[test]
    fn test_non_object_document() {
        let ds = DetailDataset::from_value(&serde_json::json!([1, 2]));
        assert!(ds.rows_of("Spoon").is_empty());
    }
}
