//! Where story data comes from: a local directory or an HTTP base URL.
//!
//! Every loader here degrades instead of failing. A missing or malformed
//! file is logged and turned into an empty value so the story keeps running.

use std::path::PathBuf;
use std::time::Duration;

use serde_json::Value;
use url::Url;

use crate::config::{CategoryConfig, DataFiles, StoryConfig, TreemapConfig};
use crate::detail::DetailDataset;
use crate::error::{DataError, Result};
use crate::net::fetch::{client, fetch_json, parse_url};
use crate::treemap::Treemap;

pub trait DataSource: Send + Sync {
    /// Read and parse a JSON document at a source-relative location.
    fn read_json(&self, location: &str) -> Result<Value>;

    /// Absolute form of a location, suitable for the image loader.
    fn resolve(&self, location: &str) -> String;

    fn describe(&self) -> String;
}

/// Files under a root directory.
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl DataSource for FileSource {
    fn read_json(&self, location: &str) -> Result<Value> {
        let text = std::fs::read_to_string(self.root.join(location))?;
        Ok(serde_json::from_str(&text)?)
    }

    fn resolve(&self, location: &str) -> String {
        self.root.join(location).to_string_lossy().into_owned()
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

/// Documents relative to a base URL.
pub struct HttpSource {
    base: Url,
    client: reqwest::blocking::Client,
}

impl HttpSource {
    pub fn new(base: &str) -> Result<Self> {
        // a trailing slash makes relative joins land under the base path
        let base = if base.ends_with('/') {
            base.to_string()
        } else {
            format!("{}/", base)
        };
        Ok(Self {
            base: parse_url(&base)?,
            client: client(Some(Duration::from_secs(15)))?,
        })
    }

    fn join(&self, location: &str) -> Result<Url> {
        self.base.join(location).map_err(|e| DataError::InvalidUrl {
            url: location.to_string(),
            reason: e.to_string(),
        })
    }
}

impl DataSource for HttpSource {
    fn read_json(&self, location: &str) -> Result<Value> {
        fetch_json(&self.client, &self.join(location)?)
    }

    fn resolve(&self, location: &str) -> String {
        self.join(location)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| location.to_string())
    }

    fn describe(&self) -> String {
        self.base.to_string()
    }
}

/// Pick a source for a `--story` argument.
pub fn open(location: &str) -> Result<Box<dyn DataSource>> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Ok(Box::new(HttpSource::new(location)?))
    } else {
        Ok(Box::new(FileSource::new(location)))
    }
}

/// Story configuration from `story.json`, or the built-in defaults.
pub fn load_story(source: &dyn DataSource) -> StoryConfig {
    let Some(doc) = read_json_or_warn(source, "story.json") else {
        return StoryConfig::default();
    };
    match StoryConfig::from_value(doc) {
        Ok(cfg) => cfg,
        Err(e) => {
            log::warn!("[Source] story.json: {}, using defaults", e);
            StoryConfig::default()
        }
    }
}

/// JSON at `location`, or `None` with a warning.
pub fn read_json_or_warn(source: &dyn DataSource, location: &str) -> Option<Value> {
    match source.read_json(location) {
        Ok(v) => Some(v),
        Err(e) => {
            log::warn!("[Source] {} ({}): {}", location, source.describe(), e);
            None
        }
    }
}

/// Image paths for a category: manifest names prefixed with the category path.
pub fn load_manifest(source: &dyn DataSource, category: &CategoryConfig) -> Vec<String> {
    let Some(doc) = read_json_or_warn(source, &category.manifest) else {
        return Vec::new();
    };
    let Some(names) = doc.as_array() else {
        log::warn!("[Source] manifest {} is not an array", category.manifest);
        return Vec::new();
    };
    let prefix = category.path.trim_end_matches('/');
    names
        .iter()
        .filter_map(Value::as_str)
        .filter(|n| !n.is_empty())
        .map(|n| {
            if prefix.is_empty() {
                n.to_string()
            } else {
                format!("{}/{}", prefix, n)
            }
        })
        .collect()
}

/// Metadata rows for a category, if it has any and they parse.
pub fn load_metadata_rows(source: &dyn DataSource, category: &CategoryConfig) -> Option<Vec<Value>> {
    let location = category.metadata.as_deref()?;
    match read_json_or_warn(source, location)? {
        Value::Array(rows) => Some(rows),
        _ => {
            log::warn!("[Source] metadata {} is not an array", location);
            None
        }
    }
}

/// Hierarchy dataset, laid out. `None` when it cannot be read at all.
pub fn load_treemap(source: &dyn DataSource, files: &DataFiles, config: &TreemapConfig) -> Option<Treemap> {
    let doc = read_json_or_warn(source, &files.treemap)?;
    Some(Treemap::from_value(&doc, config))
}

/// Detail dataset; empty when unavailable.
pub fn load_details(source: &dyn DataSource, files: &DataFiles) -> DetailDataset {
    read_json_or_warn(source, &files.details)
        .map(|doc| DetailDataset::from_value(&doc))
        .unwrap_or_default()
}
