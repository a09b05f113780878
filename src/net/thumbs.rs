//! Thumbnail lookups against the open-access content API.
//!
//! Lookups run one at a time on a single background thread. Requests are
//! served in the order they were submitted, and the UI thread polls for
//! results each frame.

use std::sync::mpsc;

use serde_json::Value;
use url::Url;

use crate::config::ThumbnailConfig;
use crate::error::{DataError, Result};

use super::fetch::{client, fetch_url, parse_url};

/// Resolves a record id to a primary image URL.
pub trait ThumbnailLookup: Send {
    /// `Ok(None)` when the record has no image or the service said no.
    fn lookup(&mut self, id: &str) -> Result<Option<String>>;
}

/// JSON path of the primary media URL in a content response.
const MEDIA_POINTER: &str = "/response/content/descriptiveNonRepeating/online_media/media/0/content";

pub fn primary_image_url(doc: &Value) -> Option<String> {
    doc.pointer(MEDIA_POINTER)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Lookup over HTTP. The API key is read from the environment.
///
/// Requests get no timeout beyond the client default and are never retried.
pub struct OpenAccessLookup {
    client: reqwest::blocking::Client,
    base_url: Url,
    api_key: String,
}

impl OpenAccessLookup {
    pub fn from_config(config: &ThumbnailConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).unwrap_or_default();
        if api_key.is_empty() {
            log::warn!(
                "[Thumbs] {} is not set; lookups will likely be refused",
                config.api_key_env
            );
        }
        Ok(Self {
            client: client(None)?,
            base_url: parse_url(&config.base_url)?,
            api_key,
        })
    }

    /// The id becomes one escaped path segment under the base.
    fn url_for(&self, id: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| DataError::InvalidUrl {
                url: self.base_url.to_string(),
                reason: "base cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .push(id);
        url.query_pairs_mut().append_pair("api_key", &self.api_key);
        Ok(url)
    }
}

impl ThumbnailLookup for OpenAccessLookup {
    fn lookup(&mut self, id: &str) -> Result<Option<String>> {
        let url = self.url_for(id)?;
        let result = fetch_url(&self.client, &url)?;
        if !result.is_success() {
            log::debug!("[Thumbs] {} → HTTP {}", id, result.status);
            return Ok(None);
        }
        Ok(primary_image_url(&result.json()?))
    }
}

/// Lookup that never finds anything. Used with `--offline`.
pub struct OfflineLookup;

impl ThumbnailLookup for OfflineLookup {
    fn lookup(&mut self, _id: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Run a lookup, collapsing errors into "no thumbnail".
pub fn lookup_or_missing(lookup: &mut dyn ThumbnailLookup, id: &str) -> Option<String> {
    match lookup.lookup(id) {
        Ok(url) => url,
        Err(e) => {
            log::warn!("[Thumbs] lookup failed for {}: {}", id, e);
            None
        }
    }
}

/// One lookup for one open detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbRequest {
    pub generation: u64,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbResponse {
    pub generation: u64,
    pub id: String,
    pub url: Option<String>,
}

/// Background worker serving [`ThumbRequest`]s sequentially.
pub struct ThumbnailWorker {
    jobs: mpsc::Sender<ThumbRequest>,
    results: mpsc::Receiver<ThumbResponse>,
}

impl ThumbnailWorker {
    pub fn spawn(mut lookup: Box<dyn ThumbnailLookup>) -> Self {
        let (job_tx, job_rx) = mpsc::channel::<ThumbRequest>();
        let (res_tx, res_rx) = mpsc::channel();

        std::thread::spawn(move || {
            for req in job_rx {
                let url = lookup_or_missing(lookup.as_mut(), &req.id);
                let resp = ThumbResponse {
                    generation: req.generation,
                    id: req.id,
                    url,
                };
                if res_tx.send(resp).is_err() {
                    break;
                }
            }
            log::debug!("[Thumbs] worker stopped");
        });

        Self {
            jobs: job_tx,
            results: res_rx,
        }
    }

    pub fn submit(&self, requests: impl IntoIterator<Item = ThumbRequest>) {
        for req in requests {
            if self.jobs.send(req).is_err() {
                log::warn!("[Thumbs] worker is gone; dropping request");
                return;
            }
        }
    }

    /// Drain finished lookups. Call every frame.
    pub fn poll(&self) -> Vec<ThumbResponse> {
        self.results.try_iter().collect()
    }
}
