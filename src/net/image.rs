//! Background image loader.
//!
//! Story images come from the local asset directory, thumbnails from remote
//! URLs. Both are decoded into RGBA buffers ready for egui texture creation
//! on a single worker thread, so at most one image is in flight.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use crate::error::{DataError, Result};

use super::fetch::{client, fetch_url, parse_url};

/// Longest edge kept after decoding.
const MAX_EDGE: u32 = 1200;

/// Decoded image data (RGBA).
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Manages background fetching and decoding.
pub struct ImageLoader {
    base_dir: PathBuf,
    jobs: Option<mpsc::Sender<String>>,
    results: Option<mpsc::Receiver<(String, Option<ImageData>)>>,
    pending: HashSet<String>,
    loaded: HashMap<String, ImageData>,
    failed: HashSet<String>,
}

impl ImageLoader {
    /// Relative sources resolve against `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            jobs: None,
            results: None,
            pending: HashSet::new(),
            loaded: HashMap::new(),
            failed: HashSet::new(),
        }
    }

    fn ensure_worker(&mut self) {
        if self.jobs.is_some() {
            return;
        }
        let (job_tx, job_rx) = mpsc::channel::<String>();
        let (res_tx, res_rx) = mpsc::channel();
        let base = self.base_dir.clone();

        std::thread::spawn(move || {
            let http = client(Some(Duration::from_secs(10))).ok();
            for source in job_rx {
                let data = match load_and_decode(&base, http.as_ref(), &source) {
                    Ok(d) => Some(d),
                    Err(e) => {
                        log::warn!("[Image] {}: {}", source, e);
                        None
                    }
                };
                if res_tx.send((source, data)).is_err() {
                    break;
                }
            }
        });

        self.jobs = Some(job_tx);
        self.results = Some(res_rx);
    }

    /// Request an image to be loaded in the background.
    pub fn request(&mut self, source: &str) {
        if source.is_empty()
            || self.loaded.contains_key(source)
            || self.pending.contains(source)
            || self.failed.contains(source)
        {
            return;
        }
        self.ensure_worker();
        let sent = self
            .jobs
            .as_ref()
            .map(|tx| tx.send(source.to_string()).is_ok())
            .unwrap_or(false);
        if sent {
            self.pending.insert(source.to_string());
        } else {
            self.failed.insert(source.to_string());
        }
    }

    /// Poll for completed loads. Call every frame. Returns the newly loaded sources.
    pub fn poll(&mut self) -> Vec<String> {
        let Some(rx) = &self.results else {
            return Vec::new();
        };
        let done: Vec<_> = rx.try_iter().collect();
        let mut landed = Vec::new();
        for (source, result) in done {
            self.pending.remove(&source);
            match result {
                Some(data) => {
                    self.loaded.insert(source.clone(), data);
                    landed.push(source);
                }
                None => {
                    self.failed.insert(source);
                }
            }
        }
        landed
    }

    pub fn get(&self, source: &str) -> Option<&ImageData> {
        self.loaded.get(source)
    }

    pub fn has_failed(&self, source: &str) -> bool {
        self.failed.contains(source)
    }

    /// Number of images still being loaded.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

fn load_and_decode(
    base: &Path,
    http: Option<&reqwest::blocking::Client>,
    source: &str,
) -> Result<ImageData> {
    let bytes = if is_remote(source) {
        let http = http.ok_or_else(|| DataError::shape("no HTTP client"))?;
        let result = fetch_url(http, &parse_url(source)?)?;
        if !result.is_success() {
            return Err(DataError::Status {
                url: result.url,
                status: result.status,
            });
        }
        result.body
    } else {
        std::fs::read(base.join(source))?
    };
    decode(&bytes)
}

fn decode(bytes: &[u8]) -> Result<ImageData> {
    let img = image::load_from_memory(bytes).map_err(|e| DataError::shape(format!("image: {}", e)))?;
    let rgba = img.to_rgba8();
    let (w, h) = rgba.dimensions();

    let edge = w.max(h);
    let (w, h, pixels) = if edge > MAX_EDGE {
        let ratio = MAX_EDGE as f32 / edge as f32;
        let nw = ((w as f32 * ratio) as u32).max(1);
        let nh = ((h as f32 * ratio) as u32).max(1);
        let resized = image::imageops::resize(&rgba, nw, nh, image::imageops::FilterType::Triangle);
        let (rw, rh) = resized.dimensions();
        (rw, rh, resized.into_raw())
    } else {
        (w, h, rgba.into_raw())
    };

    Ok(ImageData {
        width: w,
        height: h,
        rgba: pixels,
    })
}
