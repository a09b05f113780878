pub mod config;
pub mod error;
pub mod keys;

// Scroll-driven narrative
pub mod story;
pub mod gallery;

// Zoomable treemap and its detail list
pub mod treemap;
pub mod detail;

pub mod net;
pub mod source;
pub mod tooltip;
