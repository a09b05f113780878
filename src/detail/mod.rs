//! Per-object detail list for a clicked object type.

pub mod resolver;
pub mod rows;

pub use resolver::{DetailEntry, DetailResolver, DetailView};
pub use rows::{DetailDataset, DetailRow};
