pub mod cache;
pub mod fetch;
pub mod image;
pub mod thumbs;
