//! Page fetching and raw documentation crawling.
//!
//! This crate provides:
//! - [`PageFetcher`]: one-page-at-a-time HTTP client with skip outcomes
//! - [`Crawler`]: navigation-menu crawl producing one consolidated HTML file
//! - [`strip_attributes`]: attribute-free serialization of a content subtree

pub mod engine;
pub mod fetch;
pub mod sanitize;

pub use engine::{CrawlResult, Crawler};
pub use fetch::{FetchOptions, PageFetcher};
pub use sanitize::strip_attributes;
