//! Core pipelines for docspec.
//!
//! This crate ties together page fetching, extraction, spec merging, digest
//! generation, and raw crawling into the `enrich`, `digest` and `crawl` runs.

pub mod enricher;
pub mod pipeline;
pub mod spec;

pub use enricher::{EnrichReport, Enricher, apply_extraction};
pub use pipeline::{
    CrawlReport, ProgressReporter, SilentProgress, run_crawl, run_digest, run_enrich,
};
pub use spec::{load_spec, save_spec};
