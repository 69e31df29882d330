//! Shared types, error model, and configuration for docspec.
//!
//! This crate is the foundation depended on by all other docspec crates.
//! It provides:
//! - [`DocSpecError`]: the unified error type
//! - Digest artifact types ([`EndpointDigest`], [`DigestField`], [`ApiIndex`])
//! - Per-unit run outcomes ([`Outcome`], [`SkipReason`], [`SkipTally`])
//! - Configuration ([`AppConfig`], config loading) and the [`ExtractionRules`] table

pub mod config;
pub mod error;
pub mod rules;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CONFIG_FILE_NAME, CrawlConfig, DigestConfig, EnrichConfig, HttpConfig,
    default_config_path, init_config, load_config, load_config_from,
};
pub use error::{DocSpecError, Result};
pub use rules::{ColumnMap, ExtractionRules, RULES_VERSION, TypeLabel};
pub use types::{
    ApiIndex, DigestField, EndpointDigest, HTTP_METHODS, Outcome, SkipReason, SkipTally,
    is_http_method, key_text,
};
