//! Shared data model: digest artifacts and per-unit run outcomes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Digest artifacts
// ---------------------------------------------------------------------------

/// One flattened schema property as written into an endpoint digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestField {
    /// Property name.
    pub name: String,
    /// Human-readable description, empty when the schema has none.
    pub description: String,
    /// Schema type; arrays are rendered as `array[<item type>]`.
    #[serde(rename = "type")]
    pub field_type: String,
    /// Whether the property is listed as required.
    pub required: bool,
    /// Example value as compact JSON text, empty when absent.
    pub example: String,
}

/// LLM-oriented summary of one operation, written as its own file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointDigest {
    /// Request path as it appears in the spec.
    pub path: String,
    /// Upper-case HTTP method.
    pub method: String,
    /// Operation summary, empty when the spec has none.
    pub summary: String,
    /// Fields accepted by the operation.
    pub request_fields: Vec<DigestField>,
    /// Fields of the successful response.
    pub response_fields: Vec<DigestField>,
    /// Example request body as compact JSON text, empty when absent.
    pub example_request: String,
    /// Example response body as compact JSON text, empty when absent.
    pub example_response: String,
}

/// Manifest pointing at every endpoint digest (`api_info.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiIndex {
    /// First server URL of the spec, empty when none is declared.
    pub base_url: String,
    /// Authorization methods of the documented API.
    #[serde(default)]
    pub authorization: Vec<String>,
    /// `"<METHOD> <path>"` → digest file path relative to the index.
    #[serde(default)]
    pub endpoints: serde_json::Map<String, serde_json::Value>,
}

impl ApiIndex {
    /// Key used for an operation in [`ApiIndex::endpoints`].
    pub fn endpoint_key(method: &str, path: &str) -> String {
        format!("{} {path}", method.to_uppercase())
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Path-item keys that denote operations.
pub const HTTP_METHODS: &[&str] = &[
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Whether a path-item key names an operation (case-insensitive).
pub fn is_http_method(key: &str) -> bool {
    HTTP_METHODS.iter().any(|m| m.eq_ignore_ascii_case(key))
}

/// Text of a YAML mapping key. Paths are strings; status codes may be
/// written as numbers. Any other key kind is not addressable.
pub fn key_text(key: &serde_yaml::Value) -> Option<String> {
    match key {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Run outcomes
// ---------------------------------------------------------------------------

/// Result of processing one unit of work (one doc page, one crawl link).
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The unit produced a value.
    Done(T),
    /// The unit was dropped; the run continues.
    Skipped(SkipReason),
}

impl<T> Outcome<T> {
    /// The produced value, if any.
    pub fn done(self) -> Option<T> {
        match self {
            Outcome::Done(value) => Some(value),
            Outcome::Skipped(_) => None,
        }
    }
}

/// Why a unit of work was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The request could not be sent or timed out.
    Request(String),
    /// The server answered with a non-success status.
    Status(u16),
    /// The response body could not be read.
    Body(String),
    /// The page had no element matching the content selector.
    MissingContent,
}

impl SkipReason {
    /// Short stable label used for skip accounting.
    pub fn kind(&self) -> &'static str {
        match self {
            SkipReason::Request(_) => "request",
            SkipReason::Status(_) => "status",
            SkipReason::Body(_) => "body",
            SkipReason::MissingContent => "missing_content",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Request(e) => write!(f, "request failed: {e}"),
            SkipReason::Status(code) => write!(f, "HTTP {code}"),
            SkipReason::Body(e) => write!(f, "body read failed: {e}"),
            SkipReason::MissingContent => write!(f, "content container not found"),
        }
    }
}

/// Skip counts aggregated by a sequential driver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipTally {
    by_kind: BTreeMap<&'static str, usize>,
}

impl SkipTally {
    /// Count one skipped unit.
    pub fn record(&mut self, reason: &SkipReason) {
        *self.by_kind.entry(reason.kind()).or_default() += 1;
    }

    /// Total number of skipped units.
    pub fn total(&self) -> usize {
        self.by_kind.values().sum()
    }

    /// Skip counts keyed by [`SkipReason::kind`].
    pub fn by_kind(&self) -> &BTreeMap<&'static str, usize> {
        &self.by_kind
    }
}

impl std::fmt::Display for SkipTally {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .by_kind
            .iter()
            .map(|(kind, count)| format!("{kind}={count}"))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}
