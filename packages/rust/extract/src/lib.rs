//! HTML-to-schema extraction for documentation pages.
//!
//! This crate provides:
//! - [`infer`]: type inference from table labels and from example values
//! - [`table`]: the request field table reader
//! - [`example`]: JSON example block reader
//! - [`extract_page`]: both of the above plus the example merge, in one call
//!
//! Everything is driven by a [`CompiledRules`] built from the configured
//! [`ExtractionRules`].

mod dom;
pub mod example;
pub mod fields;
pub mod infer;
pub mod table;

use scraper::{Html, Selector};
use serde_json::Value;
use tracing::{debug, instrument};

use docspec_shared::{DocSpecError, ExtractionRules, Result};

pub use example::extract_example;
pub use fields::{FieldDescriptor, FieldSet};
pub use infer::{SchemaType, TypeVocabulary, schema_from_example, type_of_value};
pub use table::extract_request_fields;

// ---------------------------------------------------------------------------
// Compiled rules
// ---------------------------------------------------------------------------

/// [`ExtractionRules`] with selectors parsed and the vocabulary compiled.
#[derive(Debug, Clone)]
pub struct CompiledRules {
    pub(crate) raw: ExtractionRules,
    pub(crate) heading: Selector,
    pub(crate) table: Selector,
    pub(crate) row: Selector,
    pub(crate) cell: Selector,
    pub(crate) code: Selector,
    pub(crate) vocabulary: TypeVocabulary,
}

impl CompiledRules {
    /// Validate and compile a rule table.
    pub fn compile(rules: &ExtractionRules) -> Result<Self> {
        let marker_lists = [
            ("request_fields_markers", &rules.request_fields_markers),
            ("request_example_markers", &rules.request_example_markers),
            ("response_example_markers", &rules.response_example_markers),
            ("required_markers", &rules.required_markers),
        ];
        for (key, markers) in marker_lists {
            if markers.iter().all(|m| m.trim().is_empty()) {
                return Err(DocSpecError::config(format!(
                    "rules.{key} needs at least one non-empty marker"
                )));
            }
        }

        Ok(Self {
            raw: rules.clone(),
            heading: selector("heading_selector", &rules.heading_selector)?,
            table: selector("table_selector", &rules.table_selector)?,
            row: selector("row_selector", &rules.row_selector)?,
            cell: selector("cell_selector", &rules.cell_selector)?,
            code: selector("code_selector", &rules.code_selector)?,
            vocabulary: TypeVocabulary::compile(&rules.type_vocabulary)?,
        })
    }

    /// The rule table this was compiled from.
    pub fn rules(&self) -> &ExtractionRules {
        &self.raw
    }
}

fn selector(key: &str, css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| DocSpecError::config(format!("rules.{key} `{css}` is not a valid selector: {e}")))
}

// ---------------------------------------------------------------------------
// Page extraction
// ---------------------------------------------------------------------------

/// Everything read from one documentation page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageExtraction {
    /// Request fields, with the request example already merged in.
    pub fields: FieldSet,
    /// Parsed example request, if the page has a valid one.
    pub request_example: Option<Value>,
    /// Parsed example response, if the page has a valid one.
    pub response_example: Option<Value>,
}

impl PageExtraction {
    /// True when the page contributes nothing to the spec.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.response_example.is_none()
    }
}

/// Read fields and examples from a documentation page.
#[instrument(skip_all, fields(rules_version = rules.raw.version))]
pub fn extract_page(html: &str, rules: &CompiledRules) -> PageExtraction {
    let doc = Html::parse_document(html);

    let mut fields = extract_request_fields(&doc, rules);
    let request_example = extract_example(&doc, rules, &rules.raw.request_example_markers);
    let response_example = extract_example(&doc, rules, &rules.raw.response_example_markers);

    if let Some(example) = &request_example {
        fields.merge_example(example);
    }

    debug!(
        fields = fields.len(),
        request_example = request_example.is_some(),
        response_example = response_example.is_some(),
        "page extracted"
    );

    PageExtraction {
        fields,
        request_example,
        response_example,
    }
}
