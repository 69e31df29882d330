//! Merging scraped documentation into the OpenAPI document.

use serde_json::{Map, json};
use serde_yaml::{Mapping, Value};
use tracing::{debug, info, instrument, warn};
use url::Url;

use docspec_crawler::PageFetcher;
use docspec_extract::{
    CompiledRules, FieldDescriptor, FieldSet, PageExtraction, extract_page, schema_from_example,
};
use docspec_shared::{
    DocSpecError, Outcome, Result, SkipReason, SkipTally, is_http_method, key_text,
};

/// Summary of an enrichment run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrichReport {
    /// Paths in the document.
    pub paths: usize,
    /// Operations that received parameters, a request body or a response.
    pub operations_updated: usize,
    /// Paths whose documentation page could not be used.
    pub skipped: usize,
    pub skip_reasons: SkipTally,
}

/// Fetches one documentation page per path and merges what it finds.
pub struct Enricher {
    fetcher: PageFetcher,
    rules: CompiledRules,
    doc_root: String,
}

impl Enricher {
    pub fn new(fetcher: PageFetcher, rules: CompiledRules, doc_root: impl Into<String>) -> Self {
        Self {
            fetcher,
            rules,
            doc_root: doc_root.into(),
        }
    }

    /// Documentation URL of a path: `doc_root` followed by the path verbatim.
    pub fn doc_url(&self, path: &str) -> std::result::Result<Url, url::ParseError> {
        Url::parse(&format!("{}{path}", self.doc_root))
    }

    /// Fetch and extract the documentation page of one path.
    pub async fn extract_path(&self, path: &str) -> Outcome<PageExtraction> {
        let url = match self.doc_url(path) {
            Ok(url) => url,
            Err(e) => return Outcome::Skipped(SkipReason::Request(format!("invalid URL: {e}"))),
        };

        match self.fetcher.fetch(&url).await {
            Outcome::Done(html) => Outcome::Done(extract_page(&html, &self.rules)),
            Outcome::Skipped(reason) => Outcome::Skipped(reason),
        }
    }

    /// Enrich every operation of `spec` in place.
    ///
    /// `on_path` is called before each fetch with the path, its 1-based
    /// position, and the total number of paths.
    #[instrument(skip_all, fields(doc_root = %self.doc_root))]
    pub async fn enrich(
        &self,
        spec: &mut Value,
        mut on_path: impl FnMut(&str, usize, usize),
    ) -> Result<EnrichReport> {
        let mut report = EnrichReport::default();

        let Some(paths) = spec.get_mut("paths").and_then(Value::as_mapping_mut) else {
            warn!("document has no paths");
            return Ok(report);
        };
        report.paths = paths.len();

        for (i, (path_key, item)) in paths.iter_mut().enumerate() {
            let Some(path) = key_text(path_key) else {
                continue;
            };
            on_path(&path, i + 1, report.paths);

            let Some(item) = item.as_mapping_mut() else {
                debug!(%path, "path item is not a mapping");
                continue;
            };

            let page = match self.extract_path(&path).await {
                Outcome::Done(page) => page,
                Outcome::Skipped(reason) => {
                    warn!(%path, %reason, "documentation page skipped");
                    report.skip_reasons.record(&reason);
                    continue;
                }
            };

            for (method_key, op) in item.iter_mut() {
                let Some(method) = method_key.as_str().filter(|m| is_http_method(m)) else {
                    continue;
                };
                if apply_extraction(op, method, &page)? {
                    report.operations_updated += 1;
                }
            }
        }

        report.skipped = report.skip_reasons.total();

        info!(
            paths = report.paths,
            operations_updated = report.operations_updated,
            skipped = report.skipped,
            "enrichment completed"
        );

        Ok(report)
    }
}

/// Merge one page's extraction into one operation.
///
/// Returns `false` and leaves the operation untouched when the page has
/// neither fields nor a response example.
pub fn apply_extraction(op: &mut Value, method: &str, page: &PageExtraction) -> Result<bool> {
    if page.is_empty() {
        return Ok(false);
    }

    if op.is_null() {
        *op = Value::Mapping(Mapping::new());
    }
    let Some(op) = op.as_mapping_mut() else {
        debug!(method, "operation is not a mapping");
        return Ok(false);
    };

    if !page.fields.is_empty() {
        if method.eq_ignore_ascii_case("get") || method.eq_ignore_ascii_case("delete") {
            let parameters: Vec<serde_json::Value> =
                page.fields.iter().map(query_parameter).collect();
            op.insert("parameters".into(), to_yaml(&parameters)?);
        } else {
            op.insert(
                "requestBody".into(),
                to_yaml(&request_body(&page.fields, page.request_example.as_ref()))?,
            );
        }
    }

    if let Some(example) = &page.response_example {
        let response = json!({
            "description": "",
            "content": {
                "application/json": {
                    "example": example,
                    "schema": schema_from_example(example),
                }
            }
        });
        set_ok_response(op, to_yaml(&response)?);
    }

    Ok(true)
}

/// Query parameter for a GET/DELETE field.
fn query_parameter(field: &FieldDescriptor) -> serde_json::Value {
    let mut param = Map::new();
    param.insert("name".into(), field.name.clone().into());
    param.insert("in".into(), "query".into());
    param.insert("schema".into(), json!({ "type": field.field_type.as_str() }));
    if let Some(description) = &field.description {
        param.insert("description".into(), description.clone().into());
    }
    if let Some(example) = field.example.as_ref().filter(|v| !v.is_null()) {
        param.insert("example".into(), example.clone());
    }
    if field.required {
        param.insert("required".into(), true.into());
    }
    serde_json::Value::Object(param)
}

fn request_body(fields: &FieldSet, example: Option<&serde_json::Value>) -> serde_json::Value {
    let mut media = Map::new();
    media.insert("schema".into(), fields.to_object_schema());
    if let Some(example) = example.filter(|v| is_meaningful(v)) {
        media.insert("example".into(), example.clone());
    }
    json!({
        "required": true,
        "content": { "application/json": media }
    })
}

/// False for `null`, `false`, zero, and empty strings, arrays and objects.
fn is_meaningful(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(items) => !items.is_empty(),
        serde_json::Value::Object(map) => !map.is_empty(),
    }
}

/// Overwrite every `200` response (string or integer key), or add one.
fn set_ok_response(op: &mut Mapping, response: Value) {
    let responses = op
        .entry("responses".into())
        .or_insert_with(|| Value::Mapping(Mapping::new()));
    if !responses.is_mapping() {
        *responses = Value::Mapping(Mapping::new());
    }
    let Some(responses) = responses.as_mapping_mut() else {
        return;
    };

    let mut replaced = false;
    for (code, existing) in responses.iter_mut() {
        if is_status(code, 200) {
            *existing = response.clone();
            replaced = true;
        }
    }
    if !replaced {
        responses.insert("200".into(), response);
    }
}

fn is_status(key: &Value, code: u64) -> bool {
    match key {
        Value::Number(n) => n.as_u64() == Some(code),
        Value::String(s) => s.trim().parse::<u64>().ok() == Some(code),
        _ => false,
    }
}

fn to_yaml<T: serde::Serialize>(value: &T) -> Result<Value> {
    serde_yaml::to_value(value)
        .map_err(|e| DocSpecError::Serialization(format!("YAML conversion failed: {e}")))
}
