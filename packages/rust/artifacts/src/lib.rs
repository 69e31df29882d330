//! LLM-oriented endpoint digests generated from an OpenAPI document.
//!
//! Writes one JSON file per operation plus an `api_info.json` index that maps
//! `"<METHOD> <path>"` to each file.

pub mod digest;
pub mod index;
pub mod naming;

use std::path::PathBuf;

use serde_yaml::Value;
use tracing::{info, instrument};

use docspec_shared::{ApiIndex, DocSpecError, Result};

pub use digest::{NamedDigest, build_digests, digest_operation, flatten_schema};
pub use index::{clean_output_dir, previous_authorization, write_json};
pub use naming::{FileNamer, digest_file_name, sanitize_path};

/// Where and how digests are written.
#[derive(Debug, Clone)]
pub struct DigestOptions {
    /// Directory receiving one JSON file per operation.
    pub output_dir: PathBuf,
    /// Index file path.
    pub index_path: PathBuf,
    /// Authorization methods used when no previous index exists.
    pub authorization: Vec<String>,
}

/// Summary of a digest run.
#[derive(Debug, Clone, PartialEq)]
pub struct DigestReport {
    /// Number of endpoint digests written (equals the index entry count).
    pub endpoints: usize,
    pub index_path: PathBuf,
    pub output_dir: PathBuf,
}

/// First server URL of the document, or `""`.
pub fn base_url(spec: &Value) -> String {
    spec.get("servers")
        .and_then(Value::as_sequence)
        .and_then(|servers| servers.first())
        .and_then(|server| server.get("url"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Write the digests and the index.
///
/// Stale `*.json` files in the output directory are removed first.
/// `on_file` is called after each digest file with its name, 1-based
/// position, and the total.
#[instrument(skip_all, fields(output_dir = %opts.output_dir.display(), digests = digests.len()))]
pub fn write_digests(
    spec: &Value,
    digests: &[NamedDigest],
    opts: &DigestOptions,
    mut on_file: impl FnMut(&str, usize, usize),
) -> Result<DigestReport> {
    let authorization =
        previous_authorization(&opts.index_path).unwrap_or_else(|| opts.authorization.clone());

    let removed = clean_output_dir(&opts.output_dir)?;
    if removed > 0 {
        info!(removed, "removed stale digest files");
    }

    let mut endpoints = serde_json::Map::new();
    for (i, named) in digests.iter().enumerate() {
        write_json(&opts.output_dir.join(&named.file_name), &named.digest)?;
        endpoints.insert(
            ApiIndex::endpoint_key(&named.digest.method, &named.digest.path),
            serde_json::Value::String(index::index_entry_path(
                &opts.index_path,
                &opts.output_dir,
                &named.file_name,
            )),
        );
        on_file(&named.file_name, i + 1, digests.len());
    }

    let index = ApiIndex {
        base_url: base_url(spec),
        authorization,
        endpoints,
    };

    if let Some(parent) = opts.index_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| DocSpecError::io(parent, e))?;
    }
    write_json(&opts.index_path, &index)?;

    info!(
        endpoints = index.endpoints.len(),
        index = %opts.index_path.display(),
        "digest generation complete"
    );

    Ok(DigestReport {
        endpoints: index.endpoints.len(),
        index_path: opts.index_path.clone(),
        output_dir: opts.output_dir.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("docspec-digest-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn options(root: &Path) -> DigestOptions {
        DigestOptions {
            output_dir: root.join("llm"),
            index_path: root.join("api_info.json"),
            authorization: vec!["token query parameter".into()],
        }
    }

    const SPEC: &str = r#"
servers:
  - url: https://capi.tk-kit.com
paths:
  /a/{x}:
    get: {summary: one}
    post: {summary: two}
  /a/x:
    get: {summary: three}
  /:
    parameters: []
    get: {summary: four}
"#;

    fn spec() -> Value {
        serde_yaml::from_str(SPEC).unwrap()
    }

    fn operation_count(spec: &Value) -> usize {
        spec["paths"]
            .as_mapping()
            .unwrap()
            .values()
            .map(|item| {
                item.as_mapping()
                    .unwrap()
                    .keys()
                    .filter(|k| docspec_shared::is_http_method(k.as_str().unwrap()))
                    .count()
            })
            .sum()
    }

    #[test]
    fn index_counts_every_operation() {
        let tmp = temp_dir();
        let spec = spec();
        let digests = build_digests(&spec);
        let report = write_digests(&spec, &digests, &options(&tmp), |_, _, _| {}).unwrap();

        assert_eq!(report.endpoints, operation_count(&spec));
        assert_eq!(report.endpoints, 4);

        let index: ApiIndex =
            serde_json::from_str(&std::fs::read_to_string(&report.index_path).unwrap()).unwrap();
        assert_eq!(index.base_url, "https://capi.tk-kit.com");
        assert_eq!(index.authorization, vec!["token query parameter"]);
        assert_eq!(index.endpoints.len(), 4);
        assert_eq!(index.endpoints["GET /a/{x}"], "llm/get_a_x.json");
        assert_eq!(index.endpoints["GET /a/x"], "llm/get_a_x_2.json");
        assert_eq!(index.endpoints["GET /"], "llm/get_root.json");

        let files = std::fs::read_dir(tmp.join("llm")).unwrap().count();
        assert_eq!(files, 4);

        std::fs::remove_dir_all(&tmp).ok();
    }

    #[test]
    fn mixed_case_methods_keep_files_and_index_in_step() {
        let tmp = temp_dir();
        let spec: Value =
            serde_yaml::from_str("paths:\n  /a:\n    get: {}\n    GET: {}\n    Post: {}\n").unwrap();
        let digests = build_digests(&spec);
        let report = write_digests(&spec, &digests, &options(&tmp), |_, _, _| {}).unwrap();

        let files = std::fs::read_dir(tmp.join("llm")).unwrap().count();
        assert_eq!(report.endpoints, 2);
        assert_eq!(files, report.endpoints);

        std::fs::remove_dir_all(&tmp).ok();
    }

    #[test]
    fn rerun_removes_stale_files_and_keeps_authorization() {
        let tmp = temp_dir();
        let opts = options(&tmp);
        std::fs::create_dir_all(&opts.output_dir).unwrap();
        std::fs::write(opts.output_dir.join("get_gone.json"), "{}").unwrap();
        std::fs::write(
            &opts.index_path,
            r#"{"base_url":"","authorization":["Bearer token in Authorization header"],"endpoints":{}}"#,
        )
        .unwrap();

        let spec = spec();
        let digests = build_digests(&spec);
        let mut seen = Vec::new();
        write_digests(&spec, &digests, &opts, |name, i, total| {
            seen.push((name.to_string(), i, total))
        })
        .unwrap();

        assert!(!opts.output_dir.join("get_gone.json").exists());
        assert_eq!(seen.len(), 4);
        assert_eq!(seen[0], ("get_a_x.json".to_string(), 1, 4));

        let index: ApiIndex =
            serde_json::from_str(&std::fs::read_to_string(&opts.index_path).unwrap()).unwrap();
        assert_eq!(index.authorization, vec!["Bearer token in Authorization header"]);

        std::fs::remove_dir_all(&tmp).ok();
    }

    #[test]
    fn digest_file_content() {
        let tmp = temp_dir();
        let spec = spec();
        let digests = build_digests(&spec);
        write_digests(&spec, &digests, &options(&tmp), |_, _, _| {}).unwrap();

        let raw = std::fs::read_to_string(tmp.join("llm").join("post_a_x.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["method"], "POST");
        assert_eq!(value["path"], "/a/{x}");
        assert_eq!(value["summary"], "two");
        assert_eq!(value["request_fields"], serde_json::json!([]));

        std::fs::remove_dir_all(&tmp).ok();
    }

    #[test]
    fn base_url_defaults_to_empty() {
        let spec: Value = serde_yaml::from_str("paths: {}").unwrap();
        assert_eq!(base_url(&spec), "");
    }
}
