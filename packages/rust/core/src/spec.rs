//! Loading and saving the OpenAPI document.
//!
//! The document is kept as an order-preserving YAML tree so keys this tool
//! does not know about survive a rewrite.

use std::path::Path;

use serde_yaml::Value;
use tracing::{debug, instrument};

use docspec_shared::{DocSpecError, Result};

/// Read and parse the spec file.
///
/// A missing file is reported as an I/O error, which callers treat as fatal.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_spec(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path).map_err(|e| DocSpecError::io(path, e))?;
    let spec: Value = serde_yaml::from_str(&content)
        .map_err(|e| DocSpecError::parse(format!("{}: {e}", path.display())))?;

    if !spec.is_mapping() {
        return Err(DocSpecError::validation(format!(
            "{}: expected a mapping at the document root",
            path.display()
        )));
    }

    debug!(bytes = content.len(), "spec loaded");
    Ok(spec)
}

/// Serialize the spec back to `path`, replacing the file.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn save_spec(path: &Path, spec: &Value) -> Result<()> {
    let yaml = serde_yaml::to_string(spec)
        .map_err(|e| DocSpecError::Serialization(format!("YAML serialization failed: {e}")))?;
    std::fs::write(path, yaml).map_err(|e| DocSpecError::io(path, e))?;
    debug!("spec written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("docspec-spec-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = load_spec(Path::new("/nonexistent/openapi.yaml")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn invalid_yaml_is_parse_error() {
        let tmp = temp_dir();
        let path = tmp.join("openapi.yaml");
        std::fs::write(&path, "paths: [unclosed").unwrap();
        assert!(matches!(load_spec(&path), Err(DocSpecError::Parse { .. })));
        std::fs::remove_dir_all(&tmp).ok();
    }

    #[test]
    fn scalar_root_is_rejected() {
        let tmp = temp_dir();
        let path = tmp.join("openapi.yaml");
        std::fs::write(&path, "just text").unwrap();
        assert!(matches!(load_spec(&path), Err(DocSpecError::Validation { .. })));
        std::fs::remove_dir_all(&tmp).ok();
    }

    #[test]
    fn round_trip_keeps_key_order_and_unknown_keys() {
        let tmp = temp_dir();
        let path = tmp.join("openapi.yaml");
        std::fs::write(
            &path,
            "openapi: 3.0.0\nx-vendor: keep\npaths:\n  /b:\n    get: {}\n  /a:\n    post: {}\n",
        )
        .unwrap();

        let spec = load_spec(&path).unwrap();
        save_spec(&path, &spec).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();

        assert!(written.contains("x-vendor: keep"));
        assert!(written.find("/b").unwrap() < written.find("/a").unwrap());
        std::fs::remove_dir_all(&tmp).ok();
    }
}
