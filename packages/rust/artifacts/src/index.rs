//! Output directory housekeeping and the `api_info.json` manifest.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use docspec_shared::{ApiIndex, DocSpecError, Result};

/// Authorization list of an existing index file, if one can be read.
pub fn previous_authorization(index_path: &Path) -> Option<Vec<String>> {
    let content = match std::fs::read_to_string(index_path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            warn!(path = %index_path.display(), error = %e, "previous index unreadable");
            return None;
        }
    };

    match serde_json::from_str::<ApiIndex>(&content) {
        Ok(index) => Some(index.authorization),
        Err(e) => {
            warn!(path = %index_path.display(), error = %e, "previous index is not valid JSON");
            None
        }
    }
}

/// Create `dir` if needed and delete every `*.json` file already in it.
///
/// Returns the number of files removed.
pub fn clean_output_dir(dir: &Path) -> Result<usize> {
    std::fs::create_dir_all(dir).map_err(|e| DocSpecError::io(dir, e))?;

    let mut removed = 0;
    for entry in std::fs::read_dir(dir).map_err(|e| DocSpecError::io(dir, e))? {
        let path = entry.map_err(|e| DocSpecError::io(dir, e))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            std::fs::remove_file(&path).map_err(|e| DocSpecError::io(&path, e))?;
            removed += 1;
        }
    }

    debug!(path = %dir.display(), removed, "cleaned output directory");
    Ok(removed)
}

/// Path of a digest file as recorded in the index: relative to the index
/// file's directory when possible, `/`-separated.
pub fn index_entry_path(index_path: &Path, output_dir: &Path, file_name: &str) -> String {
    let index_dir = index_path.parent().unwrap_or_else(|| Path::new(""));
    let target: PathBuf = match output_dir.strip_prefix(index_dir) {
        Ok(relative) => relative.join(file_name),
        Err(_) => output_dir.join(file_name),
    };

    target
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Write a JSON file (pretty-printed).
pub fn write_json<T: serde::Serialize>(path: &Path, data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| DocSpecError::Serialization(format!("JSON serialization failed: {e}")))?;
    std::fs::write(path, json).map_err(|e| DocSpecError::io(path, e))?;
    debug!(path = %path.display(), "wrote JSON file");
    Ok(())
}
