//! Digest file naming.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_.\-]").expect("unsafe-char regex is valid"));

/// Turn a request path into a filename-safe token.
///
/// `/orders/{id}/items` → `orders_id_items`; the root path maps to `root`.
/// Paths that differ only by placeholder braces (`/a/{x}` and `/a/x`)
/// sanitize to the same token; [`FileNamer`] resolves those at write time.
pub fn sanitize_path(path: &str) -> String {
    let trimmed = path.trim_matches('/').replace(['{', '}'], "");
    let token = UNSAFE_CHARS.replace_all(&trimmed, "_");
    if token.is_empty() {
        "root".to_string()
    } else {
        token.into_owned()
    }
}

/// Base filename of an operation's digest: `<method>_<sanitized path>.json`.
pub fn digest_file_name(method: &str, path: &str) -> String {
    format!("{}_{}.json", method.to_lowercase(), sanitize_path(path))
}

/// Hands out collision-free digest filenames in call order.
///
/// The first operation to claim a name keeps it; later ones get `_2`, `_3`,
/// and so on before the extension.
#[derive(Debug, Default)]
pub struct FileNamer {
    taken: HashSet<String>,
}

impl FileNamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a filename for `method` + `path`.
    pub fn assign(&mut self, method: &str, path: &str) -> String {
        let base = digest_file_name(method, path);
        if self.taken.insert(base.clone()) {
            return base;
        }

        let stem = base.trim_end_matches(".json");
        let mut n = 2;
        loop {
            let candidate = format!("{stem}_{n}.json");
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_separators_and_braces() {
        assert_eq!(sanitize_path("/users/{id}"), "users_id");
        assert_eq!(sanitize_path("/users/{name}"), "users_name");
        assert_eq!(sanitize_path("/v1/order.create/"), "v1_order.create");
        assert_eq!(sanitize_path("/search?q=x"), "search_q_x");
    }

    #[test]
    fn root_maps_to_token() {
        assert_eq!(sanitize_path("/"), "root");
        assert_eq!(sanitize_path(""), "root");
        assert_eq!(digest_file_name("GET", "/"), "get_root.json");
    }

    #[test]
    fn non_ascii_is_replaced() {
        assert_eq!(sanitize_path("/город/список"), "____________");
    }

    #[test]
    fn placeholder_collision_is_known() {
        assert_eq!(sanitize_path("/a/{x}"), sanitize_path("/a/x"));
    }

    #[test]
    fn namer_suffixes_collisions_in_order() {
        let mut namer = FileNamer::new();
        assert_eq!(namer.assign("get", "/a/{x}"), "get_a_x.json");
        assert_eq!(namer.assign("get", "/a/x"), "get_a_x_2.json");
        assert_eq!(namer.assign("post", "/a/x"), "post_a_x.json");
        assert_eq!(namer.assign("GET", "/a/x/"), "get_a_x_3.json");
    }

    #[test]
    fn namer_keeps_distinct_placeholders_apart() {
        let mut namer = FileNamer::new();
        let a = namer.assign("get", "/users/{id}");
        let b = namer.assign("get", "/users/{name}");
        assert_ne!(a, b);
        assert_eq!(a, "get_users_id.json");
        assert_eq!(b, "get_users_name.json");
    }
}
