//! Application configuration for docspec.
//!
//! Project config lives at `./docspec.toml` (or wherever `--config` points).
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DocSpecError, Result};
use crate::rules::ExtractionRules;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "docspec.toml";

/// User-Agent string for documentation requests.
const USER_AGENT: &str = concat!("docspec/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Config structs (matching docspec.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Spec enrichment settings.
    #[serde(default)]
    pub enrich: EnrichConfig,

    /// HTTP client settings shared by the network stages.
    #[serde(default)]
    pub http: HttpConfig,

    /// Digest generation settings.
    #[serde(default)]
    pub digest: DigestConfig,

    /// Raw documentation crawl settings.
    #[serde(default)]
    pub crawl: CrawlConfig,

    /// Extraction rule table.
    #[serde(default)]
    pub rules: ExtractionRules,
}

/// `[enrich]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichConfig {
    /// OpenAPI document rewritten in place.
    #[serde(default = "default_spec_path")]
    pub spec_path: PathBuf,

    /// Documentation root; each spec path is appended to it.
    #[serde(default = "default_doc_root")]
    pub doc_root: String,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            spec_path: default_spec_path(),
            doc_root: default_doc_root(),
        }
    }
}

fn default_spec_path() -> PathBuf {
    PathBuf::from("tk-kit/openapi.yaml")
}
fn default_doc_root() -> String {
    "https://tk-kit.ru/developers/api-doc".into()
}

/// `[http]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout for documentation pages.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Verify TLS certificates. Turning this off accepts any certificate.
    #[serde(default = "default_true")]
    pub verify_certificates: bool,

    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            verify_certificates: true,
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    20
}
fn default_true() -> bool {
    true
}
fn default_user_agent() -> String {
    USER_AGENT.into()
}

/// `[digest]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestConfig {
    /// OpenAPI document read by the digest generator.
    #[serde(default = "default_spec_path")]
    pub spec_path: PathBuf,

    /// Directory receiving one JSON file per endpoint.
    #[serde(default = "default_digest_dir")]
    pub output_dir: PathBuf,

    /// Index file aggregating base URL, authorization and endpoints.
    #[serde(default = "default_index_path")]
    pub index_path: PathBuf,

    /// Authorization methods used when no previous index can be read.
    #[serde(default)]
    pub authorization: Vec<String>,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            spec_path: default_spec_path(),
            output_dir: default_digest_dir(),
            index_path: default_index_path(),
            authorization: Vec::new(),
        }
    }
}

fn default_digest_dir() -> PathBuf {
    PathBuf::from("tk-kit/llm")
}
fn default_index_path() -> PathBuf {
    PathBuf::from("tk-kit/api_info.json")
}

/// `[crawl]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Local HTML file holding the navigation menu.
    #[serde(default = "default_toc_path")]
    pub toc_path: PathBuf,

    /// Site root the menu links are resolved against.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Navigation list inside the table-of-contents page.
    #[serde(default = "default_nav_selector")]
    pub nav_selector: String,

    /// Only links whose `href` starts with this prefix are crawled.
    #[serde(default = "default_link_prefix")]
    pub link_prefix: String,

    /// Content container kept from each crawled page.
    #[serde(default = "default_content_selector")]
    pub content_selector: String,

    /// Consolidated HTML output file.
    #[serde(default = "default_crawl_output")]
    pub output_path: PathBuf,

    /// Per-request timeout; unbounded when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// `lang` attribute of the output document.
    #[serde(default = "default_lang")]
    pub lang: String,

    /// `<title>` of the output document.
    #[serde(default = "default_title")]
    pub title: String,

    /// `<h1>` of the output document.
    #[serde(default = "default_heading")]
    pub heading: String,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            toc_path: default_toc_path(),
            base_url: default_base_url(),
            nav_selector: default_nav_selector(),
            link_prefix: default_link_prefix(),
            content_selector: default_content_selector(),
            output_path: default_crawl_output(),
            timeout_secs: None,
            lang: default_lang(),
            title: default_title(),
            heading: default_heading(),
        }
    }
}

fn default_toc_path() -> PathBuf {
    PathBuf::from("QA.html")
}
fn default_base_url() -> String {
    "https://tk-kit.ru".into()
}
fn default_nav_selector() -> String {
    "ul#api-menu".into()
}
fn default_link_prefix() -> String {
    "/developers/api-doc/".into()
}
fn default_content_selector() -> String {
    "#right-bar".into()
}
fn default_crawl_output() -> PathBuf {
    PathBuf::from("llm_optimized_documentation.html")
}
fn default_lang() -> String {
    "ru".into()
}
fn default_title() -> String {
    "Сводная документация API для LLM".into()
}
fn default_heading() -> String {
    "Сводная документация по API".into()
}

impl AppConfig {
    /// Check values that would otherwise only fail halfway through a run.
    pub fn validate(&self) -> Result<()> {
        parse_url("enrich.doc_root", &self.enrich.doc_root)?;
        parse_url("crawl.base_url", &self.crawl.base_url)?;

        if self.http.timeout_secs == 0 {
            return Err(DocSpecError::config("http.timeout_secs must be positive"));
        }
        if self.crawl.timeout_secs == Some(0) {
            return Err(DocSpecError::config("crawl.timeout_secs must be positive"));
        }
        if self.crawl.link_prefix.is_empty() {
            return Err(DocSpecError::config("crawl.link_prefix must not be empty"));
        }
        Ok(())
    }
}

fn parse_url(key: &str, value: &str) -> Result<Url> {
    Url::parse(value)
        .map_err(|e| DocSpecError::config(format!("{key} is not a valid URL ({value}): {e}")))
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Path of the config file in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from(CONFIG_FILE_NAME)
}

/// Load the application config.
///
/// An explicit path must exist. Without one, `./docspec.toml` is used when
/// present, and built-in defaults otherwise.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    let config = match explicit {
        Some(path) => load_config_from(path)?,
        None => {
            let path = default_config_path();
            if path.exists() {
                load_config_from(&path)?
            } else {
                tracing::debug!(?path, "config file not found, using defaults");
                AppConfig::default()
            }
        }
    };

    config.validate()?;
    Ok(config)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DocSpecError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| DocSpecError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Write a default config file at `path`. Refuses to overwrite an existing one.
pub fn init_config(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return Err(DocSpecError::config(format!(
            "{} already exists",
            path.display()
        )));
    }

    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| DocSpecError::config(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| DocSpecError::io(path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("docspec-config-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("doc_root"));
        assert!(toml_str.contains("verify_certificates = true"));
        assert!(toml_str.contains("Поля запроса"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.http.timeout_secs, 20);
        assert_eq!(parsed.crawl.timeout_secs, None);
        assert_eq!(parsed.rules, ExtractionRules::default());
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let toml_str = r#"
[http]
verify_certificates = false

[digest]
authorization = ["Bearer token in Authorization header"]
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert!(!config.http.verify_certificates);
        assert_eq!(config.http.timeout_secs, 20);
        assert_eq!(config.digest.authorization.len(), 1);
        assert_eq!(config.digest.output_dir, PathBuf::from("tk-kit/llm"));
        assert_eq!(config.enrich.spec_path, PathBuf::from("tk-kit/openapi.yaml"));
    }

    #[test]
    fn validate_rejects_bad_doc_root() {
        let mut config = AppConfig::default();
        config.enrich.doc_root = "not a url".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("enrich.doc_root"));
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let mut config = AppConfig::default();
        config.http.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let tmp = temp_dir();
        let err = load_config(Some(&tmp.join("missing.toml"))).unwrap_err();
        assert!(err.is_not_found());
        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn init_then_load() {
        let tmp = temp_dir();
        let path = tmp.join(CONFIG_FILE_NAME);
        init_config(&path).expect("init");
        let loaded = load_config(Some(&path)).expect("load");
        assert_eq!(loaded.crawl.content_selector, "#right-bar");

        assert!(init_config(&path).is_err());
        let _ = std::fs::remove_dir_all(&tmp);
    }
}
