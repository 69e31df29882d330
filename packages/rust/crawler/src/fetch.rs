//! Blocking-style page fetcher shared by the enricher and the crawler.
//!
//! Requests are issued one at a time by the callers; every failure maps to
//! an [`Outcome::Skipped`] so a single bad page never aborts a run.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use docspec_shared::{CrawlConfig, DocSpecError, HttpConfig, Outcome, Result, SkipReason};

/// Client settings for a [`PageFetcher`].
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Per-request timeout; `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Reject invalid TLS certificates.
    pub verify_certificates: bool,
    /// User-Agent header.
    pub user_agent: String,
}

impl FetchOptions {
    /// Options for documentation pages fetched during enrichment.
    pub fn for_enrich(http: &HttpConfig) -> Self {
        Self {
            timeout: Some(Duration::from_secs(http.timeout_secs)),
            verify_certificates: http.verify_certificates,
            user_agent: http.user_agent.clone(),
        }
    }

    /// Options for the raw crawl, whose timeout is configured separately.
    pub fn for_crawl(http: &HttpConfig, crawl: &CrawlConfig) -> Self {
        Self {
            timeout: crawl.timeout_secs.map(Duration::from_secs),
            verify_certificates: http.verify_certificates,
            user_agent: http.user_agent.clone(),
        }
    }
}

/// Fetches HTML pages and reports each one as done or skipped.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    /// Build the underlying HTTP client.
    pub fn new(opts: &FetchOptions) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(opts.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(5));

        if let Some(timeout) = opts.timeout {
            builder = builder.timeout(timeout);
        }
        if !opts.verify_certificates {
            warn!("TLS certificate verification is disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder
            .build()
            .map_err(|e| DocSpecError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// GET `url` and return its body, or why it was skipped.
    pub async fn fetch(&self, url: &Url) -> Outcome<String> {
        debug!(%url, "fetching page");

        let response = match self.client.get(url.as_str()).send().await {
            Ok(response) => response,
            Err(e) => return Outcome::Skipped(SkipReason::Request(e.to_string())),
        };

        let status = response.status();
        if !status.is_success() {
            return Outcome::Skipped(SkipReason::Status(status.as_u16()));
        }

        match response.text().await {
            Ok(body) => Outcome::Done(body),
            Err(e) => Outcome::Skipped(SkipReason::Body(e.to_string())),
        }
    }
}
