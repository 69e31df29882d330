//! End-to-end runs: enrich, digest, crawl.
//!
//! Each run loads its inputs, drives the per-unit work sequentially, writes
//! its outputs once, and reports progress through a [`ProgressReporter`].

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};

use docspec_artifacts::{DigestOptions, DigestReport, build_digests, write_digests};
use docspec_crawler::{Crawler, FetchOptions, PageFetcher};
use docspec_extract::CompiledRules;
use docspec_shared::{AppConfig, DocSpecError, Result, SkipTally};

use crate::enricher::{EnrichReport, Enricher};
use crate::spec::{load_spec, save_spec};

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called for each unit of work (path, digest file, crawled page).
    fn unit(&self, label: &str, current: usize, total: usize);
    /// Called when the run completes, with a one-line summary.
    fn done(&self, summary: &str);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn unit(&self, _label: &str, _current: usize, _total: usize) {}
    fn done(&self, _summary: &str) {}
}

// ---------------------------------------------------------------------------
// enrich
// ---------------------------------------------------------------------------

/// Enrich `config.enrich.spec_path` in place from the documentation site.
///
/// The spec is written once, after every path has been processed.
#[instrument(skip_all, fields(spec = %config.enrich.spec_path.display()))]
pub async fn run_enrich(config: &AppConfig, progress: &dyn ProgressReporter) -> Result<EnrichReport> {
    let start = Instant::now();

    progress.phase("Loading specification");
    let mut spec = load_spec(&config.enrich.spec_path)?;

    let rules = CompiledRules::compile(&config.rules)?;
    let fetcher = PageFetcher::new(&FetchOptions::for_enrich(&config.http))?;
    let enricher = Enricher::new(fetcher, rules, config.enrich.doc_root.clone());

    progress.phase("Fetching documentation pages");
    let report = enricher
        .enrich(&mut spec, |path, current, total| progress.unit(path, current, total))
        .await?;

    progress.phase("Writing specification");
    save_spec(&config.enrich.spec_path, &spec)?;

    info!(
        paths = report.paths,
        operations_updated = report.operations_updated,
        skipped = report.skipped,
        elapsed_ms = start.elapsed().as_millis(),
        "enrich pipeline complete"
    );
    progress.done(&format!(
        "{} operations updated across {} paths, {} skipped",
        report.operations_updated, report.paths, report.skipped
    ));

    Ok(report)
}

// ---------------------------------------------------------------------------
// digest
// ---------------------------------------------------------------------------

/// Write per-endpoint digests and the index for `config.digest.spec_path`.
#[instrument(skip_all, fields(spec = %config.digest.spec_path.display()))]
pub fn run_digest(config: &AppConfig, progress: &dyn ProgressReporter) -> Result<DigestReport> {
    progress.phase("Loading specification");
    let spec = load_spec(&config.digest.spec_path)?;

    progress.phase("Flattening operations");
    let digests = build_digests(&spec);

    progress.phase("Writing digests");
    let opts = DigestOptions {
        output_dir: config.digest.output_dir.clone(),
        index_path: config.digest.index_path.clone(),
        authorization: config.digest.authorization.clone(),
    };
    let report = write_digests(&spec, &digests, &opts, |name, current, total| {
        progress.unit(name, current, total)
    })?;

    progress.done(&format!(
        "{} endpoint digests in {}",
        report.endpoints,
        report.output_dir.display()
    ));

    Ok(report)
}

// ---------------------------------------------------------------------------
// crawl
// ---------------------------------------------------------------------------

/// Summary of a crawl run.
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Distinct in-scope links found in the menu.
    pub links: usize,
    /// Pages included in the output document.
    pub pages_written: usize,
    pub skipped: usize,
    pub skip_reasons: SkipTally,
    /// Written document, `None` when the menu had no links.
    pub output_path: Option<PathBuf>,
    pub elapsed: Duration,
}

/// Crawl the menu of `config.crawl.toc_path` into one HTML document.
#[instrument(skip_all, fields(toc = %config.crawl.toc_path.display()))]
pub async fn run_crawl(config: &AppConfig, progress: &dyn ProgressReporter) -> Result<CrawlReport> {
    let start = Instant::now();
    let crawl = &config.crawl;

    progress.phase("Reading table of contents");
    let toc = std::fs::read_to_string(&crawl.toc_path)
        .map_err(|e| DocSpecError::io(&crawl.toc_path, e))?;

    let fetcher = PageFetcher::new(&FetchOptions::for_crawl(&config.http, crawl))?;
    let crawler = Crawler::new(crawl.clone(), fetcher)?;
    let links = crawler.collect_links(&toc);

    if links.is_empty() {
        warn!(prefix = %crawl.link_prefix, "no documentation links found, nothing written");
        progress.done("no documentation links found");
        return Ok(CrawlReport {
            links: 0,
            pages_written: 0,
            skipped: 0,
            skip_reasons: SkipTally::default(),
            output_path: None,
            elapsed: start.elapsed(),
        });
    }

    progress.phase("Crawling documentation");
    let result = crawler
        .crawl(&links, |url, current, total| progress.unit(url.as_str(), current, total))
        .await;

    progress.phase("Writing document");
    if let Some(parent) = crawl.output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| DocSpecError::io(parent, e))?;
    }
    std::fs::write(&crawl.output_path, &result.document)
        .map_err(|e| DocSpecError::io(&crawl.output_path, e))?;

    info!(
        pages = result.pages,
        path = %crawl.output_path.display(),
        "crawl pipeline complete"
    );
    progress.done(&format!(
        "{} of {} pages written to {}",
        result.pages,
        result.links,
        crawl.output_path.display()
    ));

    Ok(CrawlReport {
        links: result.links,
        pages_written: result.pages,
        skipped: result.skips.total(),
        skip_reasons: result.skips,
        output_path: Some(crawl.output_path.clone()),
        elapsed: start.elapsed(),
    })
}
