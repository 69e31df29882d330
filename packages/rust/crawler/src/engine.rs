//! Sequential documentation crawler.
//!
//! Reads the navigation menu of a local table-of-contents page, fetches every
//! in-scope link one after another, keeps each page's content container with
//! its attributes stripped, and concatenates the fragments into one document.

use std::time::{Duration, Instant};

use scraper::{Html, Selector};
use tracing::{debug, info, instrument, warn};
use url::Url;

use docspec_shared::{CrawlConfig, DocSpecError, Outcome, Result, SkipReason, SkipTally};

use crate::fetch::PageFetcher;
use crate::sanitize::strip_attributes;

// ---------------------------------------------------------------------------
// CrawlResult
// ---------------------------------------------------------------------------

/// Summary of a completed crawl.
#[derive(Debug, Clone)]
pub struct CrawlResult {
    /// Distinct links found in the navigation menu.
    pub links: usize,
    /// Pages whose content made it into the document.
    pub pages: usize,
    /// Pages dropped, by reason.
    pub skips: SkipTally,
    /// The consolidated HTML document.
    pub document: String,
    /// Total duration of the crawl.
    pub duration: Duration,
}

// ---------------------------------------------------------------------------
// Crawler
// ---------------------------------------------------------------------------

/// Crawls the pages linked from a documentation menu.
pub struct Crawler {
    config: CrawlConfig,
    fetcher: PageFetcher,
    base_url: Url,
    nav: Selector,
    link: Selector,
    content: Selector,
}

impl Crawler {
    /// Create a crawler, validating the configured URL and selectors.
    pub fn new(config: CrawlConfig, fetcher: PageFetcher) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            DocSpecError::config(format!("crawl.base_url `{}`: {e}", config.base_url))
        })?;
        let nav = selector("crawl.nav_selector", &config.nav_selector)?;
        let content = selector("crawl.content_selector", &config.content_selector)?;
        let link = selector("link", "a[href]")?;

        Ok(Self {
            config,
            fetcher,
            base_url,
            nav,
            link,
            content,
        })
    }

    /// Distinct in-scope links of the navigation menu, in menu order.
    ///
    /// Only raw `href` values starting with the configured prefix count; they
    /// are resolved against the base URL.
    pub fn collect_links(&self, toc_html: &str) -> Vec<Url> {
        let doc = Html::parse_document(toc_html);
        let Some(menu) = doc.select(&self.nav).next() else {
            warn!(selector = %self.config.nav_selector, "navigation menu not found");
            return Vec::new();
        };

        let mut links: Vec<Url> = Vec::new();
        for anchor in menu.select(&self.link) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            if !href.starts_with(&self.config.link_prefix) {
                continue;
            }
            match self.base_url.join(href) {
                Ok(url) if !links.contains(&url) => links.push(url),
                Ok(_) => {}
                Err(e) => debug!(href, error = %e, "unresolvable link"),
            }
        }

        links
    }

    /// Fetch every link in order and build the consolidated document.
    ///
    /// `on_page` is called before each fetch with the URL, its 1-based
    /// position, and the total.
    #[instrument(skip_all, fields(links = links.len()))]
    pub async fn crawl(&self, links: &[Url], mut on_page: impl FnMut(&Url, usize, usize)) -> CrawlResult {
        let start = Instant::now();
        let mut fragments: Vec<String> = Vec::new();
        let mut skips = SkipTally::default();

        for (i, url) in links.iter().enumerate() {
            on_page(url, i + 1, links.len());
            info!(%url, "processing page");

            match self.crawl_page(url).await {
                Outcome::Done(fragment) => fragments.push(fragment),
                Outcome::Skipped(reason) => {
                    warn!(%url, %reason, "page skipped");
                    skips.record(&reason);
                }
            }
        }

        let result = CrawlResult {
            links: links.len(),
            pages: fragments.len(),
            skips,
            document: self.render_document(&fragments),
            duration: start.elapsed(),
        };

        info!(
            links = result.links,
            pages = result.pages,
            skipped = result.skips.total(),
            duration_ms = result.duration.as_millis(),
            "crawl completed"
        );

        result
    }

    /// Fetch one page and return its cleaned content container.
    pub async fn crawl_page(&self, url: &Url) -> Outcome<String> {
        match self.fetcher.fetch(url).await {
            Outcome::Done(html) => clean_fragment(&html, &self.content),
            Outcome::Skipped(reason) => Outcome::Skipped(reason),
        }
    }

    /// Wrap the fragments in a minimal HTML shell.
    pub fn render_document(&self, fragments: &[String]) -> String {
        let mut body = String::new();
        for fragment in fragments {
            body.push('\n');
            body.push_str(fragment);
            body.push_str("\n\n<hr>\n");
        }

        format!(
            "<!DOCTYPE html>\n<html lang=\"{lang}\">\n<head>\n    <meta charset=\"UTF-8\">\n    <title>{title}</title>\n</head>\n<body>\n    <h1>{heading}</h1>\n    {body}\n</body>\n</html>\n",
            lang = self.config.lang,
            title = self.config.title,
            heading = self.config.heading,
        )
    }
}

/// Keep the first element matching `content`, attributes stripped.
fn clean_fragment(html: &str, content: &Selector) -> Outcome<String> {
    let doc = Html::parse_document(html);
    match doc.select(content).next() {
        Some(el) => Outcome::Done(strip_attributes(el)),
        None => Outcome::Skipped(SkipReason::MissingContent),
    }
}

fn selector(key: &str, css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| DocSpecError::config(format!("{key} `{css}` is not a valid selector: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchOptions;
    use docspec_shared::HttpConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TOC: &str = r#"<html><body>
        <ul id="other-menu"><li><a href="/developers/api-doc/ignored">Ignored</a></li></ul>
        <ul id="api-menu">
          <li><a href="/developers/api-doc/city">Города</a></li>
          <li><a href="/developers/api-doc/order">Заказ</a></li>
          <li><a href="/developers/api-doc/city">Города (дубль)</a></li>
          <li><a href="/news/2024">Новости</a></li>
          <li><a href="https://tk-kit.ru/developers/api-doc/abs">Абсолютная</a></li>
          <li><a name="anchor">Без ссылки</a></li>
        </ul>
    </body></html>"#;

    fn crawler(base_url: &str) -> Crawler {
        let config = CrawlConfig {
            base_url: base_url.into(),
            ..CrawlConfig::default()
        };
        let fetcher = PageFetcher::new(&FetchOptions::for_crawl(&HttpConfig::default(), &config))
            .unwrap();
        Crawler::new(config, fetcher).unwrap()
    }

    fn page(body: &str) -> String {
        format!(
            r#"<html><body><div id="left-bar">menu</div><div id="right-bar" class="content">{body}</div></body></html>"#
        )
    }

    #[test]
    fn collects_distinct_prefixed_links_in_order() {
        let links = crawler("https://tk-kit.ru").collect_links(TOC);
        let links: Vec<String> = links.iter().map(|u| u.to_string()).collect();
        assert_eq!(
            links,
            vec![
                "https://tk-kit.ru/developers/api-doc/city",
                "https://tk-kit.ru/developers/api-doc/order",
            ]
        );
    }

    #[test]
    fn missing_menu_yields_no_links() {
        let links = crawler("https://tk-kit.ru").collect_links("<html><body><p>empty</p></body></html>");
        assert!(links.is_empty());
    }

    #[test]
    fn invalid_selector_is_config_error() {
        let config = CrawlConfig {
            content_selector: "##".into(),
            ..CrawlConfig::default()
        };
        let fetcher = PageFetcher::new(&FetchOptions::for_crawl(&HttpConfig::default(), &config))
            .unwrap();
        assert!(Crawler::new(config, fetcher).is_err());
    }

    #[test]
    fn page_without_container_is_skipped() {
        let content = Selector::parse("#right-bar").unwrap();
        let outcome = clean_fragment("<html><body><p>x</p></body></html>", &content);
        assert_eq!(outcome, Outcome::Skipped(SkipReason::MissingContent));
    }

    #[test]
    fn document_shell_wraps_fragments() {
        let doc = crawler("https://tk-kit.ru")
            .render_document(&["<div>a</div>".to_string(), "<div>b</div>".to_string()]);
        assert!(doc.starts_with("<!DOCTYPE html>\n<html lang=\"ru\">"));
        assert!(doc.contains("<title>Сводная документация API для LLM</title>"));
        assert!(doc.contains("\n<div>a</div>\n\n<hr>\n\n<div>b</div>\n\n<hr>\n"));
        assert!(doc.trim_end().ends_with("</html>"));
    }

    #[tokio::test]
    async fn crawl_skips_failed_pages_and_keeps_order() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/developers/api-doc/city"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page(
                r#"<h4 class="x">Список городов</h4>"#,
            )))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/developers/api-doc/order"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/developers/api-doc/tariff"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<html><body><p>no container</p></body></html>",
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/developers/api-doc/track"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page(
                r#"<p style="color: red">Отслеживание</p>"#,
            )))
            .mount(&server)
            .await;

        let crawler = crawler(&server.uri());
        let toc = r#"<ul id="api-menu">
            <li><a href="/developers/api-doc/city">1</a></li>
            <li><a href="/developers/api-doc/order">2</a></li>
            <li><a href="/developers/api-doc/tariff">3</a></li>
            <li><a href="/developers/api-doc/track">4</a></li>
        </ul>"#;
        let links = crawler.collect_links(toc);
        assert_eq!(links.len(), 4);

        let mut seen = Vec::new();
        let result = crawler
            .crawl(&links, |url, current, total| {
                seen.push((url.path().to_string(), current, total))
            })
            .await;

        assert_eq!(seen.len(), 4);
        assert_eq!(seen[3], ("/developers/api-doc/track".to_string(), 4, 4));

        assert_eq!(result.links, 4);
        assert_eq!(result.pages, 2);
        assert_eq!(result.skips.total(), 2);
        assert_eq!(result.skips.by_kind()["status"], 1);
        assert_eq!(result.skips.by_kind()["missing_content"], 1);

        let city = result.document.find("<h4>Список городов</h4>").unwrap();
        let track = result.document.find("<p>Отслеживание</p>").unwrap();
        assert!(city < track);
        assert!(!result.document.contains("left-bar"));
        assert!(!result.document.contains("class="));
    }
}
