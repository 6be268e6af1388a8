//! HTTP crawl engine
//!
//! This module crawls a site over HTTP and validates every link it finds:
//! - Building the HTTP client from the check options
//! - Breadth-first traversal of internal HTML pages
//! - HEAD requests with a GET fallback
//! - Retry logic for transient failures and rate limiting
//! - Mapping responses to link states

use crate::config::CheckOptions;
use crate::engine::parser::extract_links;
use crate::engine::{CrawlReport, CrawlSession, EventSender, LinkChecker, LinkResult, LinkState};
use crate::EngineError;
use futures::stream::{self, StreamExt};
use regex::Regex;
use reqwest::header::{CONTENT_TYPE, RETRY_AFTER};
use reqwest::{redirect::Policy, Client, Method, Response, StatusCode};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Longest `Retry-After` delay honoured for HTTP 429
const MAX_RETRY_AFTER: Duration = Duration::from_secs(60);

/// Engine that crawls the site over HTTP
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpLinkChecker;

impl HttpLinkChecker {
    pub fn new() -> Self {
        Self
    }
}

impl LinkChecker for HttpLinkChecker {
    fn start(&self, options: &CheckOptions) -> Result<CrawlSession, EngineError> {
        let root = Url::parse(&options.path).map_err(|source| EngineError::InvalidUrl {
            url: options.path.clone(),
            source,
        })?;

        let skip = options
            .skip
            .patterns()
            .into_iter()
            .map(Regex::new)
            .collect::<Result<Vec<_>, _>>()?;

        let crawler = Crawler {
            client: build_http_client(options)?,
            root,
            options: options.clone(),
            skip,
        };

        Ok(CrawlSession::spawn(move |events| crawler.run(events)))
    }
}

/// Builds an HTTP client from the check options
///
/// # Example
///
/// ```no_run
/// use broken_links_checker::config::CheckOptions;
/// use broken_links_checker::engine::build_http_client;
///
/// let client = build_http_client(&CheckOptions::default()).unwrap();
/// ```
pub fn build_http_client(options: &CheckOptions) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .user_agent(options.user_agent.clone())
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true);

    if options.timeout > 0 {
        builder = builder.timeout(Duration::from_millis(options.timeout));
    }

    builder.build()
}

/// Outcome of checking one link
struct Checked {
    result: LinkResult,

    /// HTML body, present only for internal pages that should be crawled
    page: Option<String>,
}

struct Crawler {
    client: Client,
    root: Url,
    options: CheckOptions,
    skip: Vec<Regex>,
}

impl Crawler {
    /// Runs the crawl loop
    ///
    /// 1. Check the root and emit it as a link without parent
    /// 2. Pop the next page, emit a page start event, extract its links
    /// 3. Check every link not seen before, `concurrency` at a time
    /// 4. Queue internal HTML pages when recursing
    async fn run(self, events: EventSender) -> Result<CrawlReport, EngineError> {
        let this = Arc::new(self);
        let root = this.root.to_string();
        let concurrency = this.options.concurrency.max(1);

        tracing::debug!("Starting HTTP crawl at {}", root);

        let mut seen: HashSet<String> = HashSet::from([root.clone()]);
        let mut pages: VecDeque<(String, String)> = VecDeque::new();
        let mut links = Vec::new();

        let checked = this.check(root.clone(), None, true).await;
        if let Some(body) = checked.page {
            pages.push_back((root.clone(), body));
        }
        events.link(checked.result.clone()).await?;
        links.push(checked.result);

        while let Some((page_url, body)) = pages.pop_front() {
            events.page_start(page_url.clone()).await?;

            let Ok(base) = Url::parse(&page_url) else {
                continue;
            };

            let fresh: Vec<String> = extract_links(&body, &base)
                .into_iter()
                .filter(|link| seen.insert(link.clone()))
                .collect();

            tracing::debug!("{}: {} new link(s)", page_url, fresh.len());

            let mut checks = stream::iter(fresh)
                .map(|link| {
                    let this = Arc::clone(&this);
                    let parent = page_url.clone();
                    let crawl = this.options.recurse && link.starts_with(&root);
                    async move { this.check(link, Some(parent), crawl).await }
                })
                .buffered(concurrency);

            while let Some(checked) = checks.next().await {
                if let Some(body) = checked.page {
                    pages.push_back((checked.result.url.clone(), body));
                }
                events.link(checked.result.clone()).await?;
                links.push(checked.result);
            }
        }

        tracing::debug!("HTTP crawl of {} checked {} link(s)", root, links.len());

        Ok(CrawlReport::from_links(links))
    }

    /// Checks a single link
    ///
    /// Links with a non-HTTP scheme or matching a skip pattern are skipped
    /// without a request. When `crawl` is set the link is fetched with GET and
    /// the body is kept if it is HTML.
    async fn check(&self, url: String, parent: Option<String>, crawl: bool) -> Checked {
        let mut result = LinkResult {
            url,
            state: LinkState::Skipped,
            status: None,
            parent,
        };

        if !is_http(&result.url) || self.is_skipped(&result.url) {
            return Checked { result, page: None };
        }

        let response = if crawl {
            self.send(Method::GET, &result.url).await
        } else {
            match self.send(Method::HEAD, &result.url).await {
                Ok(response) if response.status().as_u16() < 400 => Ok(response),
                _ => self.send(Method::GET, &result.url).await,
            }
        };

        match response {
            Ok(response) => {
                let status = response.status();
                result.status = Some(status.as_u16());
                result.state = if status.as_u16() < 400 {
                    LinkState::Ok
                } else {
                    LinkState::Broken
                };

                let page = if crawl && result.state == LinkState::Ok && is_html(&response) {
                    response.text().await.ok()
                } else {
                    None
                };

                Checked { result, page }
            }
            Err(e) => {
                tracing::debug!("Request to {} failed: {}", result.url, e);
                result.state = LinkState::Broken;
                Checked { result, page: None }
            }
        }
    }

    /// Sends a request, retrying as configured
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP 429 with `Retry-After` | Wait and retry once (if `retry`) |
    /// | HTTP 5xx or network error | Retry up to `retryErrorsCount` times (if `retryErrors`) |
    async fn send(&self, method: Method, url: &str) -> Result<Response, reqwest::Error> {
        let mut attempt: u32 = 0;
        let mut rate_limit_retried = false;

        loop {
            let result = self.client.request(method.clone(), url).send().await;

            let delay = match &result {
                Ok(response) if response.status() == StatusCode::TOO_MANY_REQUESTS => {
                    if self.options.retry && !rate_limit_retried {
                        rate_limit_retried = true;
                        retry_after(response)
                    } else {
                        None
                    }
                }
                Ok(response) if response.status().is_server_error() => {
                    self.error_retry_delay(attempt)
                }
                Ok(_) => None,
                Err(_) => self.error_retry_delay(attempt),
            };

            match delay {
                Some(delay) => {
                    attempt += 1;
                    tracing::debug!("Retrying {} {} in {:?}", method, url, delay);
                    tokio::time::sleep(delay).await;
                }
                None => return result,
            }
        }
    }

    /// Delay before the next error retry, None once retries are exhausted
    ///
    /// Delays grow linearly and reach `retryErrorsJitter` seconds on the last attempt.
    fn error_retry_delay(&self, attempt: u32) -> Option<Duration> {
        let count = self.options.retry_errors_count;
        if !self.options.retry_errors || attempt >= count {
            return None;
        }

        let max_ms = self.options.retry_errors_jitter.saturating_mul(1000);
        Some(Duration::from_millis(
            max_ms * u64::from(attempt + 1) / u64::from(count),
        ))
    }

    fn is_skipped(&self, url: &str) -> bool {
        self.skip.iter().any(|pattern| pattern.is_match(url))
    }
}

fn is_http(url: &str) -> bool {
    Url::parse(url)
        .map(|u| u.scheme() == "http" || u.scheme() == "https")
        .unwrap_or(false)
}

fn is_html(response: &Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("text/html"))
}

/// Delay requested by a `Retry-After` header
fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_retry_after)
}

/// Parses a `Retry-After` value given in seconds, capped at [`MAX_RETRY_AFTER`]
///
/// HTTP dates are not supported and yield None.
fn parse_retry_after(value: &str) -> Option<Duration> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .map(|secs| Duration::from_secs(secs).min(MAX_RETRY_AFTER))
}
