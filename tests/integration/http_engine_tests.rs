//! Integration tests for the HTTP crawl engine
//!
//! These tests use wiremock to create mock HTTP servers and check what the
//! engine reports for each link.

use broken_links_checker::config::CheckOptions;
use broken_links_checker::engine::HttpLinkChecker;
use broken_links_checker::{CrawlEvent, CrawlReport, LinkChecker, LinkResult, LinkState};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_raw(body, "text/html; charset=utf-8")
}

/// Options pointing at `root`, without retry delays
fn options_for(root: &str) -> CheckOptions {
    CheckOptions {
        path: root.to_string(),
        concurrency: 4,
        retry_errors: false,
        ..Default::default()
    }
}

/// Runs a crawl to completion and returns every event plus the report
async fn crawl(options: &CheckOptions) -> (Vec<CrawlEvent>, CrawlReport) {
    let mut session = HttpLinkChecker::new()
        .start(options)
        .expect("Failed to start crawl");

    let mut events = Vec::new();
    while let Some(event) = session.next_event().await {
        events.push(event);
    }
    let report = session.finish().await.expect("Crawl failed");
    (events, report)
}

fn links(events: &[CrawlEvent]) -> Vec<&LinkResult> {
    events
        .iter()
        .filter_map(|event| match event {
            CrawlEvent::Link(result) => Some(result),
            CrawlEvent::PageStart(_) => None,
        })
        .collect()
}

fn find<'a>(events: &'a [CrawlEvent], url: &str) -> &'a LinkResult {
    links(events)
        .into_iter()
        .find(|link| link.url == url)
        .unwrap_or_else(|| panic!("No result for {}", url))
}

#[tokio::test]
async fn test_recursive_crawl_reports_every_link() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();
    let root = format!("{}/", base);

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<html><body>
                <a href="/page1">Page 1</a>
                <a href="/missing">Missing</a>
                <a href="mailto:someone@example.com">Mail</a>
                <a href="https://www.googleapis.com/css">Fonts</a>
            </body></html>"#
                .to_string(),
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page1"))
        .respond_with(html(
            r#"<a href="/">Home</a><a href="/about">About</a>"#.to_string(),
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(ResponseTemplate::new(200).set_body_string("about"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let (events, report) = crawl(&options_for(&root)).await;

    // Root first, without parent
    assert_eq!(
        events[0],
        CrawlEvent::Link(LinkResult::new(root.clone(), LinkState::Ok).with_status(200))
    );
    assert_eq!(events[1], CrawlEvent::PageStart(root.clone()));

    let page1 = format!("{}/page1", base);
    assert_eq!(
        find(&events, &page1),
        &LinkResult::new(page1.clone(), LinkState::Ok)
            .with_status(200)
            .with_parent(root.clone())
    );

    let missing = find(&events, &format!("{}/missing", base));
    assert_eq!(missing.state, LinkState::Broken);
    assert_eq!(missing.status, Some(404));

    assert_eq!(
        find(&events, "mailto:someone@example.com").state,
        LinkState::Skipped
    );
    assert_eq!(
        find(&events, "https://www.googleapis.com/css").state,
        LinkState::Skipped
    );

    // The second page is crawled and its new link attributed to it
    assert!(events.contains(&CrawlEvent::PageStart(page1.clone())));
    let about = find(&events, &format!("{}/about", base));
    assert_eq!(about.state, LinkState::Ok);
    assert_eq!(about.parent.as_deref(), Some(page1.as_str()));

    // Each URL is reported once
    assert_eq!(links(&events).len(), 6);
    assert_eq!(report.links.len(), 6);
    assert!(!report.passed);
    assert_eq!(report.broken_count(), 1);
}

#[tokio::test]
async fn test_without_recursion_only_root_is_parsed() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();
    let root = format!("{}/", base);

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<a href="/page1">Page 1</a><a href="/no-head">No HEAD</a>"#.to_string(),
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("HEAD"))
        .and(path("/page1"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "text/html"))
        .mount(&mock_server)
        .await;

    Mock::given(method("HEAD"))
        .and(path("/no-head"))
        .respond_with(ResponseTemplate::new(405))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/no-head"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let options = CheckOptions {
        recurse: false,
        ..options_for(&root)
    };
    let (events, report) = crawl(&options).await;

    let page_starts: Vec<_> = events
        .iter()
        .filter(|event| matches!(event, CrawlEvent::PageStart(_)))
        .collect();
    assert_eq!(page_starts, vec![&CrawlEvent::PageStart(root.clone())]);

    assert_eq!(find(&events, &format!("{}/page1", base)).state, LinkState::Ok);

    let no_head = find(&events, &format!("{}/no-head", base));
    assert_eq!(no_head.state, LinkState::Ok);
    assert_eq!(no_head.status, Some(200));

    assert!(report.passed);
}

#[tokio::test]
async fn test_unreachable_link_is_broken_without_status() {
    let mock_server = MockServer::start().await;
    let root = format!("{}/", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="http://127.0.0.1:1/gone">Gone</a>"#.to_string()))
        .mount(&mock_server)
        .await;

    let (events, report) = crawl(&options_for(&root)).await;

    let gone = find(&events, "http://127.0.0.1:1/gone");
    assert_eq!(gone.state, LinkState::Broken);
    assert_eq!(gone.status, None);
    assert_eq!(gone.parent.as_deref(), Some(root.as_str()));
    assert!(!report.passed);
}

#[tokio::test]
async fn test_server_errors_are_retried() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();
    let root = format!("{}/", base);

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/flaky">Flaky</a>"#.to_string()))
        .mount(&mock_server)
        .await;

    Mock::given(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(path("/flaky"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let options = CheckOptions {
        recurse: false,
        retry_errors: true,
        retry_errors_count: 2,
        retry_errors_jitter: 0,
        ..options_for(&root)
    };
    let (events, _) = crawl(&options).await;

    let flaky = find(&events, &format!("{}/flaky", base));
    assert_eq!(flaky.state, LinkState::Ok);
    assert_eq!(flaky.status, Some(200));
}

#[tokio::test]
async fn test_broken_root_stops_the_crawl() {
    let mock_server = MockServer::start().await;
    let root = format!("{}/", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let (events, report) = crawl(&options_for(&root)).await;

    assert_eq!(
        events,
        vec![CrawlEvent::Link(
            LinkResult::new(root, LinkState::Broken).with_status(500)
        )]
    );
    assert!(!report.passed);
}

#[tokio::test]
async fn test_invalid_root_fails_to_start() {
    let options = options_for("not a url");
    assert!(HttpLinkChecker::new().start(&options).is_err());
}

#[tokio::test]
async fn test_rate_limited_link_is_retried_after_delay() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();
    let root = format!("{}/", base);

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/limited">Limited</a>"#.to_string()))
        .mount(&mock_server)
        .await;

    Mock::given(path("/limited"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "1"))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(path("/limited"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let options = CheckOptions {
        recurse: false,
        ..options_for(&root)
    };

    let started = std::time::Instant::now();
    let (events, report) = crawl(&options).await;

    let limited = find(&events, &format!("{}/limited", base));
    assert_eq!(limited.state, LinkState::Ok);
    assert_eq!(limited.status, Some(200));
    assert!(started.elapsed() >= std::time::Duration::from_secs(1));
    assert!(report.passed);
}

#[tokio::test]
async fn test_rate_limited_link_is_broken_without_retry() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();
    let root = format!("{}/", base);

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/limited">Limited</a>"#.to_string()))
        .mount(&mock_server)
        .await;

    Mock::given(path("/limited"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "1"))
        .mount(&mock_server)
        .await;

    let options = CheckOptions {
        recurse: false,
        retry: false,
        ..options_for(&root)
    };
    let (events, _) = crawl(&options).await;

    let limited = find(&events, &format!("{}/limited", base));
    assert_eq!(limited.state, LinkState::Broken);
    assert_eq!(limited.status, Some(429));
}
