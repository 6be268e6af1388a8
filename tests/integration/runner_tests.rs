//! End-to-end tests for configuration resolution and job execution
//!
//! Jobs are resolved from configuration documents and run against scripted
//! engines or a wiremock server, writing into temporary directories.

use broken_links_checker::config::{load_config_file, resolve_jobs, select_jobs};
use broken_links_checker::engine::{HttpLinkChecker, ReplayChecker};
use broken_links_checker::output::read_summary_file;
use broken_links_checker::{
    CheckerError, ConfigError, CrawlEvent, JobRunner, LinkResult, LinkState, Mode,
};
use serde_json::json;
use std::fs;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Engine emitting the four links of the reference scenario
fn scenario_engine() -> ReplayChecker {
    ReplayChecker::new(vec![
        CrawlEvent::PageStart("http://x/".to_string()),
        CrawlEvent::Link(LinkResult::new("http://x/a", LinkState::Ok).with_status(200)),
        CrawlEvent::Link(
            LinkResult::new("http://x/b", LinkState::Ok)
                .with_status(200)
                .with_parent("http://x/"),
        ),
        CrawlEvent::Link(LinkResult::new("mailto:c", LinkState::Skipped).with_parent("http://x/")),
        CrawlEvent::Link(
            LinkResult::new("http://y/d", LinkState::Broken)
                .with_status(404)
                .with_parent("http://x/"),
        ),
    ])
}

fn out_path(dir: &TempDir, name: &str) -> String {
    dir.path().join(name).display().to_string()
}

#[tokio::test]
async fn test_extern_scenario() {
    let dir = TempDir::new().unwrap();
    let jobs = resolve_jobs(&json!({
        "jobs": [{
            "scan_source": "http://x/",
            "write_to": out_path(&dir, "out.json"),
            "mode": "extern",
            "special_excludes": ["mailto:"]
        }]
    }))
    .unwrap();

    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].name, "job-1");

    let outcome = JobRunner::new(false)
        .run(&jobs[0], &scenario_engine())
        .await
        .unwrap();
    let summary = &outcome.summary;

    assert_eq!(summary.found, 4);
    assert_eq!(summary.dropped, 2);
    assert_eq!(summary.total, 2);
    assert_eq!(summary.ok, 1);
    assert_eq!(summary.broken, 1);
    assert_eq!(summary.skipped, 0);
    assert!(summary.finished);
    assert_eq!(summary.links_broken[0].url, "http://y/d");
    assert_eq!(summary.links_broken[0].status, Some(404));

    // The engine verdict ignores mode filtering
    assert!(!outcome.report.passed);
    assert_eq!(outcome.report.links.len(), 4);

    let written = read_summary_file(jobs[0].output_path()).unwrap();
    assert_eq!(written, vec![outcome.summary.clone()]);
}

#[tokio::test]
async fn test_dry_run_leaves_filesystem_untouched() {
    let dir = TempDir::new().unwrap();
    let existing = dir.path().join("existing.json");
    fs::write(&existing, "previous report").unwrap();

    let jobs = resolve_jobs(&json!({
        "jobs": [
            { "name": "kept", "scan_source": "http://x/", "write_to": existing.display().to_string() },
            { "name": "nested", "scan_source": "http://x/", "write_to": out_path(&dir, "a/b/out.json") }
        ]
    }))
    .unwrap();

    let outcomes = JobRunner::new(true)
        .run_all(&jobs, &scenario_engine())
        .await
        .unwrap();

    // Crawl and summary still happen
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[1].summary.found, 4);
    assert!(outcomes[1].summary.finished);

    assert_eq!(fs::read_to_string(&existing).unwrap(), "previous report");
    assert!(!dir.path().join("a").exists());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[tokio::test]
async fn test_previous_report_is_replaced() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("reports/site.json");
    fs::create_dir_all(target.parent().unwrap()).unwrap();
    fs::write(&target, "[]").unwrap();

    let jobs = resolve_jobs(&json!({
        "jobs": [{ "scan_source": "http://x/", "write_to": target.display().to_string(), "mode": "all" }]
    }))
    .unwrap();

    JobRunner::new(false)
        .run(&jobs[0], &ReplayChecker::default())
        .await
        .unwrap();

    let written = read_summary_file(&target).unwrap();
    assert_eq!(written.len(), 1);
    assert_eq!(written[0].found, 0);
    assert!(written[0].finished);
}

#[tokio::test]
async fn test_interrupted_crawl_leaves_interim_summary() {
    let dir = TempDir::new().unwrap();
    let jobs = resolve_jobs(&json!({
        "jobs": [{ "scan_source": "http://x/", "write_to": out_path(&dir, "out.json"), "mode": "all" }]
    }))
    .unwrap();

    let engine = ReplayChecker::from_links(vec![
        LinkResult::new("http://x/a", LinkState::Ok),
        LinkResult::new("http://y/b", LinkState::Broken),
        LinkResult::new("tel:123", LinkState::Skipped),
    ])
    .failing_with("connection reset");

    let err = JobRunner::new(false).run(&jobs[0], &engine).await.unwrap_err();
    assert!(matches!(err, CheckerError::Engine(_)));

    let written = read_summary_file(jobs[0].output_path()).unwrap();
    assert_eq!(written.len(), 1);

    let summary = &written[0];
    assert!(!summary.finished);
    assert_eq!(summary.found, 3);
    assert_eq!(summary.ok + summary.broken + summary.skipped, summary.total);
    assert_eq!(summary.dropped + summary.total, summary.found);
    assert_eq!(summary.links_skipped[0].url, "tel:123");
}

#[test]
fn test_named_jobs_derive_output_from_prefix() {
    let jobs = resolve_jobs(&json!({
        "scanJobs": {
            "site": { "scan_source": "http://x/", "write_to_prefix": "out-", "mode": "all" }
        }
    }))
    .unwrap();

    assert_eq!(jobs[0].name, "site");
    assert_eq!(jobs[0].write_to, "out-all.json");

    let overridden = select_jobs(jobs, Some("site"), Some(Mode::Extern)).unwrap();
    assert_eq!(overridden[0].mode, Mode::Extern);
    assert_eq!(overridden[0].write_to, "out-extern.json");
}

#[tokio::test]
async fn test_unknown_job_fails_before_crawling() {
    let jobs = resolve_jobs(&json!({
        "jobs": [
            { "name": "a", "scan_source": "http://a/" },
            { "name": "b", "scan_source": "http://b/" }
        ]
    }))
    .unwrap();

    let engine = scenario_engine();
    let result = select_jobs(jobs, Some("missing-name"), None);
    assert!(matches!(result, Err(ConfigError::JobNotFound(name)) if name == "missing-name"));
    assert!(engine.started_with().is_empty());
}

#[tokio::test]
async fn test_config_file_to_report_against_live_server() {
    let mock_server = MockServer::start().await;
    let root = format!("{}/", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(
                    r#"<a href="/local">Local</a>
                       <a href="http://127.0.0.1:1/external">External</a>
                       <a href="mailto:me@example.com">Mail</a>"#,
                    "text/html",
                ),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/local"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("broken-links-checker.config.json");
    let config = json!({
        "scanJobs": {
            "site": {
                "scan_source": root,
                "write_to_prefix": format!("{}/links-", dir.path().display()),
                "mode": "extern",
                "special_excludes": ["mailto:"],
                "checkOptions": { "concurrency": 2, "retryErrors": false },
                "date_format": "%Y-%m-%d"
            }
        }
    });
    fs::write(&config_path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

    let (jobs, hash) = load_config_file(&config_path).unwrap();
    assert_eq!(hash.len(), 64);

    let jobs = select_jobs(jobs, Some("site"), None).unwrap();
    let outcome = JobRunner::new(false)
        .run(&jobs[0], &HttpLinkChecker::new())
        .await
        .unwrap();

    // Root and /local are internal, mailto is excluded
    let summary = &outcome.summary;
    assert_eq!(summary.found, 4);
    assert_eq!(summary.dropped, 3);
    assert_eq!(summary.broken, 1);
    assert_eq!(summary.links_broken[0].url, "http://127.0.0.1:1/external");
    assert_eq!(summary.links_broken[0].parent.as_deref(), Some(root.as_str()));
    assert_eq!(summary.links_broken[0].scantime.len(), "2024-01-01".len());

    let written = read_summary_file(&dir.path().join("links-extern.json")).unwrap();
    assert_eq!(written, vec![outcome.summary.clone()]);
}
