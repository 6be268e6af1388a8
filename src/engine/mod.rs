//! Crawl engine abstraction
//!
//! A crawl engine takes a root URL plus options, walks the site, validates
//! every link it discovers and reports each result. The job runner does not
//! care how that happens: it starts a [`CrawlSession`], pulls events from it
//! in order, and finally collects the engine's own [`CrawlReport`].
//!
//! This module contains:
//! - The [`LinkChecker`] trait and the event types it produces
//! - [`HttpLinkChecker`], a reqwest-based crawler
//! - [`ReplayChecker`], which emits a scripted list of events

mod http;
mod parser;
mod replay;

pub use http::{build_http_client, HttpLinkChecker};
pub use parser::extract_links;
pub use replay::ReplayChecker;

use crate::config::CheckOptions;
use crate::EngineError;
use serde::{Deserialize, Serialize};
use std::future::Future;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Number of events buffered between the engine task and the consumer
const EVENT_BUFFER: usize = 256;

/// Validation state of a link, as reported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LinkState {
    Ok,
    Broken,
    Skipped,
}

/// One link checked by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkResult {
    pub url: String,
    pub state: LinkState,

    /// HTTP status, absent when no response was received
    pub status: Option<u16>,

    /// Page that referenced the link, absent for the scan root
    pub parent: Option<String>,
}

impl LinkResult {
    pub fn new(url: impl Into<String>, state: LinkState) -> Self {
        Self {
            url: url.into(),
            state,
            status: None,
            parent: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }
}

/// Event emitted while a crawl is running
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlEvent {
    /// The engine started scanning a page
    PageStart(String),
    /// A link was checked
    Link(LinkResult),
}

/// The engine's verdict once the crawl is complete
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlReport {
    /// True when no checked link is broken
    pub passed: bool,

    /// Every link the engine checked, regardless of any filtering downstream
    pub links: Vec<LinkResult>,
}

impl CrawlReport {
    pub fn from_links(links: Vec<LinkResult>) -> Self {
        let passed = !links.iter().any(|link| link.state == LinkState::Broken);
        Self { passed, links }
    }

    pub fn broken_count(&self) -> usize {
        self.links
            .iter()
            .filter(|link| link.state == LinkState::Broken)
            .count()
    }
}

/// Sending half handed to a running engine
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::Sender<CrawlEvent>,
}

impl EventSender {
    /// Reports that a page is being scanned
    pub async fn page_start(&self, url: impl Into<String>) -> Result<(), EngineError> {
        self.send(CrawlEvent::PageStart(url.into())).await
    }

    /// Reports a checked link
    pub async fn link(&self, result: LinkResult) -> Result<(), EngineError> {
        self.send(CrawlEvent::Link(result)).await
    }

    async fn send(&self, event: CrawlEvent) -> Result<(), EngineError> {
        self.tx
            .send(event)
            .await
            .map_err(|_| EngineError::Aborted("event consumer went away".to_string()))
    }
}

/// A running crawl
///
/// Events are delivered in the order the engine produced them. The sequence is
/// finite and cannot be restarted; once [`next_event`](Self::next_event)
/// returns `None`, call [`finish`](Self::finish) for the engine's report.
pub struct CrawlSession {
    events: mpsc::Receiver<CrawlEvent>,
    task: JoinHandle<Result<CrawlReport, EngineError>>,
}

impl CrawlSession {
    /// Runs `engine` on a tokio task and returns the session reading its events
    pub fn spawn<F, Fut>(engine: F) -> Self
    where
        F: FnOnce(EventSender) -> Fut,
        Fut: Future<Output = Result<CrawlReport, EngineError>> + Send + 'static,
    {
        let (tx, events) = mpsc::channel(EVENT_BUFFER);
        let task = tokio::spawn(engine(EventSender { tx }));
        Self { events, task }
    }

    /// Next event, or `None` once the engine is done emitting
    pub async fn next_event(&mut self) -> Option<CrawlEvent> {
        self.events.recv().await
    }

    /// Waits for the engine to complete and returns its report
    pub async fn finish(self) -> Result<CrawlReport, EngineError> {
        drop(self.events);
        self.task.await?
    }
}

/// A crawling and link validation engine
pub trait LinkChecker: Send + Sync {
    /// Starts a crawl at `options.path`
    fn start(&self, options: &CheckOptions) -> Result<CrawlSession, EngineError>;
}
