//! Scripted crawl engine
//!
//! Emits a fixed sequence of events instead of touching the network. Useful
//! for exercising the job runner and for replaying a previously recorded crawl.

use crate::config::CheckOptions;
use crate::engine::{CrawlEvent, CrawlReport, CrawlSession, LinkChecker, LinkResult};
use crate::EngineError;
use std::sync::Mutex;

/// Engine that replays a scripted list of events
#[derive(Debug, Default)]
pub struct ReplayChecker {
    events: Vec<CrawlEvent>,
    failure: Option<String>,
    started_with: Mutex<Vec<CheckOptions>>,
}

impl ReplayChecker {
    pub fn new(events: Vec<CrawlEvent>) -> Self {
        Self {
            events,
            ..Default::default()
        }
    }

    /// Replays `links` as link events, preceded by no page events
    pub fn from_links(links: Vec<LinkResult>) -> Self {
        Self::new(links.into_iter().map(CrawlEvent::Link).collect())
    }

    /// Makes the crawl fail with `message` after all events were emitted
    pub fn failing_with(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Options of every crawl started so far
    pub fn started_with(&self) -> Vec<CheckOptions> {
        self.started_with
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

impl LinkChecker for ReplayChecker {
    fn start(&self, options: &CheckOptions) -> Result<CrawlSession, EngineError> {
        if let Ok(mut calls) = self.started_with.lock() {
            calls.push(options.clone());
        }

        let events = self.events.clone();
        let failure = self.failure.clone();

        Ok(CrawlSession::spawn(move |sender| async move {
            let mut links = Vec::new();

            for event in events {
                match event {
                    CrawlEvent::PageStart(url) => sender.page_start(url).await?,
                    CrawlEvent::Link(result) => {
                        links.push(result.clone());
                        sender.link(result).await?;
                    }
                }
            }

            match failure {
                Some(message) => Err(EngineError::Aborted(message)),
                None => Ok(CrawlReport::from_links(links)),
            }
        }))
    }
}
