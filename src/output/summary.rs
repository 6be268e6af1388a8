//! Scan summary data model
//!
//! A [`ScanSummary`] is created when a job starts, updated for every link the
//! engine reports and serialized as the job's output file.

use crate::classify::Classification;
use crate::config::{Job, Mode};
use crate::engine::{LinkResult, LinkState};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Unit of [`ScanSummary::runtime`]
pub const RUNTIME_UNIT: &str = "min";

/// One retained link in the summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub url: String,
    pub state: LinkState,
    pub status: Option<u16>,

    /// When the result was received, formatted with the job's date format
    pub scantime: String,

    pub parent: Option<String>,
}

impl LinkRecord {
    pub fn from_result(result: LinkResult, scantime: String) -> Self {
        Self {
            url: result.url,
            state: result.state,
            status: result.status,
            scantime,
            parent: result.parent,
        }
    }
}

/// Aggregated result of one job execution
///
/// At every point `found == dropped + total` and
/// `total == ok + broken + skipped`, and each list holds as many records as
/// its counter says.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub scan_source: String,
    pub mode: Mode,
    pub special_excludes: Vec<String>,

    /// Job start time, formatted with the job's date format
    pub lastrun: String,

    /// Elapsed time in [`RUNTIME_UNIT`]
    pub runtime: f64,
    pub runtime_unit: String,

    pub found: u64,
    pub dropped: u64,
    pub finished: bool,
    pub total: u64,
    pub ok: u64,
    pub broken: u64,
    pub skipped: u64,

    pub links_ok: Vec<LinkRecord>,
    pub links_broken: Vec<LinkRecord>,
    pub links_skipped: Vec<LinkRecord>,
}

impl ScanSummary {
    /// Empty summary for `job`, started at `lastrun`
    pub fn new(job: &Job, lastrun: String) -> Self {
        Self {
            scan_source: job.scan_source.clone(),
            mode: job.mode,
            special_excludes: job.special_excludes.clone(),
            lastrun,
            runtime: 0.0,
            runtime_unit: RUNTIME_UNIT.to_string(),
            found: 0,
            dropped: 0,
            finished: false,
            total: 0,
            ok: 0,
            broken: 0,
            skipped: 0,
            links_ok: Vec::new(),
            links_broken: Vec::new(),
            links_skipped: Vec::new(),
        }
    }

    /// Counts a classified link
    pub fn record(&mut self, record: LinkRecord, classification: Classification) {
        self.found += 1;

        match classification {
            Classification::DroppedExcluded | Classification::DroppedMode => {
                self.dropped += 1;
            }
            Classification::Ok => {
                self.total += 1;
                self.ok += 1;
                self.links_ok.push(record);
            }
            Classification::Broken => {
                self.total += 1;
                self.broken += 1;
                self.links_broken.push(record);
            }
            Classification::Skipped => {
                self.total += 1;
                self.skipped += 1;
                self.links_skipped.push(record);
            }
        }
    }

    pub fn set_runtime(&mut self, elapsed: Duration) {
        self.runtime = elapsed.as_secs_f64() / 60.0;
    }

    /// Marks the crawl as complete with its final runtime
    pub fn finish(&mut self, elapsed: Duration) {
        self.set_runtime(elapsed);
        self.finished = true;
    }

    /// Checks the counter invariants
    pub fn is_consistent(&self) -> bool {
        self.found == self.dropped + self.total
            && self.total == self.ok + self.broken + self.skipped
            && self.links_ok.len() as u64 == self.ok
            && self.links_broken.len() as u64 == self.broken
            && self.links_skipped.len() as u64 == self.skipped
    }
}
