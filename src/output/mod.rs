//! Output module for scan summaries and terminal reports
//!
//! This module handles:
//! - The summary data model written for each job
//! - Persisting the summary as a JSON data file
//! - Printing progress and results to the terminal

pub mod report;
mod summary;
mod writer;

pub use summary::{LinkRecord, ScanSummary, RUNTIME_UNIT};
pub use writer::{read_summary_file, SummaryWriter};
