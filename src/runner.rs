//! Job runner
//!
//! Drives the crawl engine for one job at a time. Every link the engine
//! reports is classified, counted into the job's [`ScanSummary`] and the
//! summary file is rewritten straight away.

use crate::classify::classify;
use crate::config::Job;
use crate::engine::{CrawlEvent, CrawlReport, LinkChecker};
use crate::output::{report, LinkRecord, ScanSummary, SummaryWriter};
use crate::Result;
use chrono::Local;
use std::time::Instant;

/// Result of running one job
#[derive(Debug, Clone)]
pub struct JobOutcome {
    /// Summary as last written
    pub summary: ScanSummary,

    /// The engine's own verdict, independent of mode filtering
    pub report: CrawlReport,
}

/// Runs jobs against a crawl engine
#[derive(Debug, Clone, Copy, Default)]
pub struct JobRunner {
    dry_run: bool,
}

impl JobRunner {
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    /// Runs a single job to completion
    ///
    /// # Arguments
    ///
    /// * `job` - The job to run
    /// * `checker` - Engine performing the crawl
    ///
    /// # Returns
    ///
    /// * `Ok(JobOutcome)` - Final summary and engine report
    /// * `Err(CheckerError)` - The engine failed or the summary could not be written
    pub async fn run(&self, job: &Job, checker: &dyn LinkChecker) -> Result<JobOutcome> {
        let writer = SummaryWriter::new(job.output_path(), self.dry_run);
        writer.prepare()?;

        let started = Instant::now();
        let mut summary = ScanSummary::new(job, job.format_timestamp(&Local::now()));

        tracing::info!(
            "Starting job '{}' at {} ({} mode)",
            job.name,
            job.scan_source,
            job.mode
        );
        report::print_job_start(job);

        let mut session = checker.start(&job.crawl_options())?;

        while let Some(event) = session.next_event().await {
            match event {
                CrawlEvent::PageStart(url) => {
                    tracing::info!("Scanning page {}", url);
                    report::print_page_start(&url);
                }
                CrawlEvent::Link(result) => {
                    let classification = classify(&result, job);
                    tracing::debug!("{} -> {:?}", result.url, classification);

                    let scantime = job.format_timestamp(&Local::now());
                    summary.record(LinkRecord::from_result(result, scantime), classification);
                    summary.set_runtime(started.elapsed());
                    writer.write(&summary)?;
                }
            }
        }

        let crawl_report = session.finish().await?;

        summary.finish(started.elapsed());
        writer.write(&summary)?;

        tracing::info!(
            "Job '{}' finished: {} link(s) checked by the engine, {} broken",
            job.name,
            crawl_report.links.len(),
            crawl_report.broken_count()
        );
        report::print_verdict(&crawl_report, writer.path());
        report::print_job_summary(&summary, writer.path(), self.dry_run);

        Ok(JobOutcome {
            summary,
            report: crawl_report,
        })
    }

    /// Runs jobs one after another, stopping at the first failure
    pub async fn run_all(
        &self,
        jobs: &[Job],
        checker: &dyn LinkChecker,
    ) -> Result<Vec<JobOutcome>> {
        let mut outcomes = Vec::with_capacity(jobs.len());
        for job in jobs {
            outcomes.push(self.run(job, checker).await?);
        }
        Ok(outcomes)
    }
}
