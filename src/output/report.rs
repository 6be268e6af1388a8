//! Terminal report
//!
//! Purely presentational: progress and per-job results go to stdout, while
//! diagnostics go through `tracing` to stderr.

use crate::config::{ConfigSource, Job};
use crate::engine::CrawlReport;
use crate::output::summary::ScanSummary;
use console::style;
use std::path::Path;
use std::time::Duration;

/// Prints the banner shown before the first job
pub fn print_header(source: &ConfigSource, job_count: usize, dry_run: bool) {
    println!(
        "{} {}",
        style("Broken Links Checker").bold(),
        style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim()
    );
    println!("  Config: {}", describe_source(source));
    println!("  Jobs:   {}", job_count);
    if dry_run {
        println!("  {}", style("Dry run: no files will be written").yellow());
    }
    println!();
}

pub fn print_job_start(job: &Job) {
    println!(
        "{} {} ({} mode)",
        style("Job").bold(),
        style(&job.name).cyan(),
        job.mode
    );
    println!("  Scanning {}", job.scan_source);
}

pub fn print_page_start(url: &str) {
    println!("  {} {}", style("→").dim(), url);
}

/// Prints the engine's verdict for a job
pub fn print_verdict(report: &CrawlReport, output: &Path) {
    println!("{}", verdict_line(report, output));
}

pub fn print_job_summary(summary: &ScanSummary, output: &Path, dry_run: bool) {
    for line in summary_lines(summary, output, dry_run) {
        println!("{}", line);
    }
    println!();
}

pub fn print_footer(jobs_run: usize, elapsed: Duration) {
    println!(
        "{} {} job(s) in {:.1}s",
        style("Done:").bold(),
        jobs_run,
        elapsed.as_secs_f64()
    );
}

fn describe_source(source: &ConfigSource) -> String {
    match source {
        ConfigSource::File(path) => path.display().to_string(),
        ConfigSource::Defaults => "built-in defaults".to_string(),
    }
}

fn verdict_line(report: &CrawlReport, output: &Path) -> String {
    let verdict = if report.passed {
        style("PASSED").green().bold()
    } else {
        style("FAILED").red().bold()
    };

    format!(
        "  {} {} link(s) checked, {} broken, report: {}",
        verdict,
        report.links.len(),
        report.broken_count(),
        output.display()
    )
}

fn summary_lines(summary: &ScanSummary, output: &Path, dry_run: bool) -> Vec<String> {
    let output = if dry_run {
        format!("{} (dry run, not written)", output.display())
    } else {
        output.display().to_string()
    };

    vec![
        format!("  Runtime: {:.2} {}", summary.runtime, summary.runtime_unit),
        format!(
            "  Found:   {} (total {}, dropped {})",
            summary.found, summary.total, summary.dropped
        ),
        format!(
            "  {} {}  {} {}  {} {}",
            style("OK").green(),
            summary.ok,
            style("BROKEN").red(),
            summary.broken,
            style("SKIPPED").yellow(),
            summary.skipped
        ),
        format!("  Output:  {}", output),
    ]
}
