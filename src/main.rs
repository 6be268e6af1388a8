//! Broken Links Checker main entry point
//!
//! This is the command-line interface for the broken links checker.

use anyhow::Context;
use broken_links_checker::cli::{Cli, RunOptions};
use broken_links_checker::config::{load_config, select_jobs};
use broken_links_checker::engine::HttpLinkChecker;
use broken_links_checker::output::report;
use broken_links_checker::JobRunner;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_args();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let options = cli.into_options();

    if let Err(e) = run(&options).await {
        tracing::error!("{:#}", e);
        return Err(e);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so they do not interleave with the report on stdout.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("broken_links_checker=info,warn"),
            1 => EnvFilter::new("broken_links_checker=debug,info"),
            2 => EnvFilter::new("broken_links_checker=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

async fn run(options: &RunOptions) -> anyhow::Result<()> {
    let started = Instant::now();

    let loaded = load_config(options.config.as_deref()).context("Failed to load configuration")?;
    if let Some(hash) = &loaded.hash {
        tracing::info!("Configuration loaded successfully (hash: {})", hash);
    }

    let jobs = select_jobs(loaded.jobs, options.job.as_deref(), options.mode)
        .context("Failed to select jobs")?;

    report::print_header(&loaded.source, jobs.len(), options.dry_run);

    let runner = JobRunner::new(options.dry_run);
    let outcomes = runner
        .run_all(&jobs, &HttpLinkChecker::new())
        .await
        .context("Scan failed")?;

    report::print_footer(outcomes.len(), started.elapsed());

    Ok(())
}
