use crate::config::datefmt::is_valid_date_format;
use crate::config::types::Job;
use crate::ConfigError;
use regex::Regex;
use std::collections::HashSet;
use url::Url;

/// Validates every resolved job
pub fn validate_jobs(jobs: &[Job]) -> Result<(), ConfigError> {
    let mut names = HashSet::new();

    for job in jobs {
        if !names.insert(job.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "Job name '{}' is used more than once",
                job.name
            )));
        }

        validate_job(job)?;
    }

    Ok(())
}

/// Validates a single job
fn validate_job(job: &Job) -> Result<(), ConfigError> {
    if job.name.trim().is_empty() {
        return Err(ConfigError::Validation("Job name cannot be empty".to_string()));
    }

    let url = Url::parse(&job.scan_source).map_err(|e| {
        ConfigError::Validation(format!(
            "Job '{}': invalid scan_source '{}': {}",
            job.name, job.scan_source, e
        ))
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "Job '{}': scan_source '{}' must use http or https",
            job.name, job.scan_source
        )));
    }

    if job.write_to.trim().is_empty() {
        return Err(ConfigError::Validation(format!(
            "Job '{}': write_to cannot be empty",
            job.name
        )));
    }

    if job.check_options.concurrency < 1 {
        return Err(ConfigError::Validation(format!(
            "Job '{}': concurrency must be >= 1, got {}",
            job.name, job.check_options.concurrency
        )));
    }

    if !is_valid_date_format(&job.date_format) {
        return Err(ConfigError::Validation(format!(
            "Job '{}': invalid date_format '{}'",
            job.name, job.date_format
        )));
    }

    for pattern in job.check_options.skip.patterns() {
        Regex::new(pattern).map_err(|e| {
            ConfigError::Validation(format!(
                "Job '{}': invalid skip pattern '{}': {}",
                job.name, pattern, e
            ))
        })?;
    }

    Ok(())
}
