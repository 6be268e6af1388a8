use crate::config::types::{Job, Mode};
use crate::ConfigError;

/// Applies the command-line job filter and mode override
///
/// # Arguments
///
/// * `jobs` - All resolved jobs, in configuration order
/// * `job_filter` - Only keep the job with this name
/// * `mode_override` - Replace the mode of every kept job
///
/// # Returns
///
/// * `Ok(Vec<Job>)` - The jobs to run
/// * `Err(ConfigError::JobNotFound)` - No job carries the requested name
pub fn select_jobs(
    jobs: Vec<Job>,
    job_filter: Option<&str>,
    mode_override: Option<Mode>,
) -> Result<Vec<Job>, ConfigError> {
    let selected: Vec<Job> = match job_filter {
        Some(name) => {
            let matching: Vec<Job> = jobs.into_iter().filter(|job| job.name == name).collect();
            if matching.is_empty() {
                return Err(ConfigError::JobNotFound(name.to_string()));
            }
            matching
        }
        None => jobs,
    };

    Ok(match mode_override {
        Some(mode) => selected.into_iter().map(|job| job.with_mode(mode)).collect(),
        None => selected,
    })
}
