use crate::config::types::{Job, JobEntry};
use crate::config::validation::validate_jobs;
use crate::{ConfigError, ConfigResult};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Configuration file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "broken-links-checker.config.json";

/// Where the resolved jobs came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Loaded from this file
    File(PathBuf),
    /// No file found, built-in default job
    Defaults,
}

/// Result of loading the configuration
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub source: ConfigSource,

    /// Hex-encoded SHA-256 of the file content, if a file was read
    pub hash: Option<String>,

    pub jobs: Vec<Job>,
}

/// Picks the configuration file to load
///
/// An explicit path always wins, even if it does not exist (loading it will
/// then fail). Otherwise `DEFAULT_CONFIG_FILE` inside `dir` is used when present.
pub fn locate_config(explicit: Option<&Path>, dir: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let candidate = dir.join(DEFAULT_CONFIG_FILE);
    candidate.is_file().then_some(candidate)
}

/// Loads, resolves and validates the scan jobs
///
/// # Arguments
///
/// * `explicit` - Path given with `--config`, if any
///
/// # Returns
///
/// * `Ok(LoadedConfig)` - Jobs from the file, or the default job when no file exists
/// * `Err(ConfigError)` - The file could not be read, parsed or validated
pub fn load_config(explicit: Option<&Path>) -> ConfigResult<LoadedConfig> {
    let cwd = std::env::current_dir().map_err(|source| ConfigError::Io {
        path: ".".to_string(),
        source,
    })?;

    match locate_config(explicit, &cwd) {
        Some(path) => {
            let (jobs, hash) = load_config_file(&path)?;
            Ok(LoadedConfig {
                source: ConfigSource::File(path),
                hash: Some(hash),
                jobs,
            })
        }
        None => {
            tracing::warn!(
                "No {} found, using the default configuration",
                DEFAULT_CONFIG_FILE
            );
            Ok(LoadedConfig {
                source: ConfigSource::Defaults,
                hash: None,
                jobs: vec![Job::default()],
            })
        }
    }
}

/// Loads a configuration file and returns its jobs together with the content hash
pub fn load_config_file(path: &Path) -> ConfigResult<(Vec<Job>, String)> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let document = parse_document(&content, path)?;
    let jobs = resolve_jobs(&document)?;
    validate_jobs(&jobs)?;

    Ok((jobs, compute_config_hash(&content)))
}

/// Parses configuration text into a generic document
///
/// Files with a `.toml` extension are read as TOML, everything else as JSON.
pub fn parse_document(content: &str, path: &Path) -> ConfigResult<Value> {
    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    if is_toml {
        Ok(toml::from_str::<Value>(content)?)
    } else {
        Ok(serde_json::from_str::<Value>(content)?)
    }
}

/// Computes a SHA-256 hash of the configuration content
pub fn compute_config_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Turns a configuration document into jobs
///
/// Two shapes are recognized:
///
/// - `{"jobs": [...]}`: entries are laid over the defaults, unnamed entries
///   become `job-<n>` (1-based)
/// - `{"scanJobs": {"name": {...}}}`: each entry is named by its key, in file order
///
/// A document matching neither shape (or with an empty list/map) yields the
/// default job and a warning. Malformed entries are errors.
pub fn resolve_jobs(document: &Value) -> ConfigResult<Vec<Job>> {
    if let Some(Value::Array(entries)) = document.get("jobs") {
        if !entries.is_empty() {
            return entries
                .iter()
                .enumerate()
                .map(|(index, raw)| -> ConfigResult<Job> {
                    let entry: JobEntry = serde_json::from_value(raw.clone())?;
                    Ok(Job::from_entry(entry, format!("job-{}", index + 1)))
                })
                .collect();
        }
    }

    if let Some(Value::Object(entries)) = document.get("scanJobs") {
        if !entries.is_empty() {
            return entries
                .iter()
                .map(|(name, raw)| -> ConfigResult<Job> {
                    let mut entry: JobEntry = serde_json::from_value(raw.clone())?;
                    entry.name = Some(name.clone());
                    Ok(Job::from_entry(entry, name.clone()))
                })
                .collect();
        }
    }

    tracing::warn!("Configuration has no usable 'jobs' or 'scanJobs' entries, using the default job");
    Ok(vec![Job::default()])
}
