//! Configuration module for the broken links checker
//!
//! This module loads the JSON (or TOML) configuration file, resolves it into
//! scan jobs, validates them and applies command-line job selection.
//!
//! # Example
//!
//! ```no_run
//! use broken_links_checker::config::{load_config, select_jobs};
//! use std::path::Path;
//!
//! let loaded = load_config(Some(Path::new("broken-links-checker.config.json"))).unwrap();
//! let jobs = select_jobs(loaded.jobs, None, None).unwrap();
//! println!("{} job(s) to run", jobs.len());
//! ```

mod datefmt;
mod parser;
mod selection;
mod types;
mod validation;

// Re-export types
pub use types::{
    derive_write_to, CheckOptions, CheckOptionsOverride, Job, JobEntry, Mode, SkipPatterns,
    UnknownMode, DEFAULT_DATE_FORMAT, DEFAULT_JOB_NAME, DEFAULT_SCAN_SOURCE,
    DEFAULT_SPECIAL_EXCLUDES, DEFAULT_WRITE_TO,
};

// Re-export parser functions
pub use datefmt::{is_valid_date_format, strftime_pattern};
pub use parser::{
    compute_config_hash, load_config, load_config_file, locate_config, parse_document,
    resolve_jobs, ConfigSource, LoadedConfig, DEFAULT_CONFIG_FILE,
};
pub use selection::select_jobs;
pub use validation::validate_jobs;
