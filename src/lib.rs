//! Broken Links Checker: scans a (usually locally served) website for broken links
//!
//! This crate resolves scan jobs from a configuration file, drives a link
//! checking engine for each job, classifies every reported link and persists
//! a JSON summary that static-site generators can consume as a data file.

pub mod classify;
pub mod cli;
pub mod config;
pub mod engine;
pub mod output;
pub mod runner;

use thiserror::Error;

/// Main error type for checker operations
#[derive(Debug, Error)]
pub enum CheckerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Crawl engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Output error: {0}")]
    Output(#[from] OutputError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No job named '{0}' in configuration")]
    JobNotFound(String),
}

/// Errors raised by a crawl engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Invalid scan root '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: ::url::ParseError,
    },

    #[error("Invalid skip pattern: {0}")]
    InvalidSkipPattern(#[from] regex::Error),

    #[error("Crawl task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Crawl aborted: {0}")]
    Aborted(String),
}

/// Errors raised while persisting a scan summary
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to serialize summary: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type alias for checker operations
pub type Result<T> = std::result::Result<T, CheckerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use classify::{classify, Classification};
pub use config::{CheckOptions, Job, Mode};
pub use engine::{CrawlEvent, CrawlReport, LinkChecker, LinkResult, LinkState};
pub use output::{LinkRecord, ScanSummary};
pub use runner::{JobOutcome, JobRunner};
