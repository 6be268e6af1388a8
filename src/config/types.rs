use crate::config::datefmt::strftime_pattern;
use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Scan root used when no configuration file is present
pub const DEFAULT_SCAN_SOURCE: &str = "http://localhost:1313/";

/// Report path used when a job names neither `write_to` nor `write_to_prefix`
pub const DEFAULT_WRITE_TO: &str = "data/links_checked/external.json";

/// Timestamp format used when a job does not set `date_format`
pub const DEFAULT_DATE_FORMAT: &str = "yyyy-MM-dd HH:mm:ss";

/// Name given to the built-in default job
pub const DEFAULT_JOB_NAME: &str = "default";

/// Prefixes excluded by the built-in default job
pub const DEFAULT_SPECIAL_EXCLUDES: &[&str] =
    &["data:image/", "mailto:", "blog:", "troubleshooting:"];

const DEFAULT_USER_AGENT: &str = "Mozilla/4.0 (compatible; MSIE 6.0; MSIE 5.5; Windows NT 5.1)";

/// Retention policy for discovered links
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Mode {
    /// Keep only links under the scan root
    Intern,
    /// Keep only links outside the scan root
    #[default]
    Extern,
    /// Keep everything that is not explicitly excluded
    All,
}

/// Returned when a mode string is none of `intern`, `extern`, `all`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown mode '{0}', expected one of: intern, extern, all")]
pub struct UnknownMode(pub String);

impl Mode {
    /// Lowercase name, as written to reports and used in derived file names
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Intern => "intern",
            Self::Extern => "extern",
            Self::All => "all",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "intern" => Ok(Self::Intern),
            "extern" => Ok(Self::Extern),
            "all" => Ok(Self::All),
            _ => Err(UnknownMode(s.to_string())),
        }
    }
}

impl TryFrom<String> for Mode {
    type Error = UnknownMode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One skip regex or a list of them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SkipPatterns {
    One(String),
    Many(Vec<String>),
}

impl SkipPatterns {
    /// Non-empty patterns in declaration order
    pub fn patterns(&self) -> Vec<&str> {
        match self {
            Self::One(p) => vec![p.as_str()],
            Self::Many(ps) => ps.iter().map(String::as_str).collect(),
        }
        .into_iter()
        .filter(|p| !p.trim().is_empty())
        .collect()
    }
}

impl Default for SkipPatterns {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

/// Options handed to the crawl engine
///
/// Every option the engine understands has a named field. Keys that are not
/// recognized are kept in `extra` and passed along untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckOptions {
    /// Crawl entry point, always replaced by the job's scan root
    pub path: String,

    /// Maximum number of link checks in flight
    pub concurrency: usize,

    /// Follow internal pages and check their links too
    pub recurse: bool,

    /// Regexes for URLs that are reported as skipped without a request
    pub skip: SkipPatterns,

    pub format: String,

    pub silent: bool,

    pub verbosity: String,

    /// Per-request timeout in milliseconds (0 disables the timeout)
    pub timeout: u64,

    pub directory_listing: bool,

    /// Honour `Retry-After` on HTTP 429
    pub retry: bool,

    /// Retry network errors and 5xx responses
    pub retry_errors: bool,

    pub retry_errors_count: u32,

    /// Upper bound of the delay between retries, in seconds
    pub retry_errors_jitter: u64,

    pub user_agent: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            path: String::new(),
            concurrency: 100,
            recurse: true,
            skip: SkipPatterns::One("www.googleapis.com".to_string()),
            format: "json".to_string(),
            silent: true,
            verbosity: "error".to_string(),
            timeout: 0,
            directory_listing: true,
            retry: true,
            retry_errors: true,
            retry_errors_count: 3,
            retry_errors_jitter: 5,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            extra: Map::new(),
        }
    }
}

/// Per-job `checkOptions` as written in the configuration file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckOptionsOverride {
    pub path: Option<String>,
    pub concurrency: Option<usize>,
    pub recurse: Option<bool>,
    pub skip: Option<SkipPatterns>,
    pub format: Option<String>,
    pub silent: Option<bool>,
    pub verbosity: Option<String>,
    pub timeout: Option<u64>,
    pub directory_listing: Option<bool>,
    pub retry: Option<bool>,
    pub retry_errors: Option<bool>,
    pub retry_errors_count: Option<u32>,
    pub retry_errors_jitter: Option<u64>,
    pub user_agent: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CheckOptions {
    /// Applies every field set in `overrides` on top of `self`
    pub fn merge(mut self, overrides: CheckOptionsOverride) -> Self {
        if let Some(v) = overrides.path {
            self.path = v;
        }
        if let Some(v) = overrides.concurrency {
            self.concurrency = v;
        }
        if let Some(v) = overrides.recurse {
            self.recurse = v;
        }
        if let Some(v) = overrides.skip {
            self.skip = v;
        }
        if let Some(v) = overrides.format {
            self.format = v;
        }
        if let Some(v) = overrides.silent {
            self.silent = v;
        }
        if let Some(v) = overrides.verbosity {
            self.verbosity = v;
        }
        if let Some(v) = overrides.timeout {
            self.timeout = v;
        }
        if let Some(v) = overrides.directory_listing {
            self.directory_listing = v;
        }
        if let Some(v) = overrides.retry {
            self.retry = v;
        }
        if let Some(v) = overrides.retry_errors {
            self.retry_errors = v;
        }
        if let Some(v) = overrides.retry_errors_count {
            self.retry_errors_count = v;
        }
        if let Some(v) = overrides.retry_errors_jitter {
            self.retry_errors_jitter = v;
        }
        if let Some(v) = overrides.user_agent {
            self.user_agent = v;
        }
        self.extra.extend(overrides.extra);
        self
    }
}

/// A job entry exactly as written in the configuration file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobEntry {
    pub name: Option<String>,
    pub scan_source: Option<String>,
    pub write_to: Option<String>,
    pub write_to_prefix: Option<String>,
    pub mode: Option<Mode>,
    pub special_excludes: Option<Vec<String>>,
    #[serde(rename = "checkOptions")]
    pub check_options: Option<CheckOptionsOverride>,
    pub date_format: Option<String>,
}

/// A fully resolved scan job
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub name: String,

    /// Crawl entry point, also the prefix that makes a link internal
    pub scan_source: String,

    /// Path of the JSON report
    pub write_to: String,

    /// Set only when `write_to` was derived from a prefix, so that a mode
    /// override can derive it again
    pub write_to_prefix: Option<String>,

    pub mode: Mode,

    /// Literal URL prefixes that are always dropped
    pub special_excludes: Vec<String>,

    pub check_options: CheckOptions,

    pub date_format: String,
}

impl Default for Job {
    fn default() -> Self {
        Self {
            name: DEFAULT_JOB_NAME.to_string(),
            scan_source: DEFAULT_SCAN_SOURCE.to_string(),
            write_to: DEFAULT_WRITE_TO.to_string(),
            write_to_prefix: None,
            mode: Mode::default(),
            special_excludes: DEFAULT_SPECIAL_EXCLUDES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            check_options: CheckOptions::default(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

impl Job {
    /// Builds a job by laying `entry` over the defaults
    ///
    /// `name` is used when the entry carries no name of its own.
    pub fn from_entry(entry: JobEntry, name: String) -> Self {
        let defaults = Self::default();
        let mode = entry.mode.unwrap_or(defaults.mode);

        let (write_to, write_to_prefix) = match (entry.write_to, entry.write_to_prefix) {
            (Some(write_to), _) => (write_to, None),
            (None, Some(prefix)) => (derive_write_to(&prefix, mode), Some(prefix)),
            (None, None) => (defaults.write_to, None),
        };

        let check_options = match entry.check_options {
            Some(overrides) => defaults.check_options.merge(overrides),
            None => defaults.check_options,
        };

        Self {
            name: entry.name.unwrap_or(name),
            scan_source: entry.scan_source.unwrap_or(defaults.scan_source),
            write_to,
            write_to_prefix,
            mode,
            special_excludes: entry.special_excludes.unwrap_or(defaults.special_excludes),
            check_options,
            date_format: entry.date_format.unwrap_or(defaults.date_format),
        }
    }

    /// Replaces the mode, deriving `write_to` again when it came from a prefix
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        if let Some(prefix) = &self.write_to_prefix {
            self.write_to = derive_write_to(prefix, mode);
        }
        self
    }

    /// Engine options with the entry point set to the scan root
    pub fn crawl_options(&self) -> CheckOptions {
        let mut options = self.check_options.clone();
        options.path = self.scan_source.clone();
        options
    }

    /// Formats `time` with the job's date format
    pub fn format_timestamp<Tz>(&self, time: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        time.format(&strftime_pattern(&self.date_format)).to_string()
    }

    pub fn output_path(&self) -> &Path {
        Path::new(&self.write_to)
    }
}

/// `prefix + mode + ".json"`
pub fn derive_write_to(prefix: &str, mode: Mode) -> String {
    format!("{}{}.json", prefix, mode.as_str())
}
