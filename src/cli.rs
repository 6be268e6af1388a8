//! Command-line interface
//!
//! [`Cli`] mirrors the flags accepted on the command line. It is turned into
//! an immutable [`RunOptions`] once, and that value is what the rest of the
//! program works with.
//!
//! Unknown flags are dropped one by one before clap sees the arguments, so a
//! stray flag never hides the known flags that follow it.

use crate::config::Mode;
use clap::{ArgAction, CommandFactory, Parser};
use std::collections::HashMap;
use std::path::PathBuf;

/// Broken Links Checker: scans a website and reports broken links
///
/// Jobs are read from `broken-links-checker.config.json` in the working
/// directory (or the file given with --config). Each job crawls its scan
/// source and writes a JSON summary for the site build to pick up.
#[derive(Parser, Debug)]
#[command(name = "broken-links-checker")]
#[command(version)]
#[command(about = "Scans a website for broken links", long_about = None)]
pub struct Cli {
    /// Only run the job with this name
    #[arg(value_name = "JOB")]
    pub job_name: Option<String>,

    /// Mode override (intern, extern or all)
    #[arg(value_name = "MODE")]
    pub mode_name: Option<String>,

    /// Path to the configuration file (JSON or TOML)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Crawl and report, but do not create, modify or delete any file
    #[arg(short, long)]
    pub dry_run: bool,

    /// Only run the job with this name (takes precedence over JOB)
    #[arg(long, value_name = "NAME")]
    pub job: Option<String>,

    /// Mode override (takes precedence over MODE)
    #[arg(long, value_name = "MODE")]
    pub mode: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Flags that were not recognized and have been dropped
    #[arg(skip)]
    pub ignored: Vec<String>,
}

/// Settings for one invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub config: Option<PathBuf>,
    pub dry_run: bool,
    pub job: Option<String>,
    pub mode: Option<Mode>,
}

/// Known flag names, mapped to whether they take a value
struct KnownFlags {
    long: HashMap<String, bool>,
    short: HashMap<char, bool>,
}

impl KnownFlags {
    fn of_cli() -> Self {
        let mut long = HashMap::from([("help".to_string(), false), ("version".to_string(), false)]);
        let mut short = HashMap::from([('h', false), ('V', false)]);

        for arg in Cli::command().get_arguments() {
            if arg.is_positional() {
                continue;
            }
            let takes_value = arg.get_action().takes_values();
            if let Some(name) = arg.get_long() {
                long.insert(name.to_string(), takes_value);
            }
            if let Some(c) = arg.get_short() {
                short.insert(c, takes_value);
            }
        }

        Self { long, short }
    }
}

/// Splits `args` (without the program name) into the arguments clap should
/// parse and the unknown flags that were dropped
fn strip_unknown_flags(args: Vec<String>, known: &KnownFlags) -> (Vec<String>, Vec<String>) {
    let mut kept = Vec::with_capacity(args.len());
    let mut ignored = Vec::new();
    let mut iter = args.into_iter();

    while let Some(arg) = iter.next() {
        if arg == "--" {
            kept.push(arg);
            kept.extend(iter.by_ref());
            break;
        }

        if let Some(flag) = arg.strip_prefix("--") {
            let (name, inline_value) = match flag.split_once('=') {
                Some((name, _)) => (name, true),
                None => (flag, false),
            };
            match known.long.get(name).copied() {
                Some(takes_value) => {
                    kept.push(arg);
                    if takes_value && !inline_value {
                        kept.extend(iter.next());
                    }
                }
                None => ignored.push(arg),
            }
            continue;
        }

        if let Some(cluster) = arg.strip_prefix('-').filter(|c| !c.is_empty()) {
            let mut flags = String::from("-");
            let mut needs_value = false;
            let mut unknown = String::new();

            for (i, c) in cluster.char_indices() {
                match known.short.get(&c).copied() {
                    Some(true) => {
                        flags.push_str(&cluster[i..]);
                        needs_value = i + c.len_utf8() == cluster.len();
                        break;
                    }
                    Some(false) => flags.push(c),
                    None => unknown.push(c),
                }
            }

            if !unknown.is_empty() {
                ignored.push(format!("-{}", unknown));
            }
            if flags.len() > 1 {
                kept.push(flags);
                if needs_value {
                    kept.extend(iter.next());
                }
            }
            continue;
        }

        kept.push(arg);
    }

    (kept, ignored)
}

impl Cli {
    /// Parses the process arguments, exiting on `--help`, `--version` or a
    /// malformed known flag
    pub fn parse_args() -> Self {
        Self::try_parse_lenient(std::env::args()).unwrap_or_else(|e| e.exit())
    }

    /// Parses `args` (program name first), skipping flags that are not known
    pub fn try_parse_lenient<I>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let program = args
            .next()
            .unwrap_or_else(|| "broken-links-checker".to_string());

        let (kept, ignored) = strip_unknown_flags(args.collect(), &KnownFlags::of_cli());

        let mut cli = Self::try_parse_from(std::iter::once(program).chain(kept))?;
        cli.ignored = ignored;
        Ok(cli)
    }

    /// Resolves flags and positionals into the run options
    ///
    /// Dropped flags and an unrecognized mode are reported here. Call this
    /// after logging is set up so the warnings are visible.
    pub fn into_options(self) -> RunOptions {
        for flag in &self.ignored {
            tracing::warn!("Ignoring unknown argument {}", flag);
        }

        let mode = self.mode.or(self.mode_name).and_then(|raw| match raw.parse::<Mode>() {
            Ok(mode) => Some(mode),
            Err(e) => {
                tracing::warn!("Ignoring mode override: {}", e);
                None
            }
        });

        RunOptions {
            config: self.config,
            dry_run: self.dry_run,
            job: self.job.or(self.job_name),
            mode,
        }
    }
}
