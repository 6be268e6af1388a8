//! Summary file writer
//!
//! The output file always holds a JSON array with exactly one summary. It is
//! rewritten in full after every link, so an interrupted scan still leaves
//! its latest state behind. In dry-run mode nothing on disk is touched.

use crate::output::summary::ScanSummary;
use crate::OutputError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Writes a job's summary to its output path
#[derive(Debug, Clone)]
pub struct SummaryWriter {
    path: PathBuf,
    dry_run: bool,
}

impl SummaryWriter {
    pub fn new(path: impl Into<PathBuf>, dry_run: bool) -> Self {
        Self {
            path: path.into(),
            dry_run,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the parent directory and removes a stale output file
    pub fn prepare(&self) -> Result<(), OutputError> {
        if self.dry_run {
            tracing::debug!("Dry run, leaving {} untouched", self.path.display());
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
            }
        }

        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!("Removed previous report {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(self.io_error(source)),
        }
    }

    /// Replaces the file content with `[summary]`
    pub fn write(&self, summary: &ScanSummary) -> Result<(), OutputError> {
        if self.dry_run {
            return Ok(());
        }

        let json = serde_json::to_string_pretty(&[summary])?;
        fs::write(&self.path, json).map_err(|source| self.io_error(source))
    }

    fn io_error(&self, source: io::Error) -> OutputError {
        OutputError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

/// Reads back a summary file written by [`SummaryWriter`]
pub fn read_summary_file(path: &Path) -> Result<Vec<ScanSummary>, OutputError> {
    let content = fs::read_to_string(path).map_err(|source| OutputError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(serde_json::from_str(&content)?)
}
