//! Link classification
//!
//! Decides what happens to every link the engine reports: dropped because it
//! is excluded, dropped because the job's mode ignores it, or kept and counted
//! by its validation state.

use crate::config::{Job, Mode};
use crate::engine::{LinkResult, LinkState};

/// Where a link result ends up in the summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// URL starts with one of the job's special excludes
    DroppedExcluded,
    /// URL is on the wrong side of the scan root for the job's mode
    DroppedMode,
    Ok,
    Broken,
    Skipped,
}

impl Classification {
    pub fn is_dropped(self) -> bool {
        matches!(self, Self::DroppedExcluded | Self::DroppedMode)
    }
}

impl From<LinkState> for Classification {
    fn from(state: LinkState) -> Self {
        match state {
            LinkState::Ok => Self::Ok,
            LinkState::Broken => Self::Broken,
            LinkState::Skipped => Self::Skipped,
        }
    }
}

/// Classifies a link result for `job`
///
/// Exclusion is checked before the mode filter, so an excluded internal link
/// counts as excluded even in `intern` mode. A link is internal when its URL
/// starts with the job's `scan_source`.
pub fn classify(result: &LinkResult, job: &Job) -> Classification {
    let url = result.url.as_str();

    if job
        .special_excludes
        .iter()
        .any(|prefix| url.starts_with(prefix.as_str()))
    {
        return Classification::DroppedExcluded;
    }

    let is_internal = url.starts_with(job.scan_source.as_str());
    match job.mode {
        Mode::Intern if !is_internal => Classification::DroppedMode,
        Mode::Extern if is_internal => Classification::DroppedMode,
        _ => result.state.into(),
    }
}
