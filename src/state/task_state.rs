//! Crawl task state definitions
//!
//! A task is one unique detail page discovered by the search phase.
use crate::HarvestError;
use std::fmt;
use url::Url;

/// Represents the current state of a crawl task
///
/// ```text
/// Pending -> Fetching -> Parsed -> Emitted
///                   \-> Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    /// Discovered and merged, not yet requested
    Pending,

    /// Detail page request is in flight
    Fetching,

    /// Page fetched and extracted into a record
    Parsed,

    /// Record handed to the output sink
    Emitted,

    /// Fetch failed; aborts the whole run
    Failed,
}

impl TaskState {
    /// Returns true if no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Emitted | Self::Failed)
    }

    /// Returns true if `next` is a legal successor of this state
    pub fn can_transition_to(&self, next: TaskState) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Fetching)
                | (Self::Fetching, Self::Parsed)
                | (Self::Fetching, Self::Failed)
                | (Self::Parsed, Self::Emitted)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fetching => "fetching",
            Self::Parsed => "parsed",
            Self::Emitted => "emitted",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unique detail page to crawl
#[derive(Debug, Clone)]
pub struct CrawlTask {
    /// Title reported by the (last) search result pointing here
    pub title: String,

    /// Absolute detail page URL
    pub url: Url,

    state: TaskState,
}

impl CrawlTask {
    pub fn new(title: String, url: Url) -> Self {
        Self {
            title,
            url,
            state: TaskState::Pending,
        }
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Moves the task to `next`, rejecting transitions the lifecycle forbids
    pub fn advance(&mut self, next: TaskState) -> Result<(), HarvestError> {
        if !self.state.can_transition_to(next) {
            return Err(HarvestError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        tracing::trace!("{} {} -> {}", self.url, self.state, next);
        if next.is_terminal() {
            tracing::debug!("Task '{}' finished as {}", self.title, next);
        }
        self.state = next;
        Ok(())
    }
}
