//! Port traits: what the vote domain needs from the outside world.
//!
//! Infrastructure crates implement these traits (`github` for
//! [`IssueTracker`], `registry` for [`RegistryStore`]). The orchestration layer
//! holds them as trait objects, and tests substitute in-memory fakes.

use async_trait::async_trait;

use crate::{IssueNumber, RegistryError, RegistrySnapshot, ReporterLogin, TrackerError};

/// A report-issue as listed by the tracker, before parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportIssue {
    /// Tracker-assigned issue number.
    pub number: IssueNumber,
    /// Issue title.
    pub title: String,
    /// Issue body; `None` when the issue was filed without one.
    pub body: Option<String>,
    /// Authenticated author; `None` for deleted accounts.
    pub author: Option<ReporterLogin>,
}

/// Issue state filter for listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueState {
    /// Open issues only.
    Open,
    /// Closed issues only.
    Closed,
    /// Both open and closed issues.
    All,
}

impl IssueState {
    /// Query-string value understood by the tracker.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::All => "all",
        }
    }
}

/// How a closed issue is resolved, as recorded by the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The report did what it asked for.
    Completed,
    /// The report was discarded.
    NotPlanned,
}

impl Resolution {
    /// Value of the tracker's `state_reason` field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::NotPlanned => "not_planned",
        }
    }
}

/// The ticket source report-issues come from.
///
/// Both calls are single bounded requests with no retry. A failed list aborts
/// the run; a failed close is logged and skipped by the caller.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Returns every issue carrying `label` in `state`, following pagination
    /// until the tracker reports no further pages.
    async fn list_issues(
        &self,
        label: &str,
        state: IssueState,
    ) -> Result<Vec<ReportIssue>, TrackerError>;

    /// Closes one issue.
    async fn close_issue(
        &self,
        issue: IssueNumber,
        resolution: Resolution,
    ) -> Result<(), TrackerError>;
}

/// Durable home of the pending / flagged / stats documents.
///
/// A run loads once before computing anything and persists once at the end.
/// Runs are assumed never to overlap.
#[async_trait]
pub trait RegistryStore: Send + Sync {
    /// Reads all three documents.
    async fn load(&self) -> Result<RegistrySnapshot, RegistryError>;

    /// Replaces all three documents with `snapshot`.
    async fn persist(&self, snapshot: &RegistrySnapshot) -> Result<(), RegistryError>;
}
