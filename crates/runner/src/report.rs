//! Outcome of a vote run, returned to the caller for logging and exit status.

use pipeline::{ClosurePlan, ClosureReason, IssueNumber, Promotion, RunId, TrackerError};

/// A close request the tracker did not honour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseFailure {
    /// Issue that is still open.
    pub issue: IssueNumber,
    /// Bucket the issue was scheduled in.
    pub reason: ClosureReason,
    /// Tracker response.
    pub error: TrackerError,
}

/// Outcome of the closing phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloseSummary {
    /// Issues closed successfully.
    pub closed: usize,
    /// Issues left open, in issue order.
    pub failures: Vec<CloseFailure>,
}

/// What one run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Identifier recorded on the run's tracing span.
    pub run_id: RunId,
    /// Open report-issues listed by the tracker.
    pub issues_seen: usize,
    /// Issues that parsed as votes.
    pub votes_parsed: usize,
    /// Reporter votes newly recorded in the registry.
    pub votes_recorded: u64,
    /// Subjects that entered pending for the first time.
    pub subjects_created: usize,
    /// Subjects moved to flagged by this run.
    pub promotions: Vec<Promotion>,
    /// Every issue scheduled for closing, with its reason.
    pub closures: ClosurePlan,
    /// What the closing phase achieved.
    pub close: CloseSummary,
    /// `false` when there was nothing to process and the registry was not touched.
    pub registry_written: bool,
}

impl RunReport {
    pub(crate) fn idle(run_id: RunId) -> Self {
        Self {
            run_id,
            issues_seen: 0,
            votes_parsed: 0,
            votes_recorded: 0,
            subjects_created: 0,
            promotions: Vec::new(),
            closures: ClosurePlan::new(),
            close: CloseSummary::default(),
            registry_written: false,
        }
    }

    /// Number of issues scheduled for closing with `reason`.
    pub fn closed_as(&self, reason: ClosureReason) -> usize {
        self.closures.count(reason)
    }
}
