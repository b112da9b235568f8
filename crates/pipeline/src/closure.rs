//! Closure scheduling.
//!
//! Every report-issue the run is done with lands in exactly one bucket of a
//! [`ClosurePlan`]. The plan is built by the tally and the ledger and handed
//! to the closer once the registry has been persisted.

use std::collections::BTreeMap;

use crate::{IssueNumber, Resolution};

/// Why a report-issue is being closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ClosureReason {
    /// The issue could not be parsed as a vote.
    Invalid,
    /// The reporter already voted for the same subject in this run.
    Duplicate,
    /// The reporter exceeded the per-run vote cap.
    RateLimited,
    /// The subject was flagged by an earlier run.
    AlreadyFlagged,
    /// The subject was promoted to flagged by this run.
    Promoted,
}

impl ClosureReason {
    /// Every reason, in reporting order.
    pub const ALL: [ClosureReason; 5] = [
        Self::Invalid,
        Self::Duplicate,
        Self::RateLimited,
        Self::AlreadyFlagged,
        Self::Promoted,
    ];

    /// Short machine-readable name used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Invalid => "invalid",
            Self::Duplicate => "duplicate",
            Self::RateLimited => "rate_limited",
            Self::AlreadyFlagged => "already_flagged",
            Self::Promoted => "promoted",
        }
    }

    /// Resolution recorded on the tracker when closing for this reason.
    pub fn resolution(self) -> Resolution {
        match self {
            Self::Promoted => Resolution::Completed,
            _ => Resolution::NotPlanned,
        }
    }
}

impl std::fmt::Display for ClosureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Issues to close, each with exactly one reason.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClosurePlan {
    entries: BTreeMap<IssueNumber, ClosureReason>,
}

impl ClosurePlan {
    /// Creates an empty plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `issue` for closure.
    ///
    /// Returns `false` and keeps the existing reason if the issue is already
    /// scheduled.
    pub fn schedule(&mut self, issue: IssueNumber, reason: ClosureReason) -> bool {
        match self.entries.entry(issue) {
            std::collections::btree_map::Entry::Occupied(existing) => {
                tracing::debug!(
                    issue = issue.as_u64(),
                    kept = %existing.get(),
                    ignored = %reason,
                    "Issue already scheduled for closure"
                );
                false
            }
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(reason);
                true
            }
        }
    }

    /// Merges `other` into this plan; issues already scheduled keep their reason.
    pub fn absorb(&mut self, other: ClosurePlan) {
        for (issue, reason) in other.entries {
            self.schedule(issue, reason);
        }
    }

    /// Reason `issue` is scheduled with, if any.
    pub fn reason(&self, issue: IssueNumber) -> Option<ClosureReason> {
        self.entries.get(&issue).copied()
    }

    /// Number of issues scheduled with `reason`.
    pub fn count(&self, reason: ClosureReason) -> usize {
        self.entries.values().filter(|r| **r == reason).count()
    }

    /// Issues scheduled with `reason`, ascending.
    pub fn issues(&self, reason: ClosureReason) -> Vec<IssueNumber> {
        self.entries
            .iter()
            .filter(|(_, r)| **r == reason)
            .map(|(issue, _)| *issue)
            .collect()
    }

    /// Every scheduled issue with its reason, ascending by issue number.
    pub fn iter(&self) -> impl Iterator<Item = (IssueNumber, ClosureReason)> + '_ {
        self.entries.iter().map(|(issue, reason)| (*issue, *reason))
    }

    /// Total number of scheduled issues.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is scheduled.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
