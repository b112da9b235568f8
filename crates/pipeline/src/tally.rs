//! In-run vote tallying: rate limiting, grouping by subject, and per-subject
//! deduplication.
//!
//! [`tally_votes`] is pure: votes in, [`Tally`] out. Merging the resulting
//! groups into the registry is [`crate::ledger`]'s job.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::{ClosurePlan, ClosureReason, IssueNumber, ReporterLogin, SubjectKey, Vote, VotePolicy};

/// One counted vote inside a [`VoteGroup`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ballot {
    /// Who cast it.
    pub reporter: ReporterLogin,
    /// The issue it came from.
    pub issue: IssueNumber,
}

/// All accepted votes of one run for one subject, one per reporter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteGroup {
    /// Subject the votes are for.
    pub key: SubjectKey,
    /// Display name from the first vote seen for the subject.
    pub name: String,
    /// Accepted ballots, in the order they were seen.
    pub ballots: Vec<Ballot>,
}

impl VoteGroup {
    fn has_reporter(&self, reporter: &ReporterLogin) -> bool {
        self.ballots.iter().any(|b| &b.reporter == reporter)
    }

    /// Issue numbers of all ballots.
    pub fn issues(&self) -> impl Iterator<Item = IssueNumber> + '_ {
        self.ballots.iter().map(|b| b.issue)
    }
}

/// Result of tallying one run's votes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    /// Per-subject groups, in order of each subject's first vote.
    pub groups: Vec<VoteGroup>,
    /// Duplicate and rate-limited issues.
    pub closures: ClosurePlan,
}

/// Tallies `votes` in the order given.
///
/// Every valid vote counts against its reporter's per-run cap, duplicates
/// included. Once a reporter has cast [`VotePolicy::max_votes_per_run`] votes,
/// each further vote is scheduled as [`ClosureReason::RateLimited`]. A vote
/// from a reporter already present in its subject's group is scheduled as
/// [`ClosureReason::Duplicate`]. Every other vote becomes a [`Ballot`].
pub fn tally_votes(votes: impl IntoIterator<Item = Vote>, policy: &VotePolicy) -> Tally {
    let cap = policy.max_votes_per_run();
    let mut cast: HashMap<ReporterLogin, u32> = HashMap::new();
    let mut index: HashMap<SubjectKey, usize> = HashMap::new();
    let mut tally = Tally::default();

    for vote in votes {
        let count = cast.entry(vote.reporter.clone()).or_insert(0);
        if *count >= cap {
            info!(
                issue = vote.issue.as_u64(),
                reporter = %vote.reporter,
                cap,
                "Reporter exceeded per-run vote cap"
            );
            tally.closures.schedule(vote.issue, ClosureReason::RateLimited);
            continue;
        }
        *count += 1;

        let slot = *index.entry(vote.key.clone()).or_insert_with(|| {
            tally.groups.push(VoteGroup {
                key: vote.key.clone(),
                name: vote.subject_name.clone(),
                ballots: Vec::new(),
            });
            tally.groups.len() - 1
        });
        let group = &mut tally.groups[slot];

        if group.has_reporter(&vote.reporter) {
            info!(
                issue = vote.issue.as_u64(),
                reporter = %vote.reporter,
                subject = %group.key,
                "Duplicate vote"
            );
            tally.closures.schedule(vote.issue, ClosureReason::Duplicate);
            continue;
        }

        debug!(
            issue = vote.issue.as_u64(),
            reporter = %vote.reporter,
            subject = %group.key,
            "Counted vote"
        );
        group.ballots.push(Ballot {
            reporter: vote.reporter,
            issue: vote.issue,
        });
    }

    tally
}

#[cfg(test)]
#[path = "tally_tests.rs"]
mod tests;
