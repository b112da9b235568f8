//! Registry bookkeeping: merging a run's tally into pending, promoting
//! subjects that reached the threshold, and refreshing the derived stats.
//!
//! All three operations take the snapshot explicitly and report what they did;
//! none of them performs I/O.

use std::collections::{HashMap, HashSet};

use tracing::info;

use crate::{
    ClosurePlan, ClosureReason, IssueNumber, RegistrySnapshot, SubjectEntry, SubjectKey,
    Timestamp, VoteGroup,
};

/// What [`merge_votes`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Reporter votes that were not already on record.
    pub new_votes: u64,
    /// Pending entries created by this merge.
    pub created: Vec<SubjectKey>,
    /// Issues whose subject is already flagged.
    pub closures: ClosurePlan,
}

/// A subject moved from pending to flagged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Promotion {
    /// Display id of the promoted entry.
    pub id: String,
    /// Display name of the promoted entry.
    pub name: String,
    /// Distinct reporters at promotion time.
    pub votes: u32,
    /// Every issue recorded on the entry.
    pub issues: Vec<IssueNumber>,
}

/// Merges tallied groups into the pending registry.
///
/// Existing entries gain the group's reporters and issues (reporters never
/// un-vote); unseen subjects get a new entry stamped `now`. `votes` is
/// recomputed from the reporter set on every pending entry, so re-merging the
/// same still-open issues on a later run changes nothing. Groups for subjects
/// that are already flagged are not merged; their issues are scheduled as
/// [`ClosureReason::AlreadyFlagged`].
///
/// Before merging, fragmented pending entries for one subject are folded
/// together, and pending entries for a flagged subject are folded into it.
pub fn merge_votes(
    snapshot: &mut RegistrySnapshot,
    groups: Vec<VoteGroup>,
    now: Timestamp,
) -> MergeOutcome {
    let mut outcome = MergeOutcome {
        closures: consolidate(snapshot),
        ..MergeOutcome::default()
    };

    let flagged: HashSet<SubjectKey> = snapshot
        .flagged
        .artists
        .iter()
        .flat_map(SubjectEntry::subject_keys)
        .collect();

    let mut index: HashMap<SubjectKey, usize> = HashMap::new();
    for (position, entry) in snapshot.pending.artists.iter().enumerate() {
        for key in entry.subject_keys() {
            index.entry(key).or_insert(position);
        }
    }

    for group in groups {
        if flagged.contains(&group.key) {
            info!(
                subject = %group.key,
                issues = group.ballots.len(),
                "Votes for an already flagged subject"
            );
            for issue in group.issues() {
                outcome.closures.schedule(issue, ClosureReason::AlreadyFlagged);
            }
            continue;
        }

        let position = match index.get(&group.key) {
            Some(position) => *position,
            None => {
                snapshot
                    .pending
                    .artists
                    .push(SubjectEntry::new(&group.key, group.name.clone(), now));
                let position = snapshot.pending.artists.len() - 1;
                index.insert(group.key.clone(), position);
                outcome.created.push(group.key.clone());
                position
            }
        };

        let entry = &mut snapshot.pending.artists[position];
        for ballot in group.ballots {
            if entry.record(ballot.reporter, ballot.issue) {
                outcome.new_votes += 1;
            }
        }
        info!(
            subject = %group.key,
            name = %entry.name,
            votes = entry.votes,
            "Pending subject updated"
        );
    }

    for entry in &mut snapshot.pending.artists {
        entry.recount();
    }

    outcome
}

/// Repairs registry fragments left by older data before any vote is merged.
///
/// A pending entry that answers to a flagged subject is folded into the
/// flagged entry and its recorded issues are scheduled as
/// [`ClosureReason::AlreadyFlagged`]. Pending entries that share a subject key
/// are folded into the earliest of them.
fn consolidate(snapshot: &mut RegistrySnapshot) -> ClosurePlan {
    let mut closures = ClosurePlan::new();
    let mut kept: Vec<SubjectEntry> = Vec::with_capacity(snapshot.pending.artists.len());

    for entry in std::mem::take(&mut snapshot.pending.artists) {
        let flagged = snapshot
            .flagged
            .artists
            .iter_mut()
            .find(|flagged| entry.subject_keys().any(|key| flagged.matches(&key)));
        if let Some(flagged) = flagged {
            info!(
                pending = %entry.id,
                flagged = %flagged.id,
                "Pending entry for an already flagged subject folded into flagged"
            );
            for issue in &entry.issues {
                closures.schedule(*issue, ClosureReason::AlreadyFlagged);
            }
            flagged.absorb(entry);
            continue;
        }

        let earlier = kept
            .iter_mut()
            .find(|earlier| entry.subject_keys().any(|key| earlier.matches(&key)));
        match earlier {
            Some(earlier) => {
                info!(
                    fragment = %entry.id,
                    into = %earlier.id,
                    "Duplicate pending entries folded"
                );
                earlier.absorb(entry);
            }
            None => kept.push(entry),
        }
    }

    snapshot.pending.artists = kept;
    closures
}

/// Moves every pending entry with at least `threshold` distinct reporters to
/// flagged, returning what moved.
///
/// An entry leaves pending the moment it qualifies, so running this again
/// never promotes it twice. If flagged already holds an entry for the same
/// subject, the promoted entry is folded into it rather than appended.
pub fn promote_ready(snapshot: &mut RegistrySnapshot, threshold: u32) -> Vec<Promotion> {
    let (ready, waiting): (Vec<SubjectEntry>, Vec<SubjectEntry>) =
        std::mem::take(&mut snapshot.pending.artists)
            .into_iter()
            .partition(|entry| entry.votes >= threshold);
    snapshot.pending.artists = waiting;

    let mut promotions = Vec::with_capacity(ready.len());
    for entry in ready {
        info!(
            id = %entry.id,
            name = %entry.name,
            votes = entry.votes,
            threshold,
            "Subject promoted to flagged"
        );
        promotions.push(Promotion {
            id: entry.id.clone(),
            name: entry.name.clone(),
            votes: entry.votes,
            issues: entry.issues.iter().copied().collect(),
        });

        let existing = snapshot
            .flagged
            .artists
            .iter_mut()
            .find(|flagged| entry.subject_keys().any(|key| flagged.matches(&key)));
        match existing {
            Some(flagged) => flagged.absorb(entry),
            None => snapshot.flagged.artists.push(entry),
        }
    }
    promotions
}

/// Schedules every issue of every promotion as [`ClosureReason::Promoted`].
pub fn promotion_closures(promotions: &[Promotion]) -> ClosurePlan {
    let mut plan = ClosurePlan::new();
    for promotion in promotions {
        for issue in &promotion.issues {
            plan.schedule(*issue, ClosureReason::Promoted);
        }
    }
    plan
}

/// Recomputes the derived counters and stamps all three documents with `now`.
///
/// `new_votes` is [`MergeOutcome::new_votes`] of the current run.
pub fn refresh_stats(snapshot: &mut RegistrySnapshot, new_votes: u64, now: Timestamp) {
    let pending = snapshot.pending.artists.len();
    let flagged = snapshot.flagged.artists.len();

    snapshot.pending.version = now;
    snapshot.pending.updated = now;

    snapshot.flagged.version = now;
    snapshot.flagged.updated = now;
    snapshot.flagged.total = flagged;

    let stats = &mut snapshot.stats;
    stats.total_artists = pending + flagged;
    stats.flagged_artists = flagged;
    stats.votes_today = new_votes;
    stats.votes_total = stats.votes_total.saturating_add(new_votes);
    stats.last_updated = now;
}

#[cfg(test)]
#[path = "ledger_tests.rs"]
mod tests;
