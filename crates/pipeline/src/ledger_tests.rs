use chrono::{TimeZone, Utc};

use super::*;
use crate::{tally_votes, ReporterLogin, Vote, VotePolicy};

fn at(day: u32) -> Timestamp {
    Timestamp::from_utc(Utc.with_ymd_and_hms(2025, 10, day, 12, 0, 0).unwrap())
}

fn vote(issue: u64, reporter: &str, id: &str) -> Vote {
    Vote {
        subject_name: format!("Artist {id}"),
        key: SubjectKey::from_raw("spotify", id).unwrap(),
        reporter: ReporterLogin::new(reporter).unwrap(),
        issue: IssueNumber::new(issue),
    }
}

fn groups(votes: Vec<Vote>) -> Vec<VoteGroup> {
    tally_votes(votes, &VotePolicy::default()).groups
}

fn key(id: &str) -> SubjectKey {
    SubjectKey::from_raw("spotify", id).unwrap()
}

/// Votes from `reporter-<from>` .. `reporter-<to>` for `id`, issue number = reporter index.
fn votes_from(range: std::ops::RangeInclusive<u64>, id: &str) -> Vec<Vote> {
    range
        .map(|n| vote(n, &format!("reporter-{n}"), id))
        .collect()
}

#[test]
fn test_new_subject_creates_pending_entry() {
    let mut snapshot = RegistrySnapshot::empty(at(1));

    let outcome = merge_votes(&mut snapshot, groups(votes_from(1..=2, "X")), at(2));

    let entry = snapshot.find_pending(&key("X")).unwrap();
    assert_eq!(entry.id, "spotify:X");
    assert_eq!(entry.name, "Artist X");
    assert_eq!(entry.votes, 2);
    assert_eq!(entry.added, at(2));
    assert_eq!(entry.platforms.get("spotify").map(String::as_str), Some("X"));
    assert_eq!(outcome.new_votes, 2);
    assert_eq!(outcome.created, vec![key("X")]);
}

#[test]
fn test_scenario_a_votes_accumulate_across_runs() {
    let mut snapshot = RegistrySnapshot::empty(at(1));

    merge_votes(&mut snapshot, groups(votes_from(1..=5, "X")), at(1));
    assert!(promote_ready(&mut snapshot, 10).is_empty());

    // Run two re-observes the five still-open issues plus four new ones.
    merge_votes(&mut snapshot, groups(votes_from(1..=9, "X")), at(2));
    assert!(promote_ready(&mut snapshot, 10).is_empty());

    let entry = snapshot.find_pending(&key("X")).unwrap();
    assert_eq!(entry.votes, 9);
    assert_eq!(entry.reporters.len(), 9);
    assert_eq!(entry.added, at(1));
    assert!(snapshot.find_flagged(&key("X")).is_none());
}

#[test]
fn test_scenario_b_tenth_reporter_promotes() {
    let mut snapshot = RegistrySnapshot::empty(at(1));
    merge_votes(&mut snapshot, groups(votes_from(1..=9, "X")), at(1));

    merge_votes(&mut snapshot, groups(votes_from(1..=10, "X")), at(2));
    let promotions = promote_ready(&mut snapshot, 10);

    assert_eq!(promotions.len(), 1);
    assert_eq!(promotions[0].votes, 10);
    assert_eq!(
        promotions[0].issues,
        (1..=10).map(IssueNumber::new).collect::<Vec<_>>()
    );
    assert!(snapshot.find_pending(&key("X")).is_none());
    assert_eq!(snapshot.find_flagged(&key("X")).unwrap().votes, 10);

    let plan = promotion_closures(&promotions);
    assert_eq!(plan.count(ClosureReason::Promoted), 10);
}

#[test]
fn test_burst_above_threshold_promotes_once() {
    let mut snapshot = RegistrySnapshot::empty(at(1));
    merge_votes(&mut snapshot, groups(votes_from(1..=15, "X")), at(1));

    assert_eq!(promote_ready(&mut snapshot, 10).len(), 1);
    assert!(promote_ready(&mut snapshot, 10).is_empty());
    assert_eq!(snapshot.flagged.artists.len(), 1);
    assert_eq!(snapshot.flagged.artists[0].votes, 15);
}

#[test]
fn test_remerging_same_issues_is_idempotent() {
    let mut snapshot = RegistrySnapshot::empty(at(1));
    merge_votes(&mut snapshot, groups(votes_from(1..=3, "X")), at(1));
    let before = snapshot.pending.clone();

    let outcome = merge_votes(&mut snapshot, groups(votes_from(1..=3, "X")), at(2));

    assert_eq!(outcome.new_votes, 0);
    assert!(outcome.created.is_empty());
    assert_eq!(snapshot.pending, before);
}

#[test]
fn test_votes_for_flagged_subject_are_closed_not_merged() {
    let mut snapshot = RegistrySnapshot::empty(at(1));
    merge_votes(&mut snapshot, groups(votes_from(1..=10, "X")), at(1));
    promote_ready(&mut snapshot, 10);

    let outcome = merge_votes(&mut snapshot, groups(vec![vote(11, "late", "X")]), at(2));

    assert!(snapshot.find_pending(&key("X")).is_none());
    assert_eq!(
        outcome.closures.reason(IssueNumber::new(11)),
        Some(ClosureReason::AlreadyFlagged)
    );
    assert_eq!(outcome.new_votes, 0);
    assert_eq!(snapshot.find_flagged(&key("X")).unwrap().votes, 10);
}

#[test]
fn test_legacy_prefixed_platform_id_is_matched() {
    let mut snapshot = RegistrySnapshot::empty(at(1));
    let mut legacy = SubjectEntry::new(&key("X"), "Legacy", at(1));
    legacy.id = "test1".to_string();
    legacy
        .platforms
        .insert("spotify".to_string(), "spotify:X".to_string());
    legacy.record(ReporterLogin::new("old").unwrap(), IssueNumber::new(100));
    snapshot.pending.artists.push(legacy);

    merge_votes(&mut snapshot, groups(vec![vote(1, "alice", "X")]), at(2));

    assert_eq!(snapshot.pending.artists.len(), 1);
    assert_eq!(snapshot.pending.artists[0].votes, 2);
    assert_eq!(snapshot.pending.artists[0].name, "Legacy");
}

#[test]
fn test_merge_restores_vote_count_invariant() {
    let mut snapshot = RegistrySnapshot::empty(at(1));
    let mut entry = SubjectEntry::new(&key("Y"), "Y", at(1));
    entry.record(ReporterLogin::new("a").unwrap(), IssueNumber::new(1));
    entry.votes = 7;
    snapshot.pending.artists.push(entry);

    merge_votes(&mut snapshot, Vec::new(), at(2));

    assert_eq!(snapshot.pending.artists[0].votes, 1);
}

#[test]
fn test_promotion_folds_into_existing_flagged_entry() {
    let mut snapshot = RegistrySnapshot::empty(at(1));
    let mut flagged = SubjectEntry::new(&key("X"), "X", at(1));
    flagged.record(ReporterLogin::new("early").unwrap(), IssueNumber::new(50));
    snapshot.flagged.artists.push(flagged);
    let mut pending = SubjectEntry::new(&key("X"), "X", at(2));
    for n in 1..=3 {
        pending.record(ReporterLogin::new(format!("r{n}")).unwrap(), IssueNumber::new(n));
    }
    snapshot.pending.artists.push(pending);

    let promotions = promote_ready(&mut snapshot, 3);

    assert_eq!(promotions.len(), 1);
    assert_eq!(snapshot.flagged.artists.len(), 1);
    assert_eq!(snapshot.flagged.artists[0].votes, 4);
    assert_eq!(snapshot.flagged.artists[0].added, at(1));
}

#[test]
fn test_refresh_stats_counts_registries_and_new_votes() {
    let mut snapshot = RegistrySnapshot::empty(at(1));
    snapshot.stats.votes_total = 18;
    merge_votes(&mut snapshot, groups(votes_from(1..=10, "X")), at(2));
    let outcome = merge_votes(&mut snapshot, groups(votes_from(11..=12, "Y")), at(2));
    promote_ready(&mut snapshot, 10);

    refresh_stats(&mut snapshot, 12, at(2));

    assert_eq!(outcome.new_votes, 2);
    assert_eq!(snapshot.stats.total_artists, 2);
    assert_eq!(snapshot.stats.flagged_artists, 1);
    assert_eq!(snapshot.stats.votes_today, 12);
    assert_eq!(snapshot.stats.votes_total, 30);
    assert_eq!(snapshot.stats.last_updated, at(2));
    assert_eq!(snapshot.flagged.total, 1);
    assert_eq!(snapshot.pending.version, at(2));
}

#[test]
fn test_subject_is_never_in_both_registries() {
    let mut snapshot = RegistrySnapshot::empty(at(1));
    merge_votes(&mut snapshot, groups(votes_from(1..=10, "X")), at(1));
    merge_votes(&mut snapshot, groups(votes_from(1..=4, "Y")), at(1));
    promote_ready(&mut snapshot, 10);
    merge_votes(&mut snapshot, groups(votes_from(20..=30, "X")), at(2));
    promote_ready(&mut snapshot, 10);

    for entry in &snapshot.pending.artists {
        for key in entry.subject_keys() {
            assert!(snapshot.find_flagged(&key).is_none(), "{key} in both registries");
        }
    }
}

fn fragment(raw_id: &str, reporters: std::ops::RangeInclusive<u64>) -> SubjectEntry {
    let mut entry = SubjectEntry::new(&key("X"), "Artist X", at(1));
    entry.id = format!("spotify:{raw_id}");
    entry
        .platforms
        .insert("spotify".to_string(), raw_id.to_string());
    for n in reporters {
        entry.record(
            ReporterLogin::new(format!("reporter-{n}")).unwrap(),
            IssueNumber::new(n),
        );
    }
    entry
}

#[test]
fn test_split_pending_entries_are_folded_and_promoted() {
    let mut snapshot = RegistrySnapshot::empty(at(1));
    snapshot.pending.artists.push(fragment("spotify:X", 1..=5));
    snapshot.pending.artists.push(fragment("X", 6..=9));

    let outcome = merge_votes(&mut snapshot, groups(votes_from(10..=10, "X")), at(2));
    let promotions = promote_ready(&mut snapshot, 10);

    assert_eq!(outcome.new_votes, 1);
    assert!(outcome.created.is_empty());
    assert_eq!(promotions.len(), 1);
    assert_eq!(promotions[0].votes, 10);
    assert_eq!(
        promotions[0].issues,
        (1..=10).map(IssueNumber::new).collect::<Vec<_>>()
    );
    assert!(snapshot.pending.artists.is_empty());
    assert_eq!(snapshot.flagged.artists.len(), 1);
}

#[test]
fn test_split_pending_entries_are_folded_without_new_votes() {
    let mut snapshot = RegistrySnapshot::empty(at(1));
    snapshot.pending.artists.push(fragment("spotify:X", 1..=3));
    snapshot.pending.artists.push(fragment("artist:X", 2..=4));

    merge_votes(&mut snapshot, Vec::new(), at(2));

    assert_eq!(snapshot.pending.artists.len(), 1);
    assert_eq!(snapshot.pending.artists[0].votes, 4);
    assert_eq!(snapshot.pending.artists[0].id, "spotify:spotify:X");
}

#[test]
fn test_pending_entry_for_flagged_subject_is_folded_into_flagged() {
    let mut snapshot = RegistrySnapshot::empty(at(1));
    snapshot.flagged.artists.push(fragment("X", 1..=10));
    snapshot.pending.artists.push(fragment("spotify:X", 11..=12));

    let outcome = merge_votes(&mut snapshot, groups(vec![vote(13, "late", "X")]), at(2));
    promote_ready(&mut snapshot, 10);

    assert!(snapshot.find_pending(&key("X")).is_none());
    assert_eq!(snapshot.flagged.artists.len(), 1);
    assert_eq!(snapshot.flagged.artists[0].votes, 12);
    for issue in 11..=13 {
        assert_eq!(
            outcome.closures.reason(IssueNumber::new(issue)),
            Some(ClosureReason::AlreadyFlagged)
        );
    }
    assert_eq!(outcome.new_votes, 0);
}
