//! The classification registry: pending subjects, flagged subjects, and run
//! statistics.
//!
//! These are the documents the external UI reads, so the serialized field
//! names (`id`, `votes`, `added`, `totalArtists`, ...) are part of the
//! contract. Fields added after the first published format (`reporters`,
//! `issues`) default to empty when absent.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{IssueNumber, ReporterLogin, SubjectKey, Timestamp};

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// One subject in the pending or flagged registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectEntry {
    /// Display identifier, `platform:platformId` for entries this pipeline
    /// creates. Older hand-written entries may carry free-form ids; identity
    /// is always derived from [`SubjectEntry::platforms`].
    pub id: String,

    /// Display name; the first name ever reported wins.
    pub name: String,

    /// Platform name → platform-specific identifier.
    #[serde(default)]
    pub platforms: BTreeMap<String, String>,

    /// Number of distinct reporters.
    #[serde(default)]
    pub votes: u32,

    /// Every reporter that voted for the subject.
    #[serde(default)]
    pub reporters: BTreeSet<ReporterLogin>,

    /// Every report-issue counted for the subject.
    #[serde(default)]
    pub issues: BTreeSet<IssueNumber>,

    /// When the subject was first reported.
    pub added: Timestamp,
}

impl SubjectEntry {
    /// Creates an entry with no votes for `key`.
    pub fn new(key: &SubjectKey, name: impl Into<String>, added: Timestamp) -> Self {
        let mut platforms = BTreeMap::new();
        platforms.insert(
            key.platform().as_str().to_string(),
            key.platform_id().as_str().to_string(),
        );
        Self {
            id: key.to_string(),
            name: name.into(),
            platforms,
            votes: 0,
            reporters: BTreeSet::new(),
            issues: BTreeSet::new(),
            added,
        }
    }

    /// Subject keys this entry answers to, one per platform, normalized the
    /// same way report parsing normalizes them.
    pub fn subject_keys(&self) -> impl Iterator<Item = SubjectKey> + '_ {
        self.platforms
            .iter()
            .filter_map(|(platform, id)| SubjectKey::from_raw(platform, id))
    }

    /// Returns `true` if this entry answers to `key`.
    pub fn matches(&self, key: &SubjectKey) -> bool {
        self.subject_keys().any(|k| &k == key)
    }

    /// Records a ballot. Returns `true` if `reporter` had not voted before.
    ///
    /// The issue is recorded either way, so a re-filed report for an already
    /// counted reporter is still closed when the subject is promoted.
    pub fn record(&mut self, reporter: ReporterLogin, issue: IssueNumber) -> bool {
        self.issues.insert(issue);
        let inserted = self.reporters.insert(reporter);
        self.recount();
        inserted
    }

    /// Folds another entry for the same subject into this one.
    pub fn absorb(&mut self, other: SubjectEntry) {
        self.reporters.extend(other.reporters);
        self.issues.extend(other.issues);
        for (platform, id) in other.platforms {
            self.platforms.entry(platform).or_insert(id);
        }
        self.added = self.added.min(other.added);
        self.recount();
    }

    /// Resets [`SubjectEntry::votes`] to the reporter count.
    pub fn recount(&mut self) {
        self.votes = u32::try_from(self.reporters.len()).unwrap_or(u32::MAX);
    }
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

/// `pending.json`: subjects below the promotion threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRegistry {
    /// Timestamp of the run that wrote the document.
    pub version: Timestamp,
    /// Same as `version`; kept for readers of the original format.
    pub updated: Timestamp,
    /// Pending subjects.
    #[serde(default)]
    pub artists: Vec<SubjectEntry>,
}

impl PendingRegistry {
    /// An empty document stamped with `now`.
    pub fn empty(now: Timestamp) -> Self {
        Self {
            version: now,
            updated: now,
            artists: Vec::new(),
        }
    }
}

/// `flagged.json`: promoted subjects. Entries are never removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlaggedRegistry {
    /// Timestamp of the run that wrote the document.
    pub version: Timestamp,
    /// Same as `version`; kept for readers of the original format.
    pub updated: Timestamp,
    /// Number of flagged subjects.
    #[serde(default)]
    pub total: usize,
    /// Flagged subjects.
    #[serde(default)]
    pub artists: Vec<SubjectEntry>,
}

impl FlaggedRegistry {
    /// An empty document stamped with `now`.
    pub fn empty(now: Timestamp) -> Self {
        Self {
            version: now,
            updated: now,
            total: 0,
            artists: Vec::new(),
        }
    }
}

/// `stats.json`: derived counters. Never consulted for membership decisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStats {
    /// Pending plus flagged subjects.
    #[serde(default)]
    pub total_artists: usize,
    /// Flagged subjects.
    #[serde(default)]
    pub flagged_artists: usize,
    /// Reporter votes newly recorded by the latest run.
    #[serde(default)]
    pub votes_today: u64,
    /// Reporter votes recorded across all runs.
    #[serde(default)]
    pub votes_total: u64,
    /// Timestamp of the latest run.
    pub last_updated: Timestamp,
}

impl RunStats {
    /// Zeroed counters stamped with `now`.
    pub fn empty(now: Timestamp) -> Self {
        Self {
            total_artists: 0,
            flagged_artists: 0,
            votes_today: 0,
            votes_total: 0,
            last_updated: now,
        }
    }
}

/// All three registry documents, as loaded at the start of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrySnapshot {
    /// `pending.json`.
    pub pending: PendingRegistry,
    /// `flagged.json`.
    pub flagged: FlaggedRegistry,
    /// `stats.json`.
    pub stats: RunStats,
}

impl RegistrySnapshot {
    /// A registry with no subjects.
    pub fn empty(now: Timestamp) -> Self {
        Self {
            pending: PendingRegistry::empty(now),
            flagged: FlaggedRegistry::empty(now),
            stats: RunStats::empty(now),
        }
    }

    /// Pending entry for `key`, if any.
    pub fn find_pending(&self, key: &SubjectKey) -> Option<&SubjectEntry> {
        self.pending.artists.iter().find(|e| e.matches(key))
    }

    /// Flagged entry for `key`, if any.
    pub fn find_flagged(&self, key: &SubjectKey) -> Option<&SubjectEntry> {
        self.flagged.artists.iter().find(|e| e.matches(key))
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
