//! In-memory port implementations for run tests.

#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use pipeline::{
    IssueNumber, IssueState, IssueTracker, RegistryError, RegistrySnapshot, RegistryStore,
    ReportIssue, ReporterLogin, Resolution, Timestamp, TrackerError,
};

pub fn at(day: u32) -> Timestamp {
    Timestamp::from_utc(Utc.with_ymd_and_hms(2025, 11, day, 6, 0, 0).unwrap())
}

/// A well-formed vote report from `reporter` for `spotify:<id>`.
pub fn vote_issue(number: u64, reporter: &str, id: &str) -> ReportIssue {
    ReportIssue {
        number: IssueNumber::new(number),
        title: format!("Vote: Artist {id}"),
        body: Some(format!("Platform: Spotify\nArtist ID: {id}\nVote: ai\n")),
        author: ReporterLogin::new(reporter),
    }
}

pub fn invalid_issue(number: u64, reporter: &str) -> ReportIssue {
    ReportIssue {
        number: IssueNumber::new(number),
        title: "Please add a dark mode".to_string(),
        body: None,
        author: ReporterLogin::new(reporter),
    }
}

/// Votes from `reporter-<n>` for every `n` in `range`; issue number = `n`.
pub fn votes_from(range: std::ops::RangeInclusive<u64>, id: &str) -> Vec<ReportIssue> {
    range
        .map(|n| vote_issue(n, &format!("reporter-{n}"), id))
        .collect()
}

// ---------------------------------------------------------------------------
// FakeTracker
// ---------------------------------------------------------------------------

#[derive(Default)]
struct TrackerState {
    open: Vec<ReportIssue>,
    closed: Vec<(IssueNumber, Resolution)>,
    failing_closes: BTreeSet<IssueNumber>,
    fail_listing: bool,
    list_calls: usize,
}

/// Tracker holding a list of open issues. Closing an issue removes it.
#[derive(Default)]
pub struct FakeTracker {
    state: Mutex<TrackerState>,
}

impl FakeTracker {
    pub fn with_issues(issues: Vec<ReportIssue>) -> Self {
        let tracker = Self::default();
        tracker.file(issues);
        tracker
    }

    pub fn file(&self, issues: Vec<ReportIssue>) {
        self.state.lock().unwrap().open.extend(issues);
    }

    pub fn fail_listing(&self) {
        self.state.lock().unwrap().fail_listing = true;
    }

    pub fn fail_close(&self, issue: u64) {
        self.state
            .lock()
            .unwrap()
            .failing_closes
            .insert(IssueNumber::new(issue));
    }

    pub fn heal(&self) {
        let mut state = self.state.lock().unwrap();
        state.fail_listing = false;
        state.failing_closes.clear();
    }

    pub fn open_numbers(&self) -> Vec<u64> {
        let mut numbers: Vec<u64> = self
            .state
            .lock()
            .unwrap()
            .open
            .iter()
            .map(|issue| issue.number.as_u64())
            .collect();
        numbers.sort_unstable();
        numbers
    }

    pub fn closed(&self) -> Vec<(IssueNumber, Resolution)> {
        self.state.lock().unwrap().closed.clone()
    }

    pub fn closed_with(&self, resolution: Resolution) -> Vec<u64> {
        self.closed()
            .into_iter()
            .filter(|(_, r)| *r == resolution)
            .map(|(issue, _)| issue.as_u64())
            .collect()
    }

    pub fn list_calls(&self) -> usize {
        self.state.lock().unwrap().list_calls
    }
}

#[async_trait]
impl IssueTracker for FakeTracker {
    async fn list_issues(
        &self,
        _label: &str,
        state: IssueState,
    ) -> Result<Vec<ReportIssue>, TrackerError> {
        let mut guard = self.state.lock().unwrap();
        guard.list_calls += 1;
        if guard.fail_listing {
            return Err(TrackerError::Transport {
                message: "connection reset".to_string(),
            });
        }
        assert_eq!(state, IssueState::Open);
        Ok(guard.open.clone())
    }

    async fn close_issue(
        &self,
        issue: IssueNumber,
        resolution: Resolution,
    ) -> Result<(), TrackerError> {
        let mut guard = self.state.lock().unwrap();
        if guard.failing_closes.contains(&issue) {
            return Err(TrackerError::Api {
                status: 502,
                message: "Bad Gateway".to_string(),
            });
        }
        guard.open.retain(|open| open.number != issue);
        guard.closed.push((issue, resolution));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

struct StoreState {
    snapshot: RegistrySnapshot,
    persist_calls: usize,
    fail_persist: bool,
}

/// Registry kept in memory.
pub struct MemoryStore {
    state: Mutex<StoreState>,
}

impl MemoryStore {
    pub fn new(snapshot: RegistrySnapshot) -> Self {
        Self {
            state: Mutex::new(StoreState {
                snapshot,
                persist_calls: 0,
                fail_persist: false,
            }),
        }
    }

    pub fn empty() -> Self {
        Self::new(RegistrySnapshot::empty(at(1)))
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        self.state.lock().unwrap().snapshot.clone()
    }

    pub fn persist_calls(&self) -> usize {
        self.state.lock().unwrap().persist_calls
    }

    pub fn fail_persist(&self) {
        self.state.lock().unwrap().fail_persist = true;
    }
}

#[async_trait]
impl RegistryStore for MemoryStore {
    async fn load(&self) -> Result<RegistrySnapshot, RegistryError> {
        Ok(self.state.lock().unwrap().snapshot.clone())
    }

    async fn persist(&self, snapshot: &RegistrySnapshot) -> Result<(), RegistryError> {
        let mut guard = self.state.lock().unwrap();
        if guard.fail_persist {
            return Err(RegistryError::Write {
                path: "memory/pending.json".into(),
                message: "disk full".to_string(),
            });
        }
        guard.persist_calls += 1;
        guard.snapshot = snapshot.clone();
        Ok(())
    }
}
