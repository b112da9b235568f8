//! Shared value types for the vote domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! values with invariants (thresholds are strictly positive) and participate in
//! domain computations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{IssueNumber, ReporterLogin, SubjectKey, VoteRunError};

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Number of distinct reporters that moves a subject from pending to flagged.
pub const DEFAULT_PROMOTION_THRESHOLD: u32 = 10;

/// Number of valid votes one reporter may cast in a single run.
pub const DEFAULT_MAX_VOTES_PER_RUN: u32 = 20;

/// Thresholds that govern tallying and promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotePolicy {
    promotion_threshold: u32,
    max_votes_per_run: u32,
}

impl VotePolicy {
    /// Creates a [`VotePolicy`].
    ///
    /// Both limits must be at least one; a zero threshold would flag every
    /// subject on sight and a zero cap would discard every vote.
    pub fn new(promotion_threshold: u32, max_votes_per_run: u32) -> Result<Self, VoteRunError> {
        if promotion_threshold == 0 {
            return Err(VoteRunError::Configuration {
                message: "promotion threshold must be at least 1".to_string(),
            });
        }
        if max_votes_per_run == 0 {
            return Err(VoteRunError::Configuration {
                message: "max votes per run must be at least 1".to_string(),
            });
        }
        Ok(Self {
            promotion_threshold,
            max_votes_per_run,
        })
    }

    /// Distinct-reporter count at which a pending subject is promoted.
    pub fn promotion_threshold(self) -> u32 {
        self.promotion_threshold
    }

    /// Per-reporter cap on valid votes within one run.
    pub fn max_votes_per_run(self) -> u32 {
        self.max_votes_per_run
    }
}

impl Default for VotePolicy {
    fn default() -> Self {
        Self {
            promotion_threshold: DEFAULT_PROMOTION_THRESHOLD,
            max_votes_per_run: DEFAULT_MAX_VOTES_PER_RUN,
        }
    }
}

// ---------------------------------------------------------------------------
// Votes
// ---------------------------------------------------------------------------

/// One reporter's claim that a subject is AI-generated, derived from exactly one
/// report-issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vote {
    /// Display name taken from the issue title.
    pub subject_name: String,
    /// Identity of the subject voted on.
    pub key: SubjectKey,
    /// Login that filed the issue.
    pub reporter: ReporterLogin,
    /// The issue the vote came from.
    pub issue: IssueNumber,
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly. Serialized as RFC 3339 (`2025-10-19T17:55:27.019Z`), which is the
/// format the registry files have always used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }

    /// Milliseconds since the Unix epoch.
    pub fn unix_millis(self) -> i64 {
        self.0.timestamp_millis()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
