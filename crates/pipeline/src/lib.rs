//! Core vote domain for TrueTunes.
//!
//! This crate contains every domain concept used to turn report-issues into
//! registry changes: identifiers, report parsing, the in-run tally, the
//! registry model and its bookkeeping, closure scheduling, and the port traits
//! infrastructure crates implement.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! Tally, merge and promotion are plain functions over explicit values, so they
//! are testable without a network or a filesystem.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers and subject-key normalization |
//! | [`types`] | Shared value types (`Vote`, `VotePolicy`, `Timestamp`) |
//! | [`errors`] | Port, parse and run-level error types |
//! | [`parser`] | Report-issue → `Vote` |
//! | [`tally`] | Rate limiting, grouping, in-run deduplication |
//! | [`registry`] | Pending / flagged / stats documents |
//! | [`ledger`] | Merge, promotion, stats refresh |
//! | [`closure`] | Closure reasons and the per-run closure plan |
//! | [`ports`] | `IssueTracker` and `RegistryStore` traits |

pub mod closure;
pub mod errors;
pub mod identifiers;
pub mod ledger;
pub mod parser;
pub mod ports;
pub mod registry;
pub mod tally;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use closure::{ClosurePlan, ClosureReason};
pub use errors::{ParseError, RegistryError, TrackerError, VoteRunError};
pub use identifiers::{
    IssueNumber, Platform, PlatformId, ReporterLogin, RepositoryId, RunId, SubjectKey,
};
pub use ledger::{
    merge_votes, promote_ready, promotion_closures, refresh_stats, MergeOutcome, Promotion,
};
pub use parser::{parse_vote, FieldSet, VoteField};
pub use ports::{IssueState, IssueTracker, RegistryStore, ReportIssue, Resolution};
pub use registry::{FlaggedRegistry, PendingRegistry, RegistrySnapshot, RunStats, SubjectEntry};
pub use tally::{tally_votes, Ballot, Tally, VoteGroup};
pub use types::{
    Timestamp, Vote, VotePolicy, DEFAULT_MAX_VOTES_PER_RUN, DEFAULT_PROMOTION_THRESHOLD,
};
