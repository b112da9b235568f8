//! Error types for the vote domain and its ports.
//!
//! [`VoteRunError`] covers conditions that abort a run. Per-issue problems
//! (malformed reports, duplicates, rate-limited reporters) are never errors:
//! they become closure entries in a [`crate::ClosurePlan`].
//!
//! [`TrackerError`] and [`RegistryError`] are the error types of the
//! [`crate::ports`] traits. Infrastructure crates map their own failures into
//! them so the orchestration layer sees a single vocabulary.

use thiserror::Error;

use crate::VoteField;

// ---------------------------------------------------------------------------
// Port errors
// ---------------------------------------------------------------------------

/// A failed request against the issue tracker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackerError {
    /// The request never produced a response (DNS, TLS, connection, timeout).
    #[error("Issue tracker transport failure: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },

    /// The tracker answered with a non-success status.
    #[error("Issue tracker rejected the request (status {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, if any.
        message: String,
    },

    /// The tracker answered with a payload that could not be decoded.
    #[error("Issue tracker returned an undecodable payload: {message}")]
    Decode {
        /// Decoder error message.
        message: String,
    },
}

/// A failed read or write of the durable registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A registry document does not exist.
    #[error("Registry file {path} is missing; run `init` to create it")]
    Missing {
        /// Location of the missing document.
        path: String,
    },

    /// A registry document exists but could not be read.
    #[error("Registry file {path} could not be read: {message}")]
    Read {
        /// Location of the document.
        path: String,
        /// Underlying I/O error message.
        message: String,
    },

    /// A registry document was read but does not have the expected shape.
    #[error("Registry file {path} is not valid: {message}")]
    Corrupt {
        /// Location of the document.
        path: String,
        /// Decoder error message.
        message: String,
    },

    /// A registry document could not be written.
    #[error("Registry file {path} could not be written: {message}")]
    Write {
        /// Location of the document.
        path: String,
        /// Underlying I/O or encoder error message.
        message: String,
    },
}

// ---------------------------------------------------------------------------
// Report parsing
// ---------------------------------------------------------------------------

/// Why a report-issue was rejected as a vote.
///
/// Rejected issues are closed as invalid; the reason is logged with the issue
/// number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The title does not start with the `Vote:` report prefix.
    #[error("title does not start with `Vote:`")]
    MissingTitlePrefix,

    /// The title has the prefix but names nothing.
    #[error("title names no subject")]
    EmptySubjectName,

    /// The tracker attached no author to the issue.
    #[error("issue has no reporter")]
    MissingReporter,

    /// A required body field is absent.
    #[error("body has no `{0}` field")]
    MissingField(VoteField),

    /// A body field is present but its value is unusable.
    #[error("body field `{field}` has unusable value `{value}`")]
    InvalidValue {
        /// The offending field.
        field: VoteField,
        /// The raw value found.
        value: String,
    },

    /// The vote-intent marker is present but is not an AI vote.
    #[error("vote marker is `{0}`, expected `ai`")]
    NotAnAiVote(String),
}

// ---------------------------------------------------------------------------
// Run-level errors
// ---------------------------------------------------------------------------

/// Errors that abort a vote-processing run.
///
/// A run that fails with one of these has not written the registry (fetch and
/// load failures happen before any write) or has not closed any issue (persist
/// failures happen before closing).
#[derive(Debug, Error)]
pub enum VoteRunError {
    /// The run configuration is invalid.
    ///
    /// Produced at start-up; a run never starts with an invalid config.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },

    /// Listing report-issues failed.
    #[error("Fetching report issues failed: {0}")]
    Fetch(#[source] TrackerError),

    /// Loading or persisting the registry failed.
    #[error("Registry failure: {0}")]
    Registry(#[from] RegistryError),
}
