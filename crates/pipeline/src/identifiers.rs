//! Newtype domain identifiers.
//!
//! Every domain concept that has an identity is represented as a distinct newtype
//! wrapping a primitive. This prevents accidentally interchanging, for example, a
//! [`ReporterLogin`] with a [`PlatformId`] even though both are strings under the
//! hood.
//!
//! The subject identity rules live here as well: [`PlatformId::normalize`] is the
//! only way to build a platform identifier, and [`SubjectKey`] is the only key the
//! tally and the registry ledger look subjects up by.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is blank.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                let v = v.trim();
                if v.is_empty() { None } else { Some(Self(v.to_string())) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Macro for u64-wrapped newtypes (tracker-assigned integers).
// Generates: struct (Copy), new(), as_u64(), Display.
// ---------------------------------------------------------------------------
macro_rules! u64_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(u64);

        impl $name {
            /// Creates a new identifier from a raw integer.
            pub fn new(value: u64) -> Self {
                Self(value)
            }

            /// Returns the underlying integer value.
            pub fn as_u64(self) -> u64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "#{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers: tracker-integer-backed
// ---------------------------------------------------------------------------

u64_id! {
    /// Identifies one report-issue in the issue tracker.
    ///
    /// Wraps the issue number assigned by GitHub (positive integer). Serialized as
    /// the bare number in the registry files.
    IssueNumber
}

// ---------------------------------------------------------------------------
// Identifiers: UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies a single vote-processing run.
///
/// Generated fresh for every invocation and recorded on the run's tracing span
/// so all activity from a single run can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    /// Generates a new random run identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identifiers: String-backed
// ---------------------------------------------------------------------------

string_id! {
    /// The authenticated tracker login that filed a report-issue.
    ///
    /// The unit of deduplication and rate limiting. The pipeline trusts the
    /// tracker's authentication and performs no verification of its own.
    ReporterLogin
}

/// Identifies a GitHub repository in `"owner/repo"` format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryId(String);

impl RepositoryId {
    /// Creates a [`RepositoryId`], returning `None` unless `value` is exactly
    /// two non-empty segments separated by `/`.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let v = value.into();
        let (owner, name) = v.trim().split_once('/')?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return None;
        }
        Some(Self(format!("{owner}/{name}")))
    }

    /// Returns the `"owner/repo"` string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Subject identity
// ---------------------------------------------------------------------------

/// Streaming platform a subject lives on (e.g. `"spotify"`).
///
/// Always lower-case; `"Spotify"` and `"SPOTIFY"` are the same platform.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Platform(String);

impl Platform {
    /// Creates a [`Platform`] from free text, returning `None` if it is blank.
    pub fn new(value: &str) -> Option<Self> {
        let v = value.trim();
        if v.is_empty() {
            None
        } else {
            Some(Self(v.to_lowercase()))
        }
    }

    /// Returns the lower-case platform name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Platform-specific identifier of a subject, stripped of redundant prefixes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlatformId(String);

impl PlatformId {
    /// Normalizes a raw identifier as it appears in a report body or a registry
    /// file.
    ///
    /// A leading `<platform>:` prefix is removed (case-insensitively), followed by
    /// a leading `artist:` segment, so `spotify:artist:X`, `spotify:X` and `X` all
    /// normalize to `X`. Returns `None` if nothing is left.
    pub fn normalize(platform: &Platform, raw: &str) -> Option<Self> {
        let mut id = raw.trim();
        if let Some(rest) = strip_prefix_ignore_case(id, platform.as_str())
            .and_then(|rest| rest.strip_prefix(':'))
        {
            id = rest;
        }
        if let Some(rest) = strip_prefix_ignore_case(id, "artist:") {
            id = rest;
        }
        let id = id.trim();
        if id.is_empty() {
            None
        } else {
            Some(Self(id.to_string()))
        }
    }

    /// Returns the normalized identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlatformId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let head = value.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        value.get(prefix.len()..)
    } else {
        None
    }
}

/// The unique identity of a reported subject: `platform:platform_id`.
///
/// Display names never participate in identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubjectKey {
    platform: Platform,
    platform_id: PlatformId,
}

impl SubjectKey {
    /// Creates a key from already-normalized parts.
    pub fn new(platform: Platform, platform_id: PlatformId) -> Self {
        Self {
            platform,
            platform_id,
        }
    }

    /// Builds a key from raw text, applying the same normalization as report
    /// parsing. Returns `None` if either part is blank after normalization.
    pub fn from_raw(platform: &str, platform_id: &str) -> Option<Self> {
        let platform = Platform::new(platform)?;
        let platform_id = PlatformId::normalize(&platform, platform_id)?;
        Some(Self::new(platform, platform_id))
    }

    /// The platform component.
    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    /// The platform-specific identifier component.
    pub fn platform_id(&self) -> &PlatformId {
        &self.platform_id
    }
}

impl std::fmt::Display for SubjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.platform, self.platform_id)
    }
}

#[cfg(test)]
#[path = "identifiers_tests.rs"]
mod tests;
