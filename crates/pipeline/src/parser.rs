//! Report-issue parsing.
//!
//! A report-issue looks like this:
//!
//! ```text
//! title: Vote: The Velvet Sundown
//! body:  Platform: Spotify
//!        Artist ID: spotify:2GRtyAXWUiisGYub5SGMrb
//!        Vote: ai
//! ```
//!
//! The body is read by a small field extractor ([`FieldSet`]): every
//! `Label: value` line is a field, labels are case-insensitive and order does not
//! matter. [`parse_vote`] then checks the declared [`VoteField`]s and returns a
//! typed [`ParseError`] for the first one that is missing or unusable.

use crate::{ParseError, Platform, PlatformId, ReportIssue, SubjectKey, Vote};

/// Prefix every report-issue title carries.
pub const TITLE_PREFIX: &str = "Vote:";

/// The only vote-intent marker value this pipeline counts.
pub const AI_VOTE_MARKER: &str = "ai";

/// Body fields a report-issue must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoteField {
    /// Streaming platform name.
    Platform,
    /// Platform-specific subject identifier.
    ArtistId,
    /// Vote-intent marker.
    Vote,
}

impl VoteField {
    /// Lower-case labels accepted for this field, most specific first.
    pub fn labels(self) -> &'static [&'static str] {
        match self {
            Self::Platform => &["platform"],
            Self::ArtistId => &["artist id", "id"],
            Self::Vote => &["vote"],
        }
    }
}

impl std::fmt::Display for VoteField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Platform => "Platform",
            Self::ArtistId => "Artist ID",
            Self::Vote => "Vote",
        };
        f.write_str(label)
    }
}

/// `Label: value` lines extracted from an issue body.
#[derive(Debug, Default)]
pub struct FieldSet<'a> {
    fields: Vec<(String, &'a str)>,
}

impl<'a> FieldSet<'a> {
    /// Extracts every `Label: value` line of `body`.
    ///
    /// Markdown emphasis and list markers around the label are ignored, so
    /// `**Platform:** Spotify` and `- Platform: Spotify` read the same as
    /// `Platform: Spotify`. Lines without a colon are skipped.
    pub fn extract(body: &'a str) -> Self {
        let fields = body
            .lines()
            .filter_map(|line| {
                let (label, value) = line.split_once(':')?;
                let label = label
                    .trim()
                    .trim_start_matches(['-', '*', '+'])
                    .trim_matches(|c: char| c == '*' || c == '_' || c.is_whitespace());
                if label.is_empty() {
                    return None;
                }
                let value = value.trim_start_matches(['*', '_']).trim();
                Some((label.to_lowercase(), value))
            })
            .collect();
        Self { fields }
    }

    /// Returns the first token of the first line whose label matches `field`.
    ///
    /// Labels are tried in [`VoteField::labels`] order, so `Artist ID:` wins over
    /// a bare `ID:` line wherever they appear. An empty value counts as absent.
    pub fn get(&self, field: VoteField) -> Option<&'a str> {
        field.labels().iter().find_map(|label| {
            self.fields
                .iter()
                .find(|(l, _)| l == label)
                .and_then(|(_, value)| value.split_whitespace().next())
        })
    }
}

/// Parses one report-issue into a [`Vote`].
///
/// Rules, in order: the title must carry the `Vote:` prefix and a non-empty
/// subject name; the issue must have a reporter; the body must carry `Platform`
/// and `Artist ID` fields; the body must carry a `Vote: ai` marker. The platform
/// identifier is normalized with [`PlatformId::normalize`].
pub fn parse_vote(issue: &ReportIssue) -> Result<Vote, ParseError> {
    let subject_name = issue
        .title
        .trim()
        .strip_prefix(TITLE_PREFIX)
        .ok_or(ParseError::MissingTitlePrefix)?
        .trim();
    if subject_name.is_empty() {
        return Err(ParseError::EmptySubjectName);
    }

    let reporter = issue.author.clone().ok_or(ParseError::MissingReporter)?;

    let body = issue.body.as_deref().unwrap_or_default();
    let fields = FieldSet::extract(body);

    let raw_platform = fields
        .get(VoteField::Platform)
        .ok_or(ParseError::MissingField(VoteField::Platform))?;
    let raw_id = fields
        .get(VoteField::ArtistId)
        .ok_or(ParseError::MissingField(VoteField::ArtistId))?;
    let marker = fields
        .get(VoteField::Vote)
        .ok_or(ParseError::MissingField(VoteField::Vote))?;
    if !marker.eq_ignore_ascii_case(AI_VOTE_MARKER) {
        return Err(ParseError::NotAnAiVote(marker.to_string()));
    }

    let platform = Platform::new(raw_platform).ok_or_else(|| ParseError::InvalidValue {
        field: VoteField::Platform,
        value: raw_platform.to_string(),
    })?;
    let platform_id =
        PlatformId::normalize(&platform, raw_id).ok_or_else(|| ParseError::InvalidValue {
            field: VoteField::ArtistId,
            value: raw_id.to_string(),
        })?;

    Ok(Vote {
        subject_name: subject_name.to_string(),
        key: SubjectKey::new(platform, platform_id),
        reporter,
        issue: issue.number,
    })
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
