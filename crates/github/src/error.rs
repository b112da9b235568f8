//! Errors raised by the GitHub client and their mapping onto
//! [`pipeline::TrackerError`].

use pipeline::TrackerError;
use thiserror::Error;

/// Result alias for GitHub client operations.
pub type Result<T> = std::result::Result<T, GithubError>;

/// A failed GitHub API interaction.
#[derive(Debug, Error)]
pub enum GithubError {
    /// The request did not complete (connection, TLS, timeout).
    #[error("Network error: {0}")]
    Network(String),

    /// GitHub answered with a non-success status.
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body.
        message: String,
    },

    /// A response body could not be decoded.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The HTTP client could not be built.
    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for GithubError {
    fn from(err: reqwest::Error) -> Self {
        GithubError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for GithubError {
    fn from(err: serde_json::Error) -> Self {
        GithubError::Parse(err.to_string())
    }
}

impl From<GithubError> for TrackerError {
    fn from(err: GithubError) -> Self {
        match err {
            GithubError::Network(message) | GithubError::Config(message) => {
                TrackerError::Transport { message }
            }
            GithubError::Api { status, message } => TrackerError::Api { status, message },
            GithubError::Parse(message) => TrackerError::Decode { message },
        }
    }
}
