use pipeline::{IssueNumber, ReportIssue, ReporterLogin};
use serde::{Deserialize, Serialize};

/// One element of `GET /repos/{owner}/{repo}/issues`.
///
/// Only the fields the vote pipeline reads are declared.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueItem {
    pub number: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub user: Option<IssueUser>,
    /// Present when the item is a pull request; the issues endpoint lists both.
    #[serde(default)]
    pub pull_request: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueUser {
    pub login: String,
}

impl IssueItem {
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }

    pub fn into_report_issue(self) -> ReportIssue {
        ReportIssue {
            number: IssueNumber::new(self.number),
            title: self.title,
            body: self.body,
            author: self.user.and_then(|user| ReporterLogin::new(user.login)),
        }
    }
}

/// Body of `PATCH /repos/{owner}/{repo}/issues/{number}`.
#[derive(Debug, Clone, Serialize)]
pub struct CloseIssueRequest<'a> {
    pub state: &'a str,
    pub state_reason: &'a str,
}
