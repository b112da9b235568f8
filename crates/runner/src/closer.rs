//! Closing phase of a run.
//!
//! Runs after the registry has been persisted. Each close is independent: a
//! failure is logged and recorded, and the remaining issues are still closed.

use pipeline::{ClosurePlan, IssueTracker};
use tracing::{info, warn};

use crate::report::{CloseFailure, CloseSummary};

/// Closes every issue in `plan`, one request at a time, in issue order.
pub async fn close_planned(tracker: &dyn IssueTracker, plan: &ClosurePlan) -> CloseSummary {
    let mut summary = CloseSummary::default();

    for (issue, reason) in plan.iter() {
        match tracker.close_issue(issue, reason.resolution()).await {
            Ok(()) => {
                info!(issue = issue.as_u64(), reason = %reason, "Closed report issue");
                summary.closed += 1;
            }
            Err(error) => {
                warn!(
                    issue = issue.as_u64(),
                    reason = %reason,
                    error = %error,
                    "Failed to close report issue, leaving it for a later run"
                );
                summary.failures.push(CloseFailure {
                    issue,
                    reason,
                    error,
                });
            }
        }
    }

    summary
}
