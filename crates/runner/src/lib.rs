//! TrueTunes vote run orchestration.
//!
//! [`VoteRun`] drives one pass of the vote pipeline:
//!
//! 1. list open report-issues with the vote label (failure aborts the run);
//! 2. stop early, without touching the registry, if there are none;
//! 3. load the registry;
//! 4. parse, tally, merge into pending, promote, refresh stats;
//! 5. persist the registry;
//! 6. close every issue the run is done with.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** The run sequences calls between business logic in
//! the [`pipeline`] crate and the [`pipeline::IssueTracker`] /
//! [`pipeline::RegistryStore`] ports. It contains no domain rules of its own.
//!
//! Runs must not overlap; the registry is owned by one run at a time.

pub mod closer;
pub mod report;

use std::sync::Arc;

use pipeline::{
    merge_votes, parse_vote, promote_ready, promotion_closures, refresh_stats, tally_votes,
    ClosurePlan, ClosureReason, IssueState, IssueTracker, RegistryStore, RunId, Timestamp,
    VotePolicy, VoteRunError,
};
use tracing::{info, warn, Instrument};

pub use report::{CloseFailure, CloseSummary, RunReport};

/// Label report-issues are filed with.
pub const DEFAULT_VOTE_LABEL: &str = "vote";

/// One configured vote pipeline.
pub struct VoteRun {
    tracker: Arc<dyn IssueTracker>,
    store: Arc<dyn RegistryStore>,
    policy: VotePolicy,
    label: String,
}

impl VoteRun {
    /// Creates a run over `tracker` and `store` using the default vote label.
    pub fn new(
        tracker: Arc<dyn IssueTracker>,
        store: Arc<dyn RegistryStore>,
        policy: VotePolicy,
    ) -> Self {
        Self {
            tracker,
            store,
            policy,
            label: DEFAULT_VOTE_LABEL.to_string(),
        }
    }

    /// Overrides the label report-issues are listed by.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Executes one run, stamping registry changes with `now`.
    pub async fn execute(&self, now: Timestamp) -> Result<RunReport, VoteRunError> {
        let run_id = RunId::new_random();
        let span = tracing::info_span!("vote_run", run_id = %run_id, label = %self.label);
        self.execute_inner(run_id, now).instrument(span).await
    }

    async fn execute_inner(&self, run_id: RunId, now: Timestamp) -> Result<RunReport, VoteRunError> {
        let mut issues = self
            .tracker
            .list_issues(&self.label, IssueState::Open)
            .await
            .map_err(VoteRunError::Fetch)?;
        info!(count = issues.len(), "Fetched open report issues");

        if issues.is_empty() {
            info!("No votes to process");
            return Ok(RunReport::idle(run_id));
        }

        let mut snapshot = self.store.load().await?;

        issues.sort_by_key(|issue| issue.number);
        let mut closures = ClosurePlan::new();
        let mut votes = Vec::with_capacity(issues.len());
        for issue in &issues {
            match parse_vote(issue) {
                Ok(vote) => votes.push(vote),
                Err(reason) => {
                    warn!(issue = issue.number.as_u64(), reason = %reason, "Invalid report issue");
                    closures.schedule(issue.number, ClosureReason::Invalid);
                }
            }
        }
        let votes_parsed = votes.len();

        let tally = tally_votes(votes, &self.policy);
        closures.absorb(tally.closures);

        let merged = merge_votes(&mut snapshot, tally.groups, now);
        closures.absorb(merged.closures);

        let promotions = promote_ready(&mut snapshot, self.policy.promotion_threshold());
        closures.absorb(promotion_closures(&promotions));

        refresh_stats(&mut snapshot, merged.new_votes, now);
        self.store.persist(&snapshot).await?;

        info!(
            issues = issues.len(),
            votes = votes_parsed,
            recorded = merged.new_votes,
            created = merged.created.len(),
            promoted = promotions.len(),
            pending = snapshot.pending.artists.len(),
            flagged = snapshot.flagged.artists.len(),
            threshold = self.policy.promotion_threshold(),
            "Registry updated"
        );
        for reason in ClosureReason::ALL {
            let count = closures.count(reason);
            if count > 0 {
                info!(reason = %reason, count, "Closing report issues");
            }
        }

        let close = closer::close_planned(self.tracker.as_ref(), &closures).await;
        if !close.failures.is_empty() {
            warn!(
                failed = close.failures.len(),
                closed = close.closed,
                "Some report issues could not be closed"
            );
        }

        Ok(RunReport {
            run_id,
            issues_seen: issues.len(),
            votes_parsed,
            votes_recorded: merged.new_votes,
            subjects_created: merged.created.len(),
            promotions,
            closures,
            close,
            registry_written: true,
        })
    }
}
