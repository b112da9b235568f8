//! TrueTunes vote pipeline entry point.
//!
//! This binary is the composition root. Responsibilities:
//!
//! 1. **Parse configuration**: flags with environment fallbacks, see [`config`].
//! 2. **Wire observability**: a JSON (or text) `tracing-subscriber` layer and,
//!    when configured, an OpenTelemetry OTLP exporter, see [`telemetry`].
//! 3. **Construct infrastructure**: a [`github::GithubClient`] and a
//!    [`registry::FileRegistryStore`], injected into a [`runner::VoteRun`].
//! 4. **Dispatch**: `run` performs one pipeline pass; `init` prepares the data
//!    directory.
//!
//! Intended to be invoked on a schedule (e.g. hourly from CI). Runs must not
//! overlap.

mod config;
mod telemetry;

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use github::GithubClient;
use pipeline::{ClosureReason, Timestamp};
use registry::{FileRegistryStore, InitOutcome};
use runner::VoteRun;
use tracing::{error, info, warn};

use config::{Cli, Command, RunArgs};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let telemetry = match telemetry::init(cli.log_format) {
        Ok(telemetry) => telemetry,
        Err(err) => {
            eprintln!("Error: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    let result = match &cli.command {
        Command::Run(args) => run(args, &cli.data_dir).await,
        Command::Init { force } => init(*force, &cli.data_dir).await,
    };

    let code = match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %format!("{err:#}"), "Command failed");
            ExitCode::FAILURE
        }
    };

    telemetry.shutdown();
    code
}

async fn run(args: &RunArgs, data_dir: &Path) -> anyhow::Result<()> {
    let policy = args.policy()?;
    let tracker = GithubClient::new(args.github()).context("failed to build GitHub client")?;
    let store = FileRegistryStore::new(data_dir);

    info!(
        repository = %args.repository,
        data_dir = %data_dir.display(),
        label = %args.label,
        threshold = policy.promotion_threshold(),
        max_votes_per_run = policy.max_votes_per_run(),
        "Starting vote run"
    );

    let report = VoteRun::new(Arc::new(tracker), Arc::new(store), policy)
        .with_label(args.label.clone())
        .execute(Timestamp::now())
        .await
        .context("vote run failed")?;

    for promotion in &report.promotions {
        info!(
            id = %promotion.id,
            name = %promotion.name,
            votes = promotion.votes,
            "Artist flagged"
        );
    }
    info!(
        run_id = %report.run_id,
        issues = report.issues_seen,
        votes = report.votes_parsed,
        recorded = report.votes_recorded,
        created = report.subjects_created,
        promoted = report.promotions.len(),
        invalid = report.closed_as(ClosureReason::Invalid),
        duplicate = report.closed_as(ClosureReason::Duplicate),
        rate_limited = report.closed_as(ClosureReason::RateLimited),
        already_flagged = report.closed_as(ClosureReason::AlreadyFlagged),
        closed = report.close.closed,
        close_failures = report.close.failures.len(),
        "Vote run complete"
    );
    if !report.close.failures.is_empty() {
        warn!(
            issues = ?report
                .close
                .failures
                .iter()
                .map(|f| f.issue.as_u64())
                .collect::<Vec<_>>(),
            "Issues left open will be retried on the next run"
        );
    }
    Ok(())
}

async fn init(force: bool, data_dir: &Path) -> anyhow::Result<()> {
    let store = FileRegistryStore::new(data_dir);
    let report = store
        .init(force, Timestamp::now())
        .await
        .with_context(|| format!("failed to initialise {}", data_dir.display()))?;

    for (file, outcome) in &report.files {
        match outcome {
            InitOutcome::Replaced { backup } => warn!(
                file = %file,
                backup = %backup.display(),
                "Registry file was unreadable; backed up and replaced"
            ),
            other => info!(file = %file, outcome = ?other, "Registry file ready"),
        }
    }
    Ok(())
}
