//! Command-line and environment configuration.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use github::{GithubConfig, DEFAULT_API_URL};
use pipeline::{
    RepositoryId, VotePolicy, DEFAULT_MAX_VOTES_PER_RUN, DEFAULT_PROMOTION_THRESHOLD,
};
use runner::DEFAULT_VOTE_LABEL;

#[derive(Debug, Parser)]
#[command(name = "truetunes-votes")]
#[command(about = "Ingest community AI-artist votes and promote flagged artists")]
#[command(version)]
pub struct Cli {
    /// Directory holding pending.json, flagged.json and stats.json
    #[arg(long, env = "TRUETUNES_DATA_DIR", default_value = "data", global = true)]
    pub data_dir: PathBuf,

    /// Log output format
    #[arg(
        long,
        env = "TRUETUNES_LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Json,
        global = true
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Process every open vote report once
    Run(RunArgs),

    /// Create or repair the registry files in the data directory
    Init {
        /// Reset valid registry files to empty as well
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Repository the vote reports are filed in, as owner/repo
    #[arg(long, env = "GITHUB_REPOSITORY", value_parser = parse_repository)]
    pub repository: RepositoryId,

    /// Token allowed to read and close issues in the repository
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: String,

    /// GitHub REST API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Label vote reports carry
    #[arg(long, env = "TRUETUNES_VOTE_LABEL", default_value = DEFAULT_VOTE_LABEL)]
    pub label: String,

    /// Distinct reporters needed to flag an artist
    #[arg(long, env = "TRUETUNES_PROMOTION_THRESHOLD", default_value_t = DEFAULT_PROMOTION_THRESHOLD)]
    pub promotion_threshold: u32,

    /// Votes counted per reporter in one run
    #[arg(long, env = "TRUETUNES_MAX_VOTES_PER_RUN", default_value_t = DEFAULT_MAX_VOTES_PER_RUN)]
    pub max_votes_per_run: u32,

    /// Per-request timeout against the GitHub API, in seconds
    #[arg(long, env = "TRUETUNES_HTTP_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// One JSON object per event
    Json,
    /// Human-readable lines
    Text,
}

impl RunArgs {
    pub fn policy(&self) -> anyhow::Result<VotePolicy> {
        VotePolicy::new(self.promotion_threshold, self.max_votes_per_run)
            .context("invalid vote policy")
    }

    pub fn github(&self) -> GithubConfig {
        let mut config = GithubConfig::new(self.repository.clone(), self.token.clone());
        config.api_url = self.api_url.clone();
        config.timeout = Duration::from_secs(self.timeout_secs);
        config
    }
}

fn parse_repository(value: &str) -> Result<RepositoryId, String> {
    RepositoryId::new(value).ok_or_else(|| format!("`{value}` is not of the form owner/repo"))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
