use clap::Parser;

use super::*;

fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
    Cli::try_parse_from(std::iter::once("truetunes-votes").chain(args.iter().copied()))
}

fn run_args(cli: Cli) -> RunArgs {
    match cli.command {
        Command::Run(args) => args,
        other => panic!("expected run, got {other:?}"),
    }
}

#[test]
fn test_run_flags_override_defaults() {
    let cli = parse(&[
        "--log-format",
        "text",
        "run",
        "--repository",
        "truetunes/votes",
        "--token",
        "t0k3n",
        "--api-url",
        "http://localhost:9000/",
        "--label",
        "ai-vote",
        "--promotion-threshold",
        "3",
        "--max-votes-per-run",
        "5",
        "--data-dir",
        "/srv/truetunes",
    ])
    .unwrap();

    assert_eq!(cli.log_format, LogFormat::Text);
    assert_eq!(cli.data_dir, PathBuf::from("/srv/truetunes"));

    let args = run_args(cli);
    let policy = args.policy().unwrap();
    assert_eq!(policy.promotion_threshold(), 3);
    assert_eq!(policy.max_votes_per_run(), 5);
    assert_eq!(args.label, "ai-vote");

    let github = args.github();
    assert_eq!(github.repository.as_str(), "truetunes/votes");
    assert_eq!(github.api_url, "http://localhost:9000/");
    assert_eq!(github.token, "t0k3n");
}

#[test]
fn test_malformed_repository_is_rejected() {
    let err = parse(&["run", "--repository", "just-a-name", "--token", "x"]).unwrap_err();

    assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
}

#[test]
fn test_zero_threshold_is_a_configuration_error() {
    let cli = parse(&[
        "run",
        "--repository",
        "a/b",
        "--token",
        "x",
        "--promotion-threshold",
        "0",
    ])
    .unwrap();

    assert!(run_args(cli).policy().is_err());
}

#[test]
fn test_init_accepts_force() {
    let cli = parse(&["init", "--force", "--data-dir", "out"]).unwrap();

    assert!(matches!(cli.command, Command::Init { force: true }));
    assert_eq!(cli.data_dir, PathBuf::from("out"));
}

#[test]
fn test_unknown_log_format_is_rejected() {
    assert!(parse(&["--log-format", "xml", "init"]).is_err());
}
