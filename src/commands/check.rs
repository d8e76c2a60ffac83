//! # Check Command Implementation
//!
//! This module implements the `check` subcommand, a read-only validation of a
//! sync run's inputs.
//!
//! - **Target list validation**: by default, the command loads the target
//!   list and checks that every entry is a well-formed `owner/name`
//!   identifier, then prints the targets in the order they would be synced.
//! - **Version lookup**: with `--latest`, it also lists the source
//!   repository's tags and prints the version a sync run would propagate.
//!
//! Nothing is cloned, pushed, or tagged.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use workflow_sync::config::{self, SyncSettings};
use workflow_sync::defaults;
use workflow_sync::github::Credentials;
use workflow_sync::output::{emoji, OutputConfig};
use workflow_sync::repository::DefaultGitOperations;
use workflow_sync::version;

/// Validate the target list and show what a sync run would push
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// JSON file listing the target repositories as `owner/name` strings
    #[arg(long, value_name = "FILE", default_value = defaults::REPOS_FILE)]
    pub repos: PathBuf,

    /// Also resolve the latest version tag of the source repository
    #[arg(long)]
    pub latest: bool,

    /// The source repository, as `owner/name` (required with --latest)
    #[arg(long, value_name = "OWNER/NAME", env = "GITHUB_REPOSITORY", required_if_eq("latest", "true"))]
    pub source_repo: Option<String>,

    /// Base URL of the git host
    #[arg(long, value_name = "URL", env = "GITHUB_SERVER_URL", default_value = defaults::SERVER_URL)]
    pub server_url: String,
}

/// Execute the `check` command.
pub fn execute(args: CheckArgs, output: &OutputConfig) -> Result<()> {
    println!("Loading target list from: {}", args.repos.display());

    let targets = config::load_targets(&args.repos)
        .with_context(|| format!("Failed to load target list {}", args.repos.display()))?;

    println!(
        "{} Target list is valid: {} repositories",
        emoji(output, "✅", "[OK]"),
        targets.len()
    );
    for target in &targets {
        println!("   {}", target);
    }

    if let (true, Some(source_repo)) = (args.latest, args.source_repo.as_deref()) {
        let settings = SyncSettings::new(source_repo).with_server_url(args.server_url.as_str());
        let source = settings.source().context("Invalid source repository")?;

        // Public sources resolve without a token.
        let token = Credentials::from_env().ok();
        let url = source.remote_url(
            &settings.server_url,
            token.as_ref().map(|credentials| credentials.token()),
        )?;

        let latest =
            version::resolve_latest_version(&DefaultGitOperations, url.as_str(), source_repo)?;
        println!(
            "{} Latest version of {}: {}",
            emoji(output, "🏷️", "[TAG]"),
            source,
            latest
        );
    }

    Ok(())
}
