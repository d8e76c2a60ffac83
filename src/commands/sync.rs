//! # Sync Command Implementation
//!
//! This module implements the `sync` subcommand, the full propagation run.
//!
//! ## Execution Flow
//!
//! 1.  **Credentials**: read the hosting token from `GH_AUTH_TOKEN`.
//! 2.  **Configuration**: load the target list and validate every identifier.
//! 3.  **Version**: resolve the latest semver tag of the source repository.
//! 4.  **Sync**: attempt every target in list order, with a progress bar.
//! 5.  **Marker**: move `last-synced` if, and only if, every target succeeded.
//! 6.  **Summary**: write the markdown report to the job summary.
//!
//! Steps 1 to 3 are fatal: any failure ends the run before a target is
//! touched and no summary is written. A run where some targets failed still
//! writes its summary, then exits non-zero so the scheduler tries again.

use anyhow::{anyhow, Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

use workflow_sync::config::{self, SyncSettings};
use workflow_sync::defaults;
use workflow_sync::github::{Credentials, GitHubClient};
use workflow_sync::output::{emoji, write_summary, OutputConfig};
use workflow_sync::report;
use workflow_sync::repository::DefaultGitOperations;
use workflow_sync::sync::marker::{self, MarkerOutcome};
use workflow_sync::sync::{tally, SyncOutcome, Syncer};
use workflow_sync::version;

/// Push managed workflows to every target repository
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// JSON file listing the target repositories as `owner/name` strings
    #[arg(long, value_name = "FILE", default_value = defaults::REPOS_FILE)]
    pub repos: PathBuf,

    /// Working copy of the source repository
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub source_dir: PathBuf,

    /// The source repository, as `owner/name`
    #[arg(long, value_name = "OWNER/NAME", env = "GITHUB_REPOSITORY")]
    pub source_repo: String,

    /// Base URL of the hosting REST API
    #[arg(long, value_name = "URL", env = "GITHUB_API_URL", default_value = defaults::API_URL)]
    pub api_url: String,

    /// Base URL of the git host
    #[arg(long, value_name = "URL", env = "GITHUB_SERVER_URL", default_value = defaults::SERVER_URL)]
    pub server_url: String,

    /// File the markdown summary is appended to; printed to stdout when unset
    #[arg(long, value_name = "FILE", env = "GITHUB_STEP_SUMMARY")]
    pub summary_file: Option<PathBuf>,

    /// Hide the progress bar and per-repository status lines
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the `sync` command.
pub fn execute(args: SyncArgs, output: &OutputConfig) -> Result<()> {
    let credentials = Credentials::from_env()?;

    let targets = config::load_targets(&args.repos)
        .with_context(|| format!("Failed to load target list {}", args.repos.display()))?;

    let settings = SyncSettings::new(args.source_repo.as_str())
        .with_server_url(args.server_url.as_str())
        .with_api_url(args.api_url.as_str());
    let source = settings.source().context("Invalid source repository")?;

    let git_ops = DefaultGitOperations;
    let source_url = source.remote_url(&settings.server_url, Some(credentials.token()))?;
    let version =
        version::resolve_latest_version(&git_ops, source_url.as_str(), &settings.source_repo)?;

    let api = GitHubClient::new(&settings.api_url, &credentials)?;

    if !args.quiet {
        println!(
            "{} Pushing {} workflows from {} to {} repositories",
            emoji(output, "💨", "[SYNC]"),
            version,
            source,
            targets.len()
        );
    }

    let progress = progress_bar(targets.len(), args.quiet);
    let syncer = Syncer::new(&git_ops, &api, &settings, &credentials, &args.source_dir);
    let outcomes = syncer.run(&targets, |outcome| {
        if !args.quiet {
            progress.println(status_line(outcome, output));
        }
        progress.inc(1);
    });
    progress.finish_and_clear();

    let (success, total) = tally(&outcomes);
    let marker = marker::settle(
        &git_ops,
        &settings,
        &credentials,
        &args.source_dir,
        success,
        total,
    );

    let summary = report::render_summary(&version, &outcomes, &marker, &settings);
    write_summary(args.summary_file.as_deref(), &summary)
        .context("Failed to write the job summary")?;

    match marker {
        MarkerOutcome::Updated => {
            if !args.quiet {
                println!(
                    "{} Synced {}/{} repositories, tag '{}' updated",
                    emoji(output, "✅", "[OK]"),
                    success,
                    total,
                    settings.marker_tag
                );
            }
            Ok(())
        }
        MarkerOutcome::Stays { missing } => Err(anyhow!(
            "{} of {} repositories were not synced successfully",
            missing,
            total
        )),
        MarkerOutcome::UpdateFailed(e) => Err(e).context("All repositories synced"),
    }
}

fn progress_bar(len: usize, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}") {
        bar.set_style(style.progress_chars("=> "));
    }
    bar
}

fn status_line(outcome: &SyncOutcome, output: &OutputConfig) -> String {
    match (outcome.error(), outcome.pull_request()) {
        (Some(e), _) => format!(
            "{} {}: {}",
            emoji(output, "❌", "[FAIL]"),
            outcome.repository,
            report::flatten_error(&e.to_string())
        ),
        (None, Some(pr)) => format!(
            "{} {}: opened #{}",
            emoji(output, "✅", "[OK]"),
            outcome.repository,
            pr.number
        ),
        (None, None) => format!(
            "{} {}: no changes needed",
            emoji(output, "✅", "[OK]"),
            outcome.repository
        ),
    }
}
