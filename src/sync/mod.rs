//! # Sync Engine
//!
//! This module drives one sync run across the fleet of target repositories.
//!
//! ## Per-Repository Attempt
//!
//! For each target, [`Syncer::sync_repository`] performs one attempt:
//!
//! 1.  **Identify**: parse the `owner/name` identifier.
//! 2.  **Default branch**: look up the target's current default branch.
//! 3.  **Clone**: clone the target into a fresh temporary directory owned by
//!     this attempt and removed when it ends, so no state leaks between
//!     targets.
//! 4.  **Branch**: reconcile the feature branch ([`branch`]).
//! 5.  **Transfer**: replace the managed workflow files with the source's
//!     ([`crate::transfer`]).
//! 6.  **Publish**: if anything changed, commit, push and open a pull request
//!     ([`pull_request`]). With no changes the attempt succeeds without a pull
//!     request and the empty feature branch is removed again.
//!
//! ## Run
//!
//! [`Syncer::run`] folds the target list into an ordered sequence of
//! [`SyncOutcome`]s, exactly one per target. A failed attempt is recorded and
//! the fold moves on; nothing escapes the loop. Targets are processed one at
//! a time, in list order.
//!
//! After the run, [`report`](crate::report) renders the outcomes and
//! [`marker`] decides whether the `last-synced` tag moves.

pub mod branch;
pub mod marker;
pub mod pull_request;

#[cfg(test)]
pub(crate) mod fakes;

use std::path::Path;
use std::time::{Duration, Instant};

use log::{info, warn};

use crate::config::SyncSettings;
use crate::error::{Error, Result};
use crate::github::{Credentials, PullRequestRef, RepositoryApi};
use crate::identifier::RepoId;
use crate::repository::GitOperations;
use crate::transfer;

/// Result of one attempt on one target.
#[derive(Debug)]
pub enum SyncStatus {
    /// The target is in sync. `pull_request` is `None` when nothing changed.
    Synced {
        pull_request: Option<PullRequestRef>,
    },
    Failed(Error),
}

/// Immutable record of one target's attempt within a run.
#[derive(Debug)]
pub struct SyncOutcome {
    /// The target identifier, as listed in the configuration.
    pub repository: String,
    pub status: SyncStatus,
    /// Time from the start of the run to the end of this attempt.
    pub elapsed: Duration,
}

impl SyncOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.status, SyncStatus::Synced { .. })
    }

    pub fn error(&self) -> Option<&Error> {
        match &self.status {
            SyncStatus::Failed(error) => Some(error),
            SyncStatus::Synced { .. } => None,
        }
    }

    pub fn pull_request(&self) -> Option<&PullRequestRef> {
        match &self.status {
            SyncStatus::Synced { pull_request } => pull_request.as_ref(),
            SyncStatus::Failed(_) => None,
        }
    }
}

/// Number of successful outcomes and total outcomes.
pub fn tally(outcomes: &[SyncOutcome]) -> (usize, usize) {
    let success = outcomes.iter().filter(|o| o.is_success()).count();
    (success, outcomes.len())
}

/// Runs sync attempts against targets with shared, injected collaborators.
pub struct Syncer<'a> {
    git_ops: &'a dyn GitOperations,
    api: &'a dyn RepositoryApi,
    settings: &'a SyncSettings,
    credentials: &'a Credentials,
    source_dir: &'a Path,
}

impl<'a> Syncer<'a> {
    /// `source_dir` is the working copy of the source repository whose
    /// workflow directory is propagated.
    pub fn new(
        git_ops: &'a dyn GitOperations,
        api: &'a dyn RepositoryApi,
        settings: &'a SyncSettings,
        credentials: &'a Credentials,
        source_dir: &'a Path,
    ) -> Self {
        Self {
            git_ops,
            api,
            settings,
            credentials,
            source_dir,
        }
    }

    /// Attempt every target in order, calling `on_outcome` as each finishes.
    pub fn run<F>(&self, targets: &[String], mut on_outcome: F) -> Vec<SyncOutcome>
    where
        F: FnMut(&SyncOutcome),
    {
        let start = Instant::now();

        targets
            .iter()
            .fold(Vec::with_capacity(targets.len()), |mut outcomes, target| {
                let status = match self.sync_repository(target) {
                    Ok(pull_request) => SyncStatus::Synced { pull_request },
                    Err(e) => {
                        warn!("Failed to sync to '{}': {}", target, e);
                        SyncStatus::Failed(e)
                    }
                };

                let outcome = SyncOutcome {
                    repository: target.clone(),
                    status,
                    elapsed: start.elapsed(),
                };
                on_outcome(&outcome);
                outcomes.push(outcome);
                outcomes
            })
    }

    /// One attempt on one target.
    ///
    /// Returns the created pull request, or `None` when the target already
    /// had the source's managed files.
    pub fn sync_repository(&self, target: &str) -> Result<Option<PullRequestRef>> {
        let repo = RepoId::parse(target)?;
        let settings = self.settings;
        let branch = settings.feature_branch.as_str();

        let default_branch =
            self.api
                .default_branch(&repo)
                .map_err(|e| Error::RepositoryLookupFailed {
                    repository: target.to_string(),
                    message: e.to_string(),
                })?;

        let clone_failed = |message: String| Error::CloneFailed {
            repository: target.to_string(),
            message,
        };
        let workspace = tempfile::Builder::new()
            .prefix("workflow-sync-")
            .tempdir()
            .map_err(|e| clone_failed(format!("could not create working directory: {}", e)))?;
        let dir = workspace.path().join(&repo.name);
        let remote = repo
            .remote_url(&settings.server_url, Some(self.credentials.token()))
            .map_err(|e| clone_failed(e.to_string()))?;
        self.git_ops
            .clone_repository(remote.as_str(), &dir)
            .map_err(|e| clone_failed(e.to_string()))?;

        branch::reconcile_branch(self.git_ops, self.api, &repo, &dir, &default_branch, branch)?;

        let summary = transfer::sync_managed_files(
            &self.source_dir.join(&settings.workflow_dir),
            &dir.join(&settings.workflow_dir),
        )
        .map_err(|e| Error::FileTransferFailed {
            repository: target.to_string(),
            message: e.to_string(),
        })?;
        info!(
            "'{}': removed {} and copied {} managed workflow files",
            target,
            summary.removed.len(),
            summary.copied.len()
        );

        let commit_failed = |e: Error| Error::CommitFailed {
            repository: target.to_string(),
            message: e.to_string(),
        };

        if !self.git_ops.has_changes(&dir).map_err(commit_failed)? {
            info!("'{}' already has the latest workflows", target);
            if let Err(e) = self.git_ops.delete_remote_branch(&dir, branch) {
                warn!("Could not remove unused branch '{}@{}': {}", target, branch, e);
            }
            return Ok(None);
        }

        self.git_ops
            .configure_identity(&dir, &settings.git_user_name, &settings.git_user_email)
            .and_then(|_| self.git_ops.commit_all(&dir, &settings.commit_message))
            .and_then(|_| self.git_ops.push(&dir, branch))
            .map_err(commit_failed)?;

        let pull_request =
            pull_request::open_pull_request(self.api, &repo, settings, &default_branch)?;
        info!("Opened pull request #{} on '{}'", pull_request.number, target);

        Ok(Some(pull_request))
    }
}
