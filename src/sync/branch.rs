//! Feature branch reconciliation.
//!
//! Every attempt starts from a clean feature branch cut from the target's
//! current default branch tip. A same-named branch left over from an earlier
//! run is deleted locally (if the working copy has it) and remotely before
//! the fresh branch is created and pushed. Deleting the remote branch also
//! closes any stale pull request opened from it.

use std::path::Path;

use log::info;

use crate::error::{Error, Result};
use crate::identifier::RepoId;
use crate::github::RepositoryApi;
use crate::repository::GitOperations;

/// Ensure `branch` exists on `repo` as a fresh copy of `default_branch`.
///
/// `dir` is a working copy of `repo` with `default_branch` checked out.
/// Returns whether a stale branch was removed first.
pub fn reconcile_branch(
    git_ops: &dyn GitOperations,
    api: &dyn RepositoryApi,
    repo: &RepoId,
    dir: &Path,
    default_branch: &str,
    branch: &str,
) -> Result<bool> {
    let cleanup_failed = |message: String| Error::BranchCleanupFailed {
        repository: repo.to_string(),
        branch: branch.to_string(),
        message,
    };

    let exists = api
        .branch_exists(repo, branch)
        .map_err(|e| cleanup_failed(format!("could not see if branch exists: {}", e)))?;

    if exists {
        info!("Deleting stale branch '{}' of '{}'", branch, repo);
        delete_branch(git_ops, dir, default_branch, branch)
            .map_err(|e| cleanup_failed(e.to_string()))?;
    }

    git_ops
        .create_branch(dir, branch)
        .and_then(|_| git_ops.push_upstream(dir, branch))
        .map_err(|e| Error::BranchCreateFailed {
            repository: repo.to_string(),
            branch: branch.to_string(),
            message: e.to_string(),
        })?;

    Ok(exists)
}

fn delete_branch(
    git_ops: &dyn GitOperations,
    dir: &Path,
    default_branch: &str,
    branch: &str,
) -> Result<()> {
    git_ops.checkout(dir, default_branch)?;
    if git_ops.local_branch_exists(dir, branch)? {
        git_ops.delete_local_branch(dir, branch)?;
    }
    git_ops.delete_remote_branch(dir, branch)
}
