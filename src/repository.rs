//! # Source-Control Capability
//!
//! The sync engine never shells out to `git` directly. Every source-control
//! action it needs goes through the `GitOperations` trait, so the engine's
//! state transitions (branch reconciliation, no-change detection, marker tag
//! moves) can be exercised against an in-memory fake in tests.
//!
//! In the binary, `DefaultGitOperations` forwards each call to the
//! subprocess wrappers in [`crate::git`].

use std::path::Path;

use crate::error::Result;

/// Trait for git operations - allows mocking in tests
pub trait GitOperations: Send + Sync {
    /// Clones `url` into `target_dir`, replacing any existing content.
    fn clone_repository(&self, url: &str, target_dir: &Path) -> Result<()>;

    fn checkout(&self, dir: &Path, branch: &str) -> Result<()>;

    /// Creates `branch` from the current `HEAD` and checks it out.
    fn create_branch(&self, dir: &Path, branch: &str) -> Result<()>;

    fn local_branch_exists(&self, dir: &Path, branch: &str) -> Result<bool>;

    fn delete_local_branch(&self, dir: &Path, branch: &str) -> Result<()>;

    fn delete_remote_branch(&self, dir: &Path, branch: &str) -> Result<()>;

    /// Pushes `branch` to `origin` with upstream tracking.
    fn push_upstream(&self, dir: &Path, branch: &str) -> Result<()>;

    fn push(&self, dir: &Path, branch: &str) -> Result<()>;

    /// Whether the working tree has uncommitted changes.
    fn has_changes(&self, dir: &Path) -> Result<bool>;

    /// Stages all changes, deletions included, and commits them.
    fn commit_all(&self, dir: &Path, message: &str) -> Result<()>;

    fn configure_identity(&self, dir: &Path, name: &str, email: &str) -> Result<()>;

    /// Moves `tag` to `HEAD` locally and force-pushes it to `remote_url`.
    ///
    /// `remote_url` may carry credentials; they are never written into the
    /// working copy's configuration.
    fn move_tag(&self, dir: &Path, remote_url: &str, tag: &str) -> Result<()>;

    /// Retrieves a list of all tags from a remote repository.
    fn list_tags(&self, url: &str) -> Result<Vec<String>>;
}

/// The default implementation of `GitOperations`, which uses the system's
/// `git` command to perform real Git operations.
pub struct DefaultGitOperations;

impl GitOperations for DefaultGitOperations {
    fn clone_repository(&self, url: &str, target_dir: &Path) -> Result<()> {
        crate::git::clone(url, target_dir)
    }

    fn checkout(&self, dir: &Path, branch: &str) -> Result<()> {
        crate::git::checkout(dir, branch)
    }

    fn create_branch(&self, dir: &Path, branch: &str) -> Result<()> {
        crate::git::create_branch(dir, branch)
    }

    fn local_branch_exists(&self, dir: &Path, branch: &str) -> Result<bool> {
        crate::git::local_branch_exists(dir, branch)
    }

    fn delete_local_branch(&self, dir: &Path, branch: &str) -> Result<()> {
        crate::git::delete_local_branch(dir, branch)
    }

    fn delete_remote_branch(&self, dir: &Path, branch: &str) -> Result<()> {
        crate::git::delete_remote_branch(dir, branch)
    }

    fn push_upstream(&self, dir: &Path, branch: &str) -> Result<()> {
        crate::git::push_upstream(dir, branch)
    }

    fn push(&self, dir: &Path, branch: &str) -> Result<()> {
        crate::git::push(dir, branch)
    }

    fn has_changes(&self, dir: &Path) -> Result<bool> {
        crate::git::has_changes(dir)
    }

    fn commit_all(&self, dir: &Path, message: &str) -> Result<()> {
        crate::git::commit_all(dir, message)
    }

    fn configure_identity(&self, dir: &Path, name: &str, email: &str) -> Result<()> {
        crate::git::configure_identity(dir, name, email)
    }

    fn move_tag(&self, dir: &Path, remote_url: &str, tag: &str) -> Result<()> {
        crate::git::force_tag(dir, tag)?;
        crate::git::force_push_tag(dir, remote_url, tag)
    }

    fn list_tags(&self, url: &str) -> Result<Vec<String>> {
        crate::git::list_tags(url)
    }
}
