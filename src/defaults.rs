//! Default values for workflow-sync configuration.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

/// Name of the feature branch recreated on every target repository.
pub const FEATURE_BRANCH: &str = "sync-workflows";

/// Movable tag on the source repository marking the last fully propagated commit.
pub const MARKER_TAG: &str = "last-synced";

/// Title of every pull request opened on a target repository.
pub const PULL_REQUEST_TITLE: &str = "(sync): update workflows";

/// Commit message used for the transferred workflow files.
pub const COMMIT_MESSAGE: &str = "(sync): update workflows";

/// Directory, relative to a repository root, holding workflow definitions.
pub const WORKFLOW_DIR: &str = ".github/workflows";

/// Default location of the target list.
pub const REPOS_FILE: &str = "repos.json";

/// Environment variable holding the hosting platform token.
pub const TOKEN_ENV: &str = "GH_AUTH_TOKEN";

pub const SERVER_URL: &str = "https://github.com";
pub const API_URL: &str = "https://api.github.com";

/// Author identity for commits and tags created by a run.
pub const GIT_USER_NAME: &str = "github-actions[bot]";
pub const GIT_USER_EMAIL: &str = "41898282+github-actions[bot]@users.noreply.github.com";

/// Value of the `User-Agent` header sent to the hosting API.
pub fn user_agent() -> String {
    format!("workflow-sync/{}", env!("CARGO_PKG_VERSION"))
}
