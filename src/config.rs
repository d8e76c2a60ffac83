//! # Configuration
//!
//! Two kinds of configuration feed a sync run:
//!
//! - **The target list**: a JSON file (by default `repos.json`) containing an
//!   array of `owner/name` strings. It is read once at the start of a run; a
//!   missing file, malformed JSON, or an invalid identifier is fatal.
//! - **`SyncSettings`**: the fixed conventions of a run (feature branch,
//!   marker tag, pull request title, workflow directory, bot identity) and the
//!   hosting endpoints. Every field has a default from [`crate::defaults`];
//!   the CLI overrides the endpoints and the source repository.

use std::path::{Path, PathBuf};

use crate::defaults;
use crate::error::{Error, Result};
use crate::identifier::RepoId;

/// Conventions and endpoints shared by every component of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    /// The repository whose workflows and tags are propagated.
    pub source_repo: String,
    pub feature_branch: String,
    pub marker_tag: String,
    pub pull_request_title: String,
    /// Pull request body. Empty until a link to the triggering run is added.
    pub pull_request_body: String,
    pub commit_message: String,
    /// Workflow directory relative to a repository root.
    pub workflow_dir: PathBuf,
    pub git_user_name: String,
    pub git_user_email: String,
    /// Base URL of the git host, e.g. `https://github.com`.
    pub server_url: String,
    /// Base URL of the hosting REST API, e.g. `https://api.github.com`.
    pub api_url: String,
}

impl SyncSettings {
    /// Settings with every convention at its default value.
    pub fn new(source_repo: impl Into<String>) -> Self {
        Self {
            source_repo: source_repo.into(),
            feature_branch: defaults::FEATURE_BRANCH.to_string(),
            marker_tag: defaults::MARKER_TAG.to_string(),
            pull_request_title: defaults::PULL_REQUEST_TITLE.to_string(),
            pull_request_body: String::new(),
            commit_message: defaults::COMMIT_MESSAGE.to_string(),
            workflow_dir: PathBuf::from(defaults::WORKFLOW_DIR),
            git_user_name: defaults::GIT_USER_NAME.to_string(),
            git_user_email: defaults::GIT_USER_EMAIL.to_string(),
            server_url: defaults::SERVER_URL.to_string(),
            api_url: defaults::API_URL.to_string(),
        }
    }

    /// Overrides the git host base URL.
    pub fn with_server_url(mut self, server_url: impl Into<String>) -> Self {
        self.server_url = server_url.into();
        self
    }

    /// Overrides the REST API base URL.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// The parsed source repository identifier.
    pub fn source(&self) -> Result<RepoId> {
        RepoId::parse(&self.source_repo)
    }
}

/// Parse the contents of a target list.
///
/// The document must be a JSON array of strings; order is preserved and is
/// the order in which targets are attempted.
pub fn parse(json_content: &str) -> Result<Vec<String>> {
    Ok(serde_json::from_str::<Vec<String>>(json_content)?)
}

/// Read and parse a target list file.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| Error::ConfigRead {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    parse(&content).map_err(|e| Error::ConfigParse {
        path: path.display().to_string(),
        message: match e {
            Error::Json(json) => json.to_string(),
            other => other.to_string(),
        },
    })
}

/// Read a target list and check that every entry is a valid identifier.
///
/// A malformed entry is reported as [`Error::ConfigParse`] naming the entry,
/// so a broken configuration never starts a partial run.
pub fn load_targets<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let targets = from_file(path)?;

    for target in &targets {
        RepoId::parse(target).map_err(|e| Error::ConfigParse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
    }

    Ok(targets)
}
