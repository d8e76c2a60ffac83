//! # Error Handling
//!
//! This module defines the centralized error type for `workflow-sync`. It uses
//! the `thiserror` library to create an `Error` enum whose variants follow the
//! three failure classes of a sync run:
//!
//! - **Fatal, pre-run**: malformed configuration, missing credentials, or an
//!   unresolvable source version. These abort the run before any target is
//!   attempted.
//! - **Per-target, recoverable**: failures while reconciling the feature
//!   branch, transferring files, committing, or opening the pull request.
//!   These are attached to the target's outcome and never stop the loop.
//! - **Aggregate-fatal**: failure to move the marker tag after a fully
//!   successful run.
//!
//! Low-level failures (`GitCommand`, `Api`, I/O) are wrapped into one of the
//! operation variants above together with the repository they concern, so a
//! rendered message always says which operation failed and where.

use thiserror::Error;

/// Main error type for workflow-sync operations
#[derive(Error, Debug)]
pub enum Error {
    /// A repository identifier was not of the form `owner/name`.
    #[error("repository identifier '{identifier}' was not in the correct format (i.e. \"owner/name\")")]
    MalformedIdentifier { identifier: String },

    /// The target list file could not be read.
    #[error("could not read '{path}': {message}")]
    ConfigRead { path: String, message: String },

    /// The target list file was not a JSON array of strings, or contained an
    /// invalid identifier.
    #[error("could not parse '{path}', expected a JSON formatted list of strings: {message}")]
    ConfigParse { path: String, message: String },

    /// A required credential was not present in the environment.
    #[error("no {variable} provided")]
    MissingCredentials { variable: String },

    /// Listing the source repository's tags failed.
    #[error("could not look up version tags of '{repository}': {message}")]
    VersionLookupFailed { repository: String, message: String },

    /// The source repository has no semantic version tag to propagate.
    #[error("could not get latest version tag of '{repository}', it returned \"\"")]
    NoVersionFound { repository: String },

    /// Fetching repository information (default branch) failed.
    #[error("could not get repository info from '{repository}': {message}")]
    RepositoryLookupFailed { repository: String, message: String },

    /// Cloning a target repository into its working directory failed.
    #[error("could not clone git repository '{repository}': {message}")]
    CloneFailed { repository: String, message: String },

    /// Deleting a stale feature branch failed.
    #[error("could not delete old '{branch}' branch of '{repository}': {message}")]
    BranchCleanupFailed {
        repository: String,
        branch: String,
        message: String,
    },

    /// Creating or pushing the feature branch failed.
    #[error("could not create and push to new branch '{repository}@{branch}': {message}")]
    BranchCreateFailed {
        repository: String,
        branch: String,
        message: String,
    },

    /// Replacing the managed workflow files failed.
    #[error("could not sync workflow files to '{repository}': {message}")]
    FileTransferFailed { repository: String, message: String },

    /// Committing or pushing the transferred files failed.
    #[error("could not commit synced workflows to '{repository}': {message}")]
    CommitFailed { repository: String, message: String },

    /// The hosting API refused or failed to create the pull request.
    #[error("could not create pull request from '{head}' to '{base}' in '{repository}': {message}{}", status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default())]
    PullRequestCreationFailed {
        repository: String,
        head: String,
        base: String,
        /// HTTP status returned by the hosting API, if a response was received.
        status: Option<u16>,
        message: String,
    },

    /// Moving the marker tag on the source repository failed.
    #[error("could not move tag '{tag}': {message}")]
    MarkerTagUpdateFailed { tag: String, message: String },

    /// A `git` subprocess could not be started or exited unsuccessfully.
    #[error("git command failed: {command} - {stderr}")]
    GitCommand { command: String, stderr: String },

    /// A hosting API request failed.
    #[error("API request failed for {url}: {message}{}", status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default())]
    Api {
        url: String,
        status: Option<u16>,
        message: String,
    },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl Error {
    /// HTTP status carried by an API-level failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } | Error::PullRequestCreationFailed { status, .. } => *status,
            _ => None,
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
