//! Pull request publishing.
//!
//! One pull request per attempt, from the feature branch into the target's
//! current default branch, with the fixed title and body from
//! [`SyncSettings`]. There is no update-if-exists step: the feature branch
//! was recreated by the branch reconciler, which closes any earlier pull
//! request opened from it.

use crate::config::SyncSettings;
use crate::error::{Error, Result};
use crate::github::{NewPullRequest, PullRequestRef, RepositoryApi};
use crate::identifier::RepoId;

/// The pull request a sync attempt opens on a target.
pub fn pull_request_for(settings: &SyncSettings, base: &str) -> NewPullRequest {
    NewPullRequest {
        title: settings.pull_request_title.clone(),
        head: settings.feature_branch.clone(),
        base: base.to_string(),
        body: settings.pull_request_body.clone(),
        maintainer_can_modify: true,
    }
}

/// Open the sync pull request on `repo` against `base`.
pub fn open_pull_request(
    api: &dyn RepositoryApi,
    repo: &RepoId,
    settings: &SyncSettings,
    base: &str,
) -> Result<PullRequestRef> {
    let request = pull_request_for(settings, base);

    api.create_pull_request(repo, &request).map_err(|e| {
        let status = e.status();
        let message = match e {
            Error::Api { message, .. } => message,
            other => other.to_string(),
        };
        Error::PullRequestCreationFailed {
            repository: repo.to_string(),
            head: request.head.clone(),
            base: request.base.clone(),
            status,
            message,
        }
    })
}
