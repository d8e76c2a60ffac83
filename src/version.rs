//! # Version Resolution
//!
//! Determines which version of the source repository a run propagates: the
//! greatest semantic-version tag on the source remote.
//!
//! ## Process
//!
//! 1.  **Tag Fetching**: list every tag of the source remote through
//!     [`GitOperations::list_tags`].
//! 2.  **Semantic Version Filtering**: keep only tags that parse as semver,
//!     with or without a leading `v` or `refs/tags/` prefix. Non-version tags
//!     such as `last-synced` drop out here.
//! 3.  **Selection**: the tag with the greatest version wins and is returned
//!     exactly as spelled on the remote.
//!
//! A lookup failure and an empty result are both fatal to the run: without a
//! version there is nothing to propagate.

use semver::Version;

use crate::error::{Error, Result};
use crate::repository::GitOperations;

/// Resolve the latest version tag of the source repository at `url`.
///
/// `repository` is the `owner/name` used in error messages.
pub fn resolve_latest_version(
    git_ops: &dyn GitOperations,
    url: &str,
    repository: &str,
) -> Result<String> {
    let tags = git_ops
        .list_tags(url)
        .map_err(|e| Error::VersionLookupFailed {
            repository: repository.to_string(),
            message: e.to_string(),
        })?;

    match find_latest_version(&tags) {
        Some((tag, _)) if !tag.is_empty() => Ok(tag),
        _ => Err(Error::NoVersionFound {
            repository: repository.to_string(),
        }),
    }
}

/// Parse a tag such as `v1.2.3`, `1.2.3` or `refs/tags/v1.2.3` into a version.
pub fn parse_version_tag(tag: &str) -> Option<Version> {
    let tag = tag.strip_prefix("refs/tags/").unwrap_or(tag);
    let version_str = tag.strip_prefix('v').unwrap_or(tag);
    Version::parse(version_str).ok()
}

/// Find the latest version from a list of tags, ignoring non-semver tags.
///
/// Ties (e.g. `v1.0.0` and `1.0.0`) keep the first occurrence.
pub fn find_latest_version(tags: &[String]) -> Option<(String, Version)> {
    let mut latest: Option<(String, Version)> = None;

    for tag in tags {
        if let Some(version) = parse_version_tag(tag) {
            match &latest {
                Some((_, latest_ver)) if version <= *latest_ver => {}
                _ => latest = Some((tag.clone(), version)),
            }
        }
    }

    latest
}
