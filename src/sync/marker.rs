//! Marker tag control.
//!
//! The marker tag (`last-synced`) on the source repository records the last
//! commit whose workflows reached every target. It only moves when the whole
//! fleet succeeded in the current run; otherwise it keeps pointing at its
//! previous commit and the run ends in failure so the scheduler runs it again.
//! An empty fleet counts as total success.

use std::path::Path;

use log::info;

use crate::config::SyncSettings;
use crate::error::{Error, Result};
use crate::github::Credentials;
use crate::repository::GitOperations;

/// Whether the marker tag should move after a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerDecision {
    Advance,
    /// Some targets failed; `missing` of them still need the workflows.
    Stay { missing: usize },
}

/// What happened to the marker tag at the end of a run.
#[derive(Debug)]
pub enum MarkerOutcome {
    Updated,
    Stays { missing: usize },
    /// Every target succeeded but moving the tag failed. Fatal to the run.
    UpdateFailed(Error),
}

impl MarkerOutcome {
    /// Whether the run as a whole succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, MarkerOutcome::Updated)
    }
}

pub fn decide(success_count: usize, total_count: usize) -> MarkerDecision {
    if success_count >= total_count {
        MarkerDecision::Advance
    } else {
        MarkerDecision::Stay {
            missing: total_count - success_count,
        }
    }
}

/// Move the marker tag to the current commit of the source working copy.
///
/// Configures the bot identity, then force-moves the tag and force-pushes it
/// to the authenticated source remote. `origin` is left unchanged, so the
/// token never lands in the working copy's configuration.
pub fn advance_marker(
    git_ops: &dyn GitOperations,
    settings: &SyncSettings,
    credentials: &Credentials,
    source_dir: &Path,
) -> Result<()> {
    let tag_failed = |e: Error| Error::MarkerTagUpdateFailed {
        tag: settings.marker_tag.clone(),
        message: e.to_string(),
    };

    let source = settings.source().map_err(tag_failed)?;
    let remote = source
        .remote_url(&settings.server_url, Some(credentials.token()))
        .map_err(tag_failed)?;

    git_ops
        .configure_identity(source_dir, &settings.git_user_name, &settings.git_user_email)
        .and_then(|_| git_ops.move_tag(source_dir, remote.as_str(), &settings.marker_tag))
        .map_err(tag_failed)?;

    info!("Moved tag '{}' on '{}'", settings.marker_tag, source);
    Ok(())
}

/// Decide on the marker tag from the run's tallies and act on the decision.
pub fn settle(
    git_ops: &dyn GitOperations,
    settings: &SyncSettings,
    credentials: &Credentials,
    source_dir: &Path,
    success_count: usize,
    total_count: usize,
) -> MarkerOutcome {
    match decide(success_count, total_count) {
        MarkerDecision::Stay { missing } => {
            info!(
                "Tag '{}' stays, {} repositories are not synced",
                settings.marker_tag, missing
            );
            MarkerOutcome::Stays { missing }
        }
        MarkerDecision::Advance => {
            match advance_marker(git_ops, settings, credentials, source_dir) {
                Ok(()) => MarkerOutcome::Updated,
                Err(e) => MarkerOutcome::UpdateFailed(e),
            }
        }
    }
}
