//! # Aggregate Report
//!
//! Pure rendering of a run's outcomes into the markdown job summary:
//!
//! ```text
//! ### 💨 Pushed `v2.3.1` Workflows to `1/2` Repos
//!
//! | Repository | Success | Pull Request | T-Start |
//! |:-|:-:|:-|-:|
//! | **[`a`](https://github.com/org/a)** | ✔️ | [**(sync): update workflows**](...) #12 | 4s |
//! | **[`b`](https://github.com/org/b)** | ❌ | Could not create. | 9s |
//!
//! - ❌ **[`b`](https://github.com/org/b)** (failed to create branch ...)
//!
//! ### 🏷️ Tag `last-synced` Stays
//!
//! *The next run will attempt to sync again, because **1** repo still needs workflows synced.*
//! ```
//!
//! Nothing here performs I/O; [`crate::output::write_summary`] delivers the
//! rendered string.

use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;

use crate::config::SyncSettings;
use crate::error::Error;
use crate::identifier::RepoId;
use crate::sync::marker::MarkerOutcome;
use crate::sync::{tally, SyncOutcome};

const TABLE_HEADER: &str = "| Repository | Success | Pull Request | T-Start |";
const TABLE_ALIGNMENT: &str = "|:-|:-:|:-|-:|";

fn line_breaks() -> &'static Regex {
    static LINE_BREAKS: OnceLock<Regex> = OnceLock::new();
    LINE_BREAKS.get_or_init(|| {
        Regex::new(r"\r\n|[\r\n\x0B\x0C\x{85}\x{2028}\x{2029}]").expect("valid line break pattern")
    })
}

/// Collapse an error message onto one line, joining its lines with `; `.
pub fn flatten_error(message: &str) -> String {
    line_breaks().replace_all(message, "; ").into_owned()
}

/// Bold link to the repository, labelled with its name.
///
/// Identifiers that do not parse are shown verbatim.
pub fn format_repository(identifier: &str, server_url: &str) -> String {
    match RepoId::parse(identifier) {
        Ok(repo) => format!("**[`{}`]({})**", repo.name, repo.html_url(server_url)),
        Err(_) => format!("**`{}`**", identifier),
    }
}

pub fn format_success(outcome: &SyncOutcome) -> &'static str {
    if outcome.is_success() {
        "✔️"
    } else {
        "❌"
    }
}

pub fn format_pull_request(outcome: &SyncOutcome) -> String {
    match (outcome.pull_request(), outcome.is_success()) {
        (Some(pr), _) => format!("[**{}**]({}) #{}", pr.title, pr.url, pr.number),
        (None, true) => "No changes needed.".to_string(),
        (None, false) => "Could not create.".to_string(),
    }
}

/// Elapsed time rounded to whole seconds, e.g. `1h2m5s`, `4m5s`, `6s`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let mut seconds = elapsed.as_secs();
    if elapsed.subsec_millis() >= 500 {
        seconds += 1;
    }

    let (hours, minutes, seconds) = (seconds / 3600, seconds / 60 % 60, seconds % 60);
    if hours > 0 {
        format!("{}h{}m{}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m{}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

fn format_error_line(outcome: &SyncOutcome, error: &Error, server_url: &str) -> String {
    format!(
        "- ❌ {} ({})",
        format_repository(&outcome.repository, server_url),
        flatten_error(&error.to_string())
    )
}

/// The outcome table, followed by the error list when any target failed.
///
/// Rows appear in attempt order.
pub fn render_table_and_errors(outcomes: &[SyncOutcome], server_url: &str) -> String {
    let mut table = vec![TABLE_HEADER.to_string(), TABLE_ALIGNMENT.to_string()];
    table.extend(outcomes.iter().map(|outcome| {
        format!(
            "| {} | {} | {} | {} |",
            format_repository(&outcome.repository, server_url),
            format_success(outcome),
            format_pull_request(outcome),
            format_elapsed(outcome.elapsed)
        )
    }));

    let errors: Vec<String> = outcomes
        .iter()
        .filter_map(|outcome| {
            outcome
                .error()
                .map(|error| format_error_line(outcome, error, server_url))
        })
        .collect();

    let mut sections = vec![table.join("\n")];
    if !errors.is_empty() {
        sections.push(errors.join("\n"));
    }
    sections.join("\n\n")
}

fn render_marker(outcome: &MarkerOutcome, tag: &str) -> String {
    match outcome {
        MarkerOutcome::Updated => format!("### 🏷️ Tag `{}` Updated", tag),
        MarkerOutcome::Stays { missing } => {
            let (repos, needs) = if *missing == 1 {
                ("repo", "needs")
            } else {
                ("repos", "need")
            };
            format!(
                "### 🏷️ Tag `{}` Stays\n\n*The next run will attempt to sync again, because **{}** {} still {} workflows synced.*",
                tag, missing, repos, needs
            )
        }
        MarkerOutcome::UpdateFailed(error) => format!(
            "### 🏷️ Tag `{}` Could Not Be Updated\n\n- ❌ {}",
            tag,
            flatten_error(&error.to_string())
        ),
    }
}

/// The complete job summary for a run.
pub fn render_summary(
    version: &str,
    outcomes: &[SyncOutcome],
    marker: &MarkerOutcome,
    settings: &SyncSettings,
) -> String {
    let (success, total) = tally(outcomes);

    [
        format!(
            "### 💨 Pushed `{}` Workflows to `{}/{}` Repos",
            version, success, total
        ),
        render_table_and_errors(outcomes, &settings.server_url),
        render_marker(marker, &settings.marker_tag),
    ]
    .join("\n\n")
}
