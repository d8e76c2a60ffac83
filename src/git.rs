//! Thin wrappers around the system `git` command.
//!
//! Every function runs one or two `git` subprocesses, logs the invocation as
//! `> git <args>` with any embedded credentials redacted, and maps a failed
//! exit into [`Error::GitCommand`] carrying the captured stderr.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use std::sync::OnceLock;

use log::info;
use regex::Regex;

use crate::error::{Error, Result};

fn credentials() -> &'static Regex {
    static CREDENTIALS: OnceLock<Regex> = OnceLock::new();
    CREDENTIALS.get_or_init(|| {
        Regex::new(r#"(https?://[^:/\s'"@]+:)[^@\s'"]+@"#).expect("valid credentials pattern")
    })
}

/// Replaces passwords embedded in URLs anywhere in `text` with `***`.
///
/// Also covers URLs git echoes inside quotes, e.g. `unable to access '<url>'`.
pub fn redact(text: &str) -> String {
    credentials().replace_all(text, "${1}***@").into_owned()
}

fn display_command(args: &[&str]) -> String {
    let redacted: Vec<String> = args.iter().map(|arg| redact(arg)).collect();
    format!("git {}", redacted.join(" "))
}

fn spawn(dir: Option<&Path>, args: &[&str]) -> Result<Output> {
    let command_line = display_command(args);
    info!("> {}", command_line);

    let mut command = Command::new("git");
    command.args(args);
    if let Some(dir) = dir {
        command.current_dir(dir);
    }

    command.output().map_err(|e| Error::GitCommand {
        command: command_line,
        stderr: e.to_string(),
    })
}

/// Run `git` and return its stdout, failing on a non-zero exit.
fn run(dir: Option<&Path>, args: &[&str]) -> Result<String> {
    let output = spawn(dir, args)?;

    if !output.status.success() {
        return Err(Error::GitCommand {
            command: display_command(args),
            stderr: redact(String::from_utf8_lossy(&output.stderr).trim()),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Clone `url` into `target_dir`, replacing whatever is there.
pub fn clone(url: &str, target_dir: &Path) -> Result<()> {
    if target_dir.exists() {
        fs::remove_dir_all(target_dir)?;
    }
    if let Some(parent) = target_dir.parent() {
        fs::create_dir_all(parent)?;
    }

    let target = target_dir.to_string_lossy();
    run(None, &["clone", url, target.as_ref()])?;
    Ok(())
}

pub fn checkout(dir: &Path, branch: &str) -> Result<()> {
    run(Some(dir), &["checkout", branch])?;
    Ok(())
}

/// Create `branch` from the current `HEAD` and switch to it.
pub fn create_branch(dir: &Path, branch: &str) -> Result<()> {
    run(Some(dir), &["checkout", "-b", branch])?;
    Ok(())
}

pub fn local_branch_exists(dir: &Path, branch: &str) -> Result<bool> {
    let reference = format!("refs/heads/{}", branch);
    let output = spawn(Some(dir), &["rev-parse", "--verify", "--quiet", reference.as_str()])?;
    Ok(output.status.success())
}

pub fn delete_local_branch(dir: &Path, branch: &str) -> Result<()> {
    run(Some(dir), &["branch", "-D", branch])?;
    Ok(())
}

pub fn delete_remote_branch(dir: &Path, branch: &str) -> Result<()> {
    run(Some(dir), &["push", "origin", "--delete", branch])?;
    Ok(())
}

/// Push `branch` to `origin` and set it as the upstream.
pub fn push_upstream(dir: &Path, branch: &str) -> Result<()> {
    run(Some(dir), &["push", "-u", "origin", branch])?;
    Ok(())
}

pub fn push(dir: &Path, branch: &str) -> Result<()> {
    run(Some(dir), &["push", "origin", branch])?;
    Ok(())
}

/// Whether the working tree differs from `HEAD`, untracked files included.
pub fn has_changes(dir: &Path) -> Result<bool> {
    let status = run(Some(dir), &["status", "--porcelain"])?;
    Ok(!status.trim().is_empty())
}

/// Stage everything, deletions included, and commit it.
pub fn commit_all(dir: &Path, message: &str) -> Result<()> {
    run(Some(dir), &["add", "--all"])?;
    run(Some(dir), &["commit", "-m", message])?;
    Ok(())
}

pub fn configure_identity(dir: &Path, name: &str, email: &str) -> Result<()> {
    run(Some(dir), &["config", "user.name", name])?;
    run(Some(dir), &["config", "user.email", email])?;
    Ok(())
}

/// Point `tag` at `HEAD`, replacing any previous target.
pub fn force_tag(dir: &Path, tag: &str) -> Result<()> {
    run(Some(dir), &["tag", "--force", tag, "HEAD"])?;
    Ok(())
}

/// Push `tag` straight to `remote_url`, overwriting the remote tag.
///
/// The working copy's configured remotes are left as they are.
pub fn force_push_tag(dir: &Path, remote_url: &str, tag: &str) -> Result<()> {
    let reference = format!("refs/tags/{}", tag);
    run(Some(dir), &["push", "--force", remote_url, reference.as_str()])?;
    Ok(())
}

/// List all tags from a remote repository
pub fn list_tags(url: &str) -> Result<Vec<String>> {
    let stdout = run(None, &["ls-remote", "--tags", url])?;
    Ok(parse_ls_remote_tags(&stdout))
}

/// Extract tag names from `git ls-remote --tags` output.
///
/// Lines look like `<hash>\trefs/tags/v1.0.0`; peeled entries of annotated
/// tags (`refs/tags/v1.0.0^{}`) are skipped.
pub fn parse_ls_remote_tags(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter_map(|line| {
            let (_, reference) = line.split_once('\t')?;
            let tag = reference.strip_prefix("refs/tags/")?;
            if tag.ends_with("^{}") {
                None
            } else {
                Some(tag.to_string())
            }
        })
        .collect()
}
