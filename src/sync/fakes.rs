//! Recording fakes of the source-control and hosting API capabilities.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

use crate::error::{Error, Result};
use crate::github::{NewPullRequest, PullRequestRef, RepositoryApi};
use crate::identifier::RepoId;
use crate::repository::GitOperations;

/// Records every call as `"<operation> <first argument>"`.
pub struct RecordingGit {
    calls: Mutex<Vec<String>>,
    failing: HashSet<&'static str>,
    local_branches: HashSet<String>,
    changes: bool,
}

impl RecordingGit {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failing: HashSet::new(),
            local_branches: HashSet::new(),
            changes: true,
        }
    }

    pub fn failing(mut self, operation: &'static str) -> Self {
        self.failing.insert(operation);
        self
    }

    pub fn with_local_branch(mut self, branch: &str) -> Self {
        self.local_branches.insert(branch.to_string());
        self
    }

    pub fn without_changes(mut self) -> Self {
        self.changes = false;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, operation: &'static str, argument: &str) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{} {}", operation, argument).trim_end().to_string());
        if self.failing.contains(operation) {
            return Err(Error::GitCommand {
                command: format!("git {}", operation),
                stderr: format!("simulated {} failure", operation),
            });
        }
        Ok(())
    }
}

impl GitOperations for RecordingGit {
    fn clone_repository(&self, url: &str, target_dir: &Path) -> Result<()> {
        self.record("clone_repository", url)?;
        fs::create_dir_all(target_dir)?;
        Ok(())
    }

    fn checkout(&self, _dir: &Path, branch: &str) -> Result<()> {
        self.record("checkout", branch)
    }

    fn create_branch(&self, _dir: &Path, branch: &str) -> Result<()> {
        self.record("create_branch", branch)
    }

    fn local_branch_exists(&self, _dir: &Path, branch: &str) -> Result<bool> {
        self.record("local_branch_exists", branch)?;
        Ok(self.local_branches.contains(branch))
    }

    fn delete_local_branch(&self, _dir: &Path, branch: &str) -> Result<()> {
        self.record("delete_local_branch", branch)
    }

    fn delete_remote_branch(&self, _dir: &Path, branch: &str) -> Result<()> {
        self.record("delete_remote_branch", branch)
    }

    fn push_upstream(&self, _dir: &Path, branch: &str) -> Result<()> {
        self.record("push_upstream", branch)
    }

    fn push(&self, _dir: &Path, branch: &str) -> Result<()> {
        self.record("push", branch)
    }

    fn has_changes(&self, _dir: &Path) -> Result<bool> {
        self.record("has_changes", "")?;
        Ok(self.changes)
    }

    fn commit_all(&self, _dir: &Path, message: &str) -> Result<()> {
        self.record("commit_all", message)
    }

    fn configure_identity(&self, _dir: &Path, name: &str, _email: &str) -> Result<()> {
        self.record("configure_identity", name)
    }

    fn move_tag(&self, _dir: &Path, remote_url: &str, tag: &str) -> Result<()> {
        self.record("move_tag", &format!("{} {}", tag, remote_url))
    }

    fn list_tags(&self, url: &str) -> Result<Vec<String>> {
        self.record("list_tags", url)?;
        Ok(vec!["v1.0.0".to_string()])
    }
}

/// Hosting API fake with per-operation failure injection.
pub struct FakeApi {
    default_branch: String,
    branches: HashSet<(String, String)>,
    failing: HashSet<&'static str>,
    next_number: Mutex<u64>,
    created: Mutex<Vec<(String, NewPullRequest)>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            default_branch: "main".to_string(),
            branches: HashSet::new(),
            failing: HashSet::new(),
            next_number: Mutex::new(1),
            created: Mutex::new(Vec::new()),
        }
    }

    pub fn with_branch(mut self, repo: &str, branch: &str) -> Self {
        self.branches.insert((repo.to_string(), branch.to_string()));
        self
    }

    pub fn with_next_pull_request(self, number: u64) -> Self {
        *self.next_number.lock().unwrap() = number;
        self
    }

    pub fn failing(mut self, operation: &'static str) -> Self {
        self.failing.insert(operation);
        self
    }

    pub fn created(&self) -> Vec<(String, NewPullRequest)> {
        self.created.lock().unwrap().clone()
    }

    fn check(&self, operation: &'static str, repo: &RepoId) -> Result<()> {
        if self.failing.contains(operation) {
            return Err(Error::Api {
                url: format!("https://api.github.com/repos/{}", repo),
                status: Some(422),
                message: format!("simulated {} failure", operation),
            });
        }
        Ok(())
    }
}

impl RepositoryApi for FakeApi {
    fn default_branch(&self, repo: &RepoId) -> Result<String> {
        self.check("default_branch", repo)?;
        Ok(self.default_branch.clone())
    }

    fn branch_exists(&self, repo: &RepoId, branch: &str) -> Result<bool> {
        self.check("branch_exists", repo)?;
        Ok(self
            .branches
            .contains(&(repo.to_string(), branch.to_string())))
    }

    fn create_pull_request(
        &self,
        repo: &RepoId,
        request: &NewPullRequest,
    ) -> Result<PullRequestRef> {
        self.check("create_pull_request", repo)?;
        let mut next = self.next_number.lock().unwrap();
        let number = *next;
        *next += 1;
        self.created
            .lock()
            .unwrap()
            .push((repo.to_string(), request.clone()));
        Ok(PullRequestRef {
            number,
            title: request.title.clone(),
            url: format!("https://github.com/{}/pull/{}", repo, number),
        })
    }
}
