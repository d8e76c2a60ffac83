//! Shared test utilities for integration and E2E tests.
//!
//! This module provides fixtures and an in-memory fleet of repositories that
//! stands in for both git and the hosting API, so whole sync runs can be
//! driven without a network.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_repos(r#"["org/a"]"#);
//!     let fleet = FakeFleet::new().with_repo("org/a", &[]);
//!     // ... test code
//! }
//! ```

use assert_fs::prelude::*;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use workflow_sync::error::{Error, Result};
use workflow_sync::github::{NewPullRequest, PullRequestRef, RepositoryApi};
use workflow_sync::identifier::RepoId;
use workflow_sync::repository::GitOperations;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::{FakeFleet, TestFixture};
}

/// Files of one revision, keyed by path relative to the repository root.
pub type Tree = BTreeMap<String, String>;

/// A test fixture: a temporary source working copy with an optional target list.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a `repos.json` target list with the given content.
    pub fn with_repos(self, content: &str) -> Self {
        self.with_file("repos.json", content)
    }

    /// Add a workflow file to the source's `.github/workflows` directory.
    pub fn with_workflow(self, name: &str, content: &str) -> Self {
        self.with_file(&format!(".github/workflows/{}", name), content)
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Get the path to the target list.
    pub fn repos_path(&self) -> PathBuf {
        self.temp_dir.path().join("repos.json")
    }

    /// Create a command configured to run in this fixture's directory.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("workflow-sync");
        cmd.current_dir(self.path());
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Default)]
struct FakeRepo {
    default_branch: String,
    files: Tree,
    branches: HashSet<String>,
}

#[derive(Default)]
struct FleetState {
    repos: HashMap<String, FakeRepo>,
    /// Working copy directory to repository identifier and its cloned tree.
    clones: HashMap<PathBuf, (String, Tree)>,
    commits: HashMap<String, Tree>,
    pull_requests: Vec<(String, NewPullRequest)>,
    moved_tags: Vec<String>,
    next_pull_request: u64,
}

/// In-memory hosting platform holding every target repository.
///
/// Implements both [`GitOperations`] and [`RepositoryApi`]. Any operation can
/// be made to fail for one repository with [`FakeFleet::failing`]; the source
/// repository is addressed as `"source"`.
pub struct FakeFleet {
    state: Mutex<FleetState>,
    failing: HashMap<String, HashSet<&'static str>>,
    tags: Vec<String>,
}

impl FakeFleet {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FleetState {
                next_pull_request: 1,
                ..FleetState::default()
            }),
            failing: HashMap::new(),
            tags: vec!["v1.0.0".to_string()],
        }
    }

    /// Add a target whose default branch `main` holds `files`.
    pub fn with_repo(self, identifier: &str, files: &[(&str, &str)]) -> Self {
        self.state.lock().unwrap().repos.insert(
            identifier.to_string(),
            FakeRepo {
                default_branch: "main".to_string(),
                files: files
                    .iter()
                    .map(|(path, content)| (path.to_string(), content.to_string()))
                    .collect(),
                ..FakeRepo::default()
            },
        );
        self
    }

    /// Leave `branch` behind on `identifier`, as an earlier run would.
    pub fn with_stale_branch(self, identifier: &str, branch: &str) -> Self {
        if let Some(repo) = self.state.lock().unwrap().repos.get_mut(identifier) {
            repo.branches.insert(branch.to_string());
        }
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|tag| tag.to_string()).collect();
        self
    }

    pub fn with_next_pull_request(self, number: u64) -> Self {
        self.state.lock().unwrap().next_pull_request = number;
        self
    }

    pub fn failing(mut self, identifier: &str, operation: &'static str) -> Self {
        self.failing
            .entry(identifier.to_string())
            .or_default()
            .insert(operation);
        self
    }

    /// Tree committed to `identifier` during the run, if any.
    pub fn committed(&self, identifier: &str) -> Option<Tree> {
        self.state.lock().unwrap().commits.get(identifier).cloned()
    }

    pub fn pull_requests(&self) -> Vec<(String, NewPullRequest)> {
        self.state.lock().unwrap().pull_requests.clone()
    }

    pub fn moved_tags(&self) -> Vec<String> {
        self.state.lock().unwrap().moved_tags.clone()
    }

    pub fn has_branch(&self, identifier: &str, branch: &str) -> bool {
        self.state
            .lock()
            .unwrap()
            .repos
            .get(identifier)
            .is_some_and(|repo| repo.branches.contains(branch))
    }

    /// Apply the committed tree to the default branch, as merging would.
    pub fn merge(&self, identifier: &str) {
        let mut state = self.state.lock().unwrap();
        if let Some(tree) = state.commits.remove(identifier) {
            if let Some(repo) = state.repos.get_mut(identifier) {
                repo.files = tree;
            }
        }
    }

    fn check(&self, identifier: &str, operation: &'static str) -> Result<()> {
        if self
            .failing
            .get(identifier)
            .is_some_and(|ops| ops.contains(operation))
        {
            return Err(Error::GitCommand {
                command: format!("git {}", operation),
                stderr: format!("simulated {} failure for {}", operation, identifier),
            });
        }
        Ok(())
    }

    fn repo_of(&self, dir: &Path) -> String {
        self.state
            .lock()
            .unwrap()
            .clones
            .get(dir)
            .map(|(identifier, _)| identifier.clone())
            .unwrap_or_else(|| "source".to_string())
    }

    fn git_op(&self, dir: &Path, operation: &'static str) -> Result<String> {
        let identifier = self.repo_of(dir);
        self.check(&identifier, operation)?;
        Ok(identifier)
    }
}

impl Default for FakeFleet {
    fn default() -> Self {
        Self::new()
    }
}

/// `https://x-access-token:t@github.com/org/a.git` to `org/a`.
fn identifier_from_url(url: &str) -> String {
    let path = url.trim_end_matches(".git");
    let mut parts = path.rsplit('/');
    let name = parts.next().unwrap_or_default();
    let owner = parts.next().unwrap_or_default();
    format!("{}/{}", owner, name)
}

/// Every file below `dir`, `.git` excluded.
pub fn read_tree(dir: &Path) -> Tree {
    fn walk(root: &Path, dir: &Path, tree: &mut Tree) {
        let Ok(entries) = fs::read_dir(dir) else {
            return;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                if entry.file_name() != ".git" {
                    walk(root, &path, tree);
                }
            } else if let Ok(content) = fs::read_to_string(&path) {
                let relative = path.strip_prefix(root).unwrap_or(&path);
                tree.insert(relative.to_string_lossy().replace('\\', "/"), content);
            }
        }
    }

    let mut tree = Tree::new();
    walk(dir, dir, &mut tree);
    tree
}

impl GitOperations for FakeFleet {
    fn clone_repository(&self, url: &str, target_dir: &Path) -> Result<()> {
        let identifier = identifier_from_url(url);
        self.check(&identifier, "clone_repository")?;

        let mut state = self.state.lock().unwrap();
        let files = state
            .repos
            .get(&identifier)
            .map(|repo| repo.files.clone())
            .ok_or_else(|| Error::GitCommand {
                command: "git clone".to_string(),
                stderr: format!("repository '{}' not found", identifier),
            })?;

        for (path, content) in &files {
            let file = target_dir.join(path);
            if let Some(parent) = file.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(file, content)?;
        }
        fs::create_dir_all(target_dir)?;
        state
            .clones
            .insert(target_dir.to_path_buf(), (identifier, files));
        Ok(())
    }

    fn checkout(&self, dir: &Path, _branch: &str) -> Result<()> {
        self.git_op(dir, "checkout").map(|_| ())
    }

    fn create_branch(&self, dir: &Path, _branch: &str) -> Result<()> {
        self.git_op(dir, "create_branch").map(|_| ())
    }

    fn local_branch_exists(&self, dir: &Path, _branch: &str) -> Result<bool> {
        self.git_op(dir, "local_branch_exists").map(|_| false)
    }

    fn delete_local_branch(&self, dir: &Path, _branch: &str) -> Result<()> {
        self.git_op(dir, "delete_local_branch").map(|_| ())
    }

    fn delete_remote_branch(&self, dir: &Path, branch: &str) -> Result<()> {
        let identifier = self.git_op(dir, "delete_remote_branch")?;
        if let Some(repo) = self.state.lock().unwrap().repos.get_mut(&identifier) {
            repo.branches.remove(branch);
        }
        Ok(())
    }

    fn push_upstream(&self, dir: &Path, branch: &str) -> Result<()> {
        let identifier = self.git_op(dir, "push_upstream")?;
        if let Some(repo) = self.state.lock().unwrap().repos.get_mut(&identifier) {
            repo.branches.insert(branch.to_string());
        }
        Ok(())
    }

    fn push(&self, dir: &Path, _branch: &str) -> Result<()> {
        self.git_op(dir, "push").map(|_| ())
    }

    fn has_changes(&self, dir: &Path) -> Result<bool> {
        self.git_op(dir, "has_changes")?;
        let state = self.state.lock().unwrap();
        let cloned = state.clones.get(dir).map(|(_, tree)| tree.clone());
        Ok(cloned != Some(read_tree(dir)))
    }

    fn commit_all(&self, dir: &Path, _message: &str) -> Result<()> {
        let identifier = self.git_op(dir, "commit_all")?;
        let tree = read_tree(dir);
        self.state.lock().unwrap().commits.insert(identifier, tree);
        Ok(())
    }

    fn configure_identity(&self, dir: &Path, _name: &str, _email: &str) -> Result<()> {
        self.git_op(dir, "configure_identity").map(|_| ())
    }

    fn move_tag(&self, dir: &Path, _remote_url: &str, tag: &str) -> Result<()> {
        self.git_op(dir, "move_tag")?;
        self.state.lock().unwrap().moved_tags.push(tag.to_string());
        Ok(())
    }

    fn list_tags(&self, _url: &str) -> Result<Vec<String>> {
        self.check("source", "list_tags")?;
        Ok(self.tags.clone())
    }
}

impl RepositoryApi for FakeFleet {
    fn default_branch(&self, repo: &RepoId) -> Result<String> {
        let identifier = repo.to_string();
        self.check(&identifier, "default_branch")?;
        self.state
            .lock()
            .unwrap()
            .repos
            .get(&identifier)
            .map(|repo| repo.default_branch.clone())
            .ok_or_else(|| Error::Api {
                url: format!("https://api.github.com/repos/{}", identifier),
                status: Some(404),
                message: "Not Found".to_string(),
            })
    }

    fn branch_exists(&self, repo: &RepoId, branch: &str) -> Result<bool> {
        let identifier = repo.to_string();
        self.check(&identifier, "branch_exists")?;
        Ok(self.has_branch(&identifier, branch))
    }

    fn create_pull_request(
        &self,
        repo: &RepoId,
        request: &NewPullRequest,
    ) -> Result<PullRequestRef> {
        let identifier = repo.to_string();
        if self
            .failing
            .get(&identifier)
            .is_some_and(|ops| ops.contains("create_pull_request"))
        {
            return Err(Error::Api {
                url: format!("https://api.github.com/repos/{}/pulls", identifier),
                status: Some(422),
                message: "Validation Failed".to_string(),
            });
        }

        let mut state = self.state.lock().unwrap();
        let number = state.next_pull_request;
        state.next_pull_request += 1;
        state
            .pull_requests
            .push((identifier.clone(), request.clone()));
        Ok(PullRequestRef {
            number,
            title: request.title.clone(),
            url: format!("https://github.com/{}/pull/{}", identifier, number),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_with_workflow() {
        let fixture = TestFixture::new().with_workflow("synced_ci.yml", "name: ci\n");
        assert!(fixture
            .path()
            .join(".github/workflows/synced_ci.yml")
            .exists());
    }

    #[test]
    fn test_identifier_from_url() {
        assert_eq!(
            identifier_from_url("https://x-access-token:t@github.com/org/a.git"),
            "org/a"
        );
    }

    #[test]
    fn test_read_tree_skips_git_dir() {
        let fixture = TestFixture::new()
            .with_file(".git/HEAD", "ref: refs/heads/main\n")
            .with_file("README.md", "hi");
        let tree = read_tree(fixture.path());
        assert_eq!(tree.len(), 1);
        assert_eq!(tree["README.md"], "hi");
    }
}
