//! # Workflow Sync Library
//!
//! This library propagates shared CI workflow definitions from one source
//! repository to a fleet of target repositories. It is designed to be used by
//! the `workflow-sync` command-line tool, which runs inside a scheduled CI job
//! of the source repository.
//!
//! ## Quick Example
//!
//! ```
//! use workflow_sync::config;
//! use workflow_sync::identifier::RepoId;
//! use workflow_sync::transfer::is_managed_file;
//!
//! let targets = config::parse(r#"["org/a", "org/b"]"#).unwrap();
//! assert_eq!(targets.len(), 2);
//!
//! let repo = RepoId::parse(&targets[0]).unwrap();
//! assert_eq!(repo.owner, "org");
//! assert_eq!(repo.name, "a");
//!
//! assert!(is_managed_file("synced_ci.yml"));
//! assert!(!is_managed_file("manual.yml"));
//! ```
//!
//! ## Core Concepts
//!
//! - **Managed files (`transfer`)**: workflow files named `synced_*.yml` are
//!   owned by the source repository. On every target they are deleted and
//!   recopied wholesale; all other files are left alone.
//! - **Feature branch (`sync::branch`)**: every attempt starts from a fresh
//!   `sync-workflows` branch cut from the target's default branch.
//! - **Outcomes (`sync`)**: each target attempt yields exactly one immutable
//!   `SyncOutcome`. A failure on one target never stops the others.
//! - **Marker tag (`sync::marker`)**: the `last-synced` tag on the source
//!   repository only moves when every target succeeded.
//! - **Capabilities (`repository`, `github`)**: git and the hosting API sit
//!   behind the `GitOperations` and `RepositoryApi` traits.
//!
//! ## Execution Flow
//!
//! 1.  **Configuration**: load and validate the target list (`config`).
//! 2.  **Version**: resolve the latest semver tag of the source (`version`).
//! 3.  **Sync**: attempt each target in list order (`sync`).
//! 4.  **Report**: render the markdown job summary (`report`).
//! 5.  **Marker**: advance the marker tag on total success (`sync::marker`).

pub mod config;
pub mod defaults;
pub mod error;
pub mod git;
pub mod github;
pub mod identifier;
pub mod output;
pub mod report;
pub mod repository;
pub mod sync;
pub mod transfer;
pub mod version;
