//! # Hosting Platform API
//!
//! This module provides the three repository-API capabilities a sync run
//! needs from the hosting platform, behind the `RepositoryApi` trait:
//!
//! - **Repository info**: the target's current default branch.
//! - **Branch lookup**: whether a branch exists remotely. A `404` is a normal
//!   negative answer, not an error.
//! - **Pull request creation**: open a pull request and return its title,
//!   URL and number for the report.
//!
//! `GitHubClient` implements the trait over the GitHub REST API using a
//! blocking `reqwest` client. It is constructed once per run from
//! [`Credentials`] and passed by reference to every component that needs it.

use std::fmt;

use log::debug;
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::error::{Error, Result};
use crate::identifier::RepoId;

/// Token used for both the REST API and authenticated git remotes.
#[derive(Clone)]
pub struct Credentials {
    token: String,
}

impl Credentials {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Reads the token from `GH_AUTH_TOKEN`.
    pub fn from_env() -> Result<Self> {
        Self::from_env_var(defaults::TOKEN_ENV)
    }

    /// Reads the token from `variable`; unset or blank is
    /// [`Error::MissingCredentials`].
    pub fn from_env_var(variable: &str) -> Result<Self> {
        std::env::var(variable)
            .ok()
            .filter(|token| !token.trim().is_empty())
            .map(Self::new)
            .ok_or_else(|| Error::MissingCredentials {
                variable: variable.to_string(),
            })
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"***")
            .finish()
    }
}

/// Request body for opening a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPullRequest {
    pub title: String,
    pub head: String,
    pub base: String,
    pub body: String,
    pub maintainer_can_modify: bool,
}

/// A created pull request, as shown in the report.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PullRequestRef {
    pub number: u64,
    pub title: String,
    #[serde(rename = "html_url")]
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct RepositoryInfo {
    default_branch: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
    #[serde(default)]
    errors: Vec<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

/// Trait for the hosting platform's repository API - allows mocking in tests
pub trait RepositoryApi: Send + Sync {
    /// Returns the repository's current default branch.
    fn default_branch(&self, repo: &RepoId) -> Result<String>;

    /// Returns whether `branch` exists on the remote repository.
    fn branch_exists(&self, repo: &RepoId, branch: &str) -> Result<bool>;

    /// Opens a pull request on `repo`.
    fn create_pull_request(&self, repo: &RepoId, request: &NewPullRequest)
        -> Result<PullRequestRef>;
}

/// `RepositoryApi` over the GitHub REST API.
pub struct GitHubClient {
    http: Client,
    api_url: String,
}

impl GitHubClient {
    pub fn new(api_url: &str, credentials: &Credentials) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", credentials.token()))
            .map_err(|_| Error::MissingCredentials {
                variable: format!("valid {}", defaults::TOKEN_ENV),
            })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = Client::builder()
            .user_agent(defaults::user_agent())
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Api {
                url: api_url.to_string(),
                status: None,
                message: e.to_string(),
            })?;

        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        endpoint(&self.api_url, path)
    }

    fn get(&self, url: &str) -> Result<Response> {
        debug!("GET {}", url);
        self.http.get(url).send().map_err(|e| transport_error(url, e))
    }
}

impl RepositoryApi for GitHubClient {
    fn default_branch(&self, repo: &RepoId) -> Result<String> {
        let url = self.endpoint(&format!("repos/{}/{}", repo.owner, repo.name));
        let response = self.get(&url)?;
        let info: RepositoryInfo = read_json(&url, response)?;
        Ok(info.default_branch)
    }

    fn branch_exists(&self, repo: &RepoId, branch: &str) -> Result<bool> {
        let url = self.endpoint(&format!(
            "repos/{}/{}/branches/{}",
            repo.owner, repo.name, branch
        ));
        let response = self.get(&url)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        let _: serde_json::Value = read_json(&url, response)?;
        Ok(true)
    }

    fn create_pull_request(
        &self,
        repo: &RepoId,
        request: &NewPullRequest,
    ) -> Result<PullRequestRef> {
        let url = self.endpoint(&format!("repos/{}/{}/pulls", repo.owner, repo.name));
        debug!("POST {} ({} -> {})", url, request.head, request.base);

        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .map_err(|e| transport_error(&url, e))?;
        read_json(&url, response)
    }
}

fn endpoint(api_url: &str, path: &str) -> String {
    format!("{}/{}", api_url.trim_end_matches('/'), path)
}

fn transport_error(url: &str, error: reqwest::Error) -> Error {
    Error::Api {
        url: url.to_string(),
        status: error.status().map(|s| s.as_u16()),
        message: error.to_string(),
    }
}

/// Decode a `2xx` response body, or turn anything else into [`Error::Api`].
fn read_json<T: DeserializeOwned>(url: &str, response: Response) -> Result<T> {
    let status = response.status();
    let body = response.text().map_err(|e| transport_error(url, e))?;

    if !status.is_success() {
        return Err(Error::Api {
            url: url.to_string(),
            status: Some(status.as_u16()),
            message: describe_error_body(&body),
        });
    }

    serde_json::from_str(&body).map_err(|e| Error::Api {
        url: url.to_string(),
        status: Some(status.as_u16()),
        message: format!("unexpected response body: {}", e),
    })
}

/// Summarize a GitHub error payload, including per-field validation details.
fn describe_error_body(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => {
            let details: Vec<String> = parsed
                .errors
                .iter()
                .filter_map(|detail| detail.message.clone().or_else(|| detail.code.clone()))
                .collect();
            if details.is_empty() {
                parsed.message
            } else {
                format!("{}: {}", parsed.message, details.join(", "))
            }
        }
        Err(_) if body.trim().is_empty() => "empty response body".to_string(),
        Err(_) => body.trim().to_string(),
    }
}
