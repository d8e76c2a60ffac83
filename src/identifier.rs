//! Repository identifiers of the form `owner/name`.
//!
//! Identifiers travel through the system as plain strings (the target list,
//! outcomes, the report) and are parsed on demand wherever the owner and name
//! are needed separately.

use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::error::{Error, Result};

/// A parsed `owner/name` repository identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoId {
    pub owner: String,
    pub name: String,
}

impl RepoId {
    /// Splits `identifier` on its first `/`.
    ///
    /// Both halves must be non-empty and the name may not contain a further
    /// separator; anything else is [`Error::MalformedIdentifier`].
    pub fn parse(identifier: &str) -> Result<Self> {
        let malformed = || Error::MalformedIdentifier {
            identifier: identifier.to_string(),
        };

        let (owner, name) = identifier.split_once('/').ok_or_else(malformed)?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(malformed());
        }

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    /// Browser URL of the repository, e.g. `https://github.com/org/a`.
    pub fn html_url(&self, server_url: &str) -> String {
        format!("{}/{}", server_url.trim_end_matches('/'), self)
    }

    /// Git remote URL of the repository.
    ///
    /// When a token is given it is embedded as `x-access-token` basic
    /// credentials so that clone and push work without a credential helper.
    pub fn remote_url(&self, server_url: &str, token: Option<&str>) -> Result<Url> {
        let mut url = Url::parse(&format!("{}.git", self.html_url(server_url)))?;
        if let Some(token) = token {
            // Fails for URLs without a host, such as `file://` servers, which
            // take no credentials anyway.
            let _ = url.set_username("x-access-token");
            let _ = url.set_password(Some(token));
        }
        Ok(url)
    }
}

impl FromStr for RepoId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
