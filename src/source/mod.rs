//! Release hosts: where repositories, releases and their assets come from.

mod github;

use anyhow::Result;
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;

use crate::asset::AssetCandidate;

pub use github::GitHubHost;

/// Repository identifier (owner/repo format).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoId {
    pub owner: String,
    pub repo: String,
}

impl RepoId {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl FromStr for RepoId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
                Ok(RepoId::new(owner, repo))
            }
            _ => anyhow::bail!("Invalid repository {:?}. Expected 'owner/repo'.", s),
        }
    }
}

/// A release and the files attached to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub tag: String,
    pub assets: Vec<AssetCandidate>,
}

/// Trait for release hosts.
///
/// Everything the installer needs from the network goes through here.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReleaseHost: Send + Sync {
    /// Resolve `owner/repo` or an approximate project name to a repository.
    async fn find_repository(&self, query: &str) -> Result<RepoId>;

    /// Fetch the release tagged `tag`, or the latest release.
    async fn get_release(&self, repo: &RepoId, tag: Option<String>) -> Result<Release>;

    /// Fetch an asset's bytes.
    async fn download(&self, url: &str) -> Result<Vec<u8>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_id_parse() {
        let repo: RepoId = "owner/repo".parse().unwrap();
        assert_eq!(repo, RepoId::new("owner", "repo"));
        assert_eq!(repo.to_string(), "owner/repo");
    }

    #[test]
    fn test_repo_id_invalid() {
        for s in ["invalid", "", "/repo", "owner/", "a/b/c"] {
            assert!(s.parse::<RepoId>().is_err(), "{:?} should not parse", s);
        }
    }
}
