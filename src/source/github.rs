//! GitHub release host.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;

use crate::asset::AssetCandidate;
use crate::http::HttpClient;

use super::{Release, ReleaseHost, RepoId};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// GitHub API response types (internal).
mod api {
    use serde::Deserialize;

    #[derive(Deserialize, Debug)]
    pub struct Owner {
        pub login: String,
    }

    #[derive(Deserialize, Debug)]
    pub struct Repo {
        pub name: String,
        pub owner: Owner,
    }

    #[derive(Deserialize, Debug)]
    pub struct SearchResults {
        pub items: Vec<Repo>,
    }

    #[derive(Deserialize, Debug)]
    pub struct Release {
        pub tag_name: String,
        pub assets: Vec<Asset>,
    }

    #[derive(Deserialize, Debug)]
    pub struct Asset {
        pub name: String,
        pub browser_download_url: String,
    }
}

impl From<api::Repo> for RepoId {
    fn from(repo: api::Repo) -> Self {
        RepoId::new(repo.owner.login, repo.name)
    }
}

impl From<api::Release> for Release {
    fn from(release: api::Release) -> Self {
        Release {
            tag: release.tag_name,
            assets: release
                .assets
                .into_iter()
                .map(|a| AssetCandidate::new(a.name, a.browser_download_url))
                .collect(),
        }
    }
}

/// GitHub source implementation.
pub struct GitHubHost {
    http_client: HttpClient,
    api_url: String,
}

impl GitHubHost {
    pub fn new(client: Client) -> Self {
        Self::with_api_url(client, DEFAULT_API_URL)
    }

    pub fn with_api_url(client: Client, api_url: &str) -> Self {
        Self {
            http_client: HttpClient::new(client),
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    async fn search_repository(&self, name: &str) -> Result<RepoId> {
        let url = format!("{}/search/repositories", self.api_url);
        let q = format!("{} in:name", name);
        let results: api::SearchResults = self
            .http_client
            .get_json(&url, &[("q", q.as_str()), ("per_page", "10")])
            .await
            .with_context(|| format!("Failed to search repositories for {:?}", name))?;

        debug!("Search for {:?} returned {} repositories", name, results.items.len());

        let mut items = results.items;
        let exact = items.iter().position(|r| r.name.eq_ignore_ascii_case(name));
        match exact {
            Some(i) => Ok(items.swap_remove(i).into()),
            None if !items.is_empty() => Ok(items.swap_remove(0).into()),
            None => anyhow::bail!("No repository found matching {:?}", name),
        }
    }
}

#[async_trait]
impl ReleaseHost for GitHubHost {
    #[tracing::instrument(skip(self))]
    async fn find_repository(&self, query: &str) -> Result<RepoId> {
        let repo = if query.contains('/') {
            let wanted: RepoId = query.parse()?;
            let url = format!("{}/repos/{}/{}", self.api_url, wanted.owner, wanted.repo);
            let found: api::Repo = self
                .http_client
                .get_json(&url, &[])
                .await
                .with_context(|| format!("Failed to fetch repository {}", wanted))?;
            found.into()
        } else {
            self.search_repository(query).await?
        };

        info!("Resolved {:?} to {}", query, repo);
        Ok(repo)
    }

    #[tracing::instrument(skip(self))]
    async fn get_release(&self, repo: &RepoId, tag: Option<String>) -> Result<Release> {
        let url = match &tag {
            Some(tag) => format!(
                "{}/repos/{}/{}/releases/tags/{}",
                self.api_url, repo.owner, repo.repo, tag
            ),
            None => format!(
                "{}/repos/{}/{}/releases/latest",
                self.api_url, repo.owner, repo.repo
            ),
        };

        let release: api::Release = self.http_client.get_json(&url, &[]).await.with_context(|| {
            format!(
                "Failed to fetch release {} of {}",
                tag.as_deref().unwrap_or("latest"),
                repo
            )
        })?;

        debug!("Release {} has {} assets", release.tag_name, release.assets.len());
        Ok(release.into())
    }

    #[tracing::instrument(skip(self))]
    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        info!("Downloading {}...", url);
        self.http_client
            .download(url)
            .await
            .with_context(|| format!("Failed to download {}", url))
    }
}
