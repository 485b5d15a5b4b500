use anyhow::{Context, Result};
use log::debug;
use reqwest::{
    Client,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};
use std::path::PathBuf;

use crate::{
    runtime::Runtime,
    source::{GitHubHost, ReleaseHost},
};

const USER_AGENT: &str = "ghbi-cli";

pub struct Config<R: Runtime, H: ReleaseHost> {
    pub runtime: R,
    pub host: H,
    pub install_dir: PathBuf,
}

impl<R: Runtime> Config<R, GitHubHost> {
    /// Builds a GitHub-backed configuration. `GITHUB_TOKEN`, when set, is sent
    /// as a bearer token.
    pub fn new(runtime: R, install_dir: Option<PathBuf>, api_url: Option<String>) -> Result<Self> {
        let token = runtime.env_var("GITHUB_TOKEN").ok();
        let client = build_client(token.as_deref())?;

        let host = match api_url {
            Some(url) => GitHubHost::with_api_url(client, &url),
            None => GitHubHost::new(client),
        };

        let install_dir = match install_dir {
            Some(dir) => dir,
            None => default_install_dir(&runtime)?,
        };

        Ok(Self {
            runtime,
            host,
            install_dir,
        })
    }
}

/// `~/.local/bin`
pub fn default_install_dir<R: Runtime>(runtime: &R) -> Result<PathBuf> {
    runtime
        .home_dir()
        .map(|home| home.join(".local").join("bin"))
        .context("Could not determine home directory; pass --dir")
}

pub fn build_client(token: Option<&str>) -> Result<Client> {
    let mut headers = HeaderMap::new();
    if let Some(token) = token.filter(|t| !t.is_empty()) {
        let mut auth_value = HeaderValue::from_str(&format!("Bearer {}", token))
            .context("GITHUB_TOKEN contains invalid characters")?;
        auth_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_value);
        debug!("Using GITHUB_TOKEN for authentication: {}", mask(token));
    }

    Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .build()
        .context("Failed to build HTTP client")
}

/// `ghp_1234567890abcd` -> `ghp_*********abcd`
fn mask(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 8 {
        return "*********".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}*********{}", head, tail)
}
