use crate::core::config::Config;
use crate::error::{ElvupError, Result};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::io::Read;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Tag {
    pub name: String,
    pub zipball_url: String,
    #[serde(default)]
    pub tarball_url: Option<String>,
    #[serde(default)]
    pub commit: Option<Commit>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Commit {
    pub sha: String,
}

/// Where releases come from. The pipeline only needs the newest tag and a
/// way to stream its archive.
pub trait ReleaseSource {
    fn latest_tag(&self) -> Result<Tag>;

    fn download(&self, url: &str) -> Result<Box<dyn Read>>;
}

pub struct GitHubClient {
    client: Client,
    api_url: String,
    owner: String,
    repo: String,
    github_token: Option<String>,
}

impl GitHubClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ElvupError::fetch_error(&config.owner, &config.repo, e.to_string()))?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            owner: config.owner.clone(),
            repo: config.repo.clone(),
            github_token: config.github_token.clone(),
        })
    }

    pub fn get_tags(&self) -> Result<Vec<Tag>> {
        let url = format!("{}/repos/{}/{}/tags", self.api_url, self.owner, self.repo);

        let mut request = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.github_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .map_err(|e| self.fetch_error(e.to_string()))?;

        ensure_success(response.status()).map_err(|message| self.fetch_error(message))?;

        let response_text = response.text().map_err(|e| self.fetch_error(e.to_string()))?;
        parse_tags(&response_text).map_err(|e| self.fetch_error(e.to_string()))
    }

    fn fetch_error(&self, message: String) -> ElvupError {
        ElvupError::fetch_error(&self.owner, &self.repo, message)
    }
}

impl ReleaseSource for GitHubClient {
    fn latest_tag(&self) -> Result<Tag> {
        let tags = self.get_tags()?;
        let tag = tags
            .into_iter()
            .next()
            .ok_or_else(|| self.fetch_error("repository has no tags".to_string()))?;

        tracing::debug!(
            tag = %tag.name,
            sha = tag.commit.as_ref().map(|c| c.sha.as_str()).unwrap_or("unknown"),
            "resolved latest tag"
        );
        Ok(tag)
    }

    fn download(&self, url: &str) -> Result<Box<dyn Read>> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| ElvupError::download_error(url, e.to_string()))?;

        ensure_success(response.status())
            .map_err(|message| ElvupError::download_error(url, message))?;

        Ok(Box::new(response))
    }
}

fn ensure_success(status: StatusCode) -> std::result::Result<(), String> {
    if status.is_success() {
        Ok(())
    } else {
        Err(format!("server responded with status {status}"))
    }
}

/// Parses the body of the GitHub tags endpoint. Tags come back newest first.
pub fn parse_tags(body: &str) -> serde_json::Result<Vec<Tag>> {
    serde_json::from_str(body)
}
