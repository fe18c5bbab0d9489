use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{header, Client, Response, StatusCode};

use crate::error::{Error, Result};
use crate::github::paginator::Paginator;
use crate::github::source::CommitSource;
use crate::models::{GitHubCommit, RepoCommits, Repository};

pub struct GitHubClient {
    client: Client,
    base_url: String,
}

impl GitHubClient {
    pub fn new(token: &str) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", token))?,
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            header::HeaderValue::from_static("2022-11-28"),
        );
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static("gitstandup/0.1"),
        );

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            base_url: "https://api.github.com".to_string(),
        })
    }

    pub async fn get_repo(&self, full_name: &str) -> Result<Repository> {
        let url = format!("{}/repos/{}", self.base_url, full_name);
        tracing::debug!("Fetching repository: {}", full_name);

        let response = self.client.get(&url).send().await?;
        let response = check_status(response, full_name).await?;

        Ok(response.json().await?)
    }

    pub async fn get_commits_since(
        &self,
        full_name: &str,
        since: DateTime<Utc>,
        branch: Option<&str>,
    ) -> Result<Vec<GitHubCommit>> {
        let url = format!("{}/repos/{}/commits", self.base_url, full_name);
        let mut query = vec![("since", since.to_rfc3339_opts(SecondsFormat::Secs, true))];
        if let Some(branch) = branch {
            query.push(("sha", branch.to_string()));
        }

        Paginator::new(&self.client)
            .fetch_all(&url, &query, 100, full_name)
            .await
    }
}

#[async_trait]
impl CommitSource for GitHubClient {
    async fn fetch_commits(
        &self,
        repo: &str,
        since: DateTime<Utc>,
        branch: Option<&str>,
    ) -> Result<RepoCommits> {
        let branch = match branch {
            Some(branch) => {
                tracing::info!("  Using branch: {}", branch);
                branch.to_string()
            }
            None => {
                let default_branch = self.get_repo(repo).await?.default_branch;
                tracing::info!("  Using default branch: {}", default_branch);
                default_branch
            }
        };

        let commits = self.get_commits_since(repo, since, Some(&branch)).await?;
        Ok(RepoCommits { branch, commits })
    }
}

/// Maps GitHub's error statuses onto the crate's error variants.
pub(crate) async fn check_status(response: Response, context: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match status {
        StatusCode::NOT_FOUND => Err(Error::RepoNotFound(context.to_string())),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Err(Error::Unauthorized(context.to_string()))
        }
        _ => {
            let body = response.text().await.unwrap_or_default();
            Err(Error::GitHubApi(format!(
                "Request for {} failed: {} - {}",
                context, status, body
            )))
        }
    }
}
